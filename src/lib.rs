pub mod blizzard;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod ingest;
pub mod query;
pub mod realm;
pub mod scheduler;
pub mod stats;
