/// 경매 수집 파이프라인
/// 수집 -> 정규화 -> 스테이징 -> 적재 -> 정리 (렐름/진영 단위)
// region:    --- Imports
use crate::blizzard::{AuctionSnapshot, BlizzardClient, FetchOutcome};
use crate::config::Config;
use crate::error::{ApiError, IngestError, RunError};
use crate::realm::{Faction, Realm};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::sync::Arc;

// endregion: --- Imports

// region:    --- Modules
pub mod loader;
pub mod normalizer;
pub mod orchestrator;
pub mod staging;

pub use loader::PgAuctionStore;
pub use orchestrator::{IngestionOrchestrator, PairOutcome, PairReport, PairStage, RunReport};
// endregion: --- Modules

// region:    --- Ingestion Run
/// 수집 실행 기록
/// 실행마다 한 번 생성되며, 해당 실행에서 적재된 모든 행이 같은 시각 값을 참조한다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct IngestionRun {
    pub id: i64,
    pub api_request_time: NaiveDateTime,
}
// endregion: --- Ingestion Run

// region:    --- Traits
/// 경매 스냅샷 공급자
#[async_trait]
pub trait AuctionSource: Send + Sync {
    async fn fetch_auctions(
        &self,
        realm: &Realm,
        faction: Faction,
    ) -> Result<FetchOutcome<AuctionSnapshot>, ApiError>;
}

/// 경매 저장소
#[async_trait]
pub trait AuctionStore: Send + Sync {
    /// 실행 기록 추가 (행 적재 전에 반드시 먼저 기록)
    async fn record_run(&self, api_request_time: NaiveDateTime)
        -> Result<IngestionRun, sqlx::Error>;

    /// 스테이징 파일을 렐름 테이블에 단일 트랜잭션으로 적재
    async fn load(
        &self,
        staged: &staging::StagingFile,
        realm: &Realm,
        faction: Faction,
    ) -> Result<u64, IngestError>;
}

#[async_trait]
impl AuctionSource for BlizzardClient {
    async fn fetch_auctions(
        &self,
        realm: &Realm,
        faction: Faction,
    ) -> Result<FetchOutcome<AuctionSnapshot>, ApiError> {
        BlizzardClient::fetch_auctions(self, realm, faction).await
    }
}
// endregion: --- Traits

// region:    --- Run
/// 수집 1회 실행
/// 토큰 발급 실패나 실행 기록 실패는 렐름 처리 전에 전체 실행을 중단한다.
pub async fn run_ingestion(
    config: &Config,
    store: Arc<PgAuctionStore>,
) -> Result<RunReport, RunError> {
    let client = BlizzardClient::connect(config.api.clone()).await?;
    let orchestrator = IngestionOrchestrator::new(
        Arc::new(client),
        store,
        config.staging_dir.clone(),
        config.ingest_concurrency,
    );
    Ok(orchestrator.run().await?)
}
// endregion: --- Run
