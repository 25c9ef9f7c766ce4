/// 주기적 경매 수집 스케줄러
/// 실행마다 새 API 클라이언트를 만들어 토큰을 발급받고, 실패해도 다음 주기에 다시 시도한다.
// region:    --- Imports
use crate::config::Config;
use crate::ingest::{self, PgAuctionStore};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

// endregion: --- Imports

// region:    --- Ingestion Scheduler
/// 경매 수집 스케줄러
pub struct IngestionScheduler {
    config: Arc<Config>,
    store: Arc<PgAuctionStore>,
}

impl IngestionScheduler {
    pub fn new(config: Arc<Config>, store: Arc<PgAuctionStore>) -> Self {
        Self { config, store }
    }

    /// 스케줄러 시작 (첫 수집은 즉시 실행)
    pub fn start(&self) -> JoinHandle<()> {
        let config = Arc::clone(&self.config);
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            let mut interval = interval(config.ingest_interval);
            // 수집이 주기보다 오래 걸리면 밀린 실행을 몰아서 하지 않는다
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                match ingest::run_ingestion(&config, Arc::clone(&store)).await {
                    Ok(report) => info!(
                        "{:<12} --> 주기 수집 완료: run={}, rows={}",
                        "Scheduler",
                        report.run.id,
                        report.loaded_rows()
                    ),
                    Err(e) => error!("{:<12} --> 주기 수집 실패: {}", "Scheduler", e),
                }
            }
        })
    }
}
// endregion: --- Ingestion Scheduler
