/// Postgres 일괄 적재
/// 스테이징 파일을 `COPY ... FROM STDIN` 으로 렐름 테이블에 적재한다.
/// 렐름/진영마다 풀에서 별도의 커넥션을 받아 하나의 트랜잭션으로 처리한다.
// region:    --- Imports
use super::staging::StagingFile;
use super::{AuctionStore, IngestionRun};
use crate::error::IngestError;
use crate::query::queries;
use crate::realm::{Faction, Realm};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Pg Auction Store
pub struct PgAuctionStore {
    pool: Arc<PgPool>,
}

impl PgAuctionStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuctionStore for PgAuctionStore {
    async fn record_run(
        &self,
        api_request_time: NaiveDateTime,
    ) -> Result<IngestionRun, sqlx::Error> {
        let run = sqlx::query_as::<_, IngestionRun>(queries::INSERT_RUN)
            .bind(api_request_time)
            .fetch_one(&*self.pool)
            .await?;
        info!(
            "{:<12} --> 실행 기록 추가: id={}, time={}",
            "Loader", run.id, run.api_request_time
        );
        Ok(run)
    }

    async fn load(
        &self,
        staged: &StagingFile,
        realm: &Realm,
        faction: Faction,
    ) -> Result<u64, IngestError> {
        let data = tokio::fs::read(staged.path()).await?;

        // 트랜잭션 시작
        let mut tx = self.pool.begin().await?;
        let mut copy = tx.copy_in_raw(&queries::copy_auctions(realm)).await?;

        let sent = copy.send(data).await.map(|_| ());
        if let Err(e) = sent {
            if let Err(abort_err) = copy.abort(e.to_string()).await {
                warn!("{:<12} --> COPY 중단 실패: {}", "Loader", abort_err);
            }
            rollback(tx).await;
            return Err(e.into());
        }

        match copy.finish().await {
            Ok(rows) => {
                // 트랜잭션 커밋
                tx.commit().await?;
                info!(
                    "{:<12} --> 적재 완료: realm={}, faction={}, rows={}",
                    "Loader", realm.name, faction, rows
                );
                Ok(rows)
            }
            Err(e) => {
                // 롤백 (부분 커밋 없음)
                rollback(tx).await;
                Err(e.into())
            }
        }
    }
}

async fn rollback(tx: sqlx::Transaction<'_, sqlx::Postgres>) {
    if let Err(e) = tx.rollback().await {
        warn!("{:<12} --> 롤백 실패: {}", "Loader", e);
    }
}
// endregion: --- Pg Auction Store
