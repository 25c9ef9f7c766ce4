use crate::query::queries;
use crate::realm::REALMS;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::info;

pub struct DatabaseManager {
    pub pool: Arc<PgPool>,
}

impl DatabaseManager {
    /// 데이터베이스 매니저 생성
    /// 수집 시 렐름/진영마다 커넥션을 따로 쓰므로 풀 크기는 동시 처리 수보다 커야 한다.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// 데이터베이스 풀 가져오기
    pub fn get_pool(&self) -> Arc<PgPool> {
        Arc::clone(&self.pool)
    }

    /// 트랜잭션 실행
    pub async fn transaction<F, R, E>(&self, f: F) -> Result<R, E>
    where
        F: for<'c> FnOnce(
            &'c mut sqlx::Transaction<'_, sqlx::Postgres>,
        ) -> Pin<Box<dyn Future<Output = Result<R, E>> + Send + 'c>>,
        E: From<sqlx::Error>,
    {
        let mut tx = self.pool.begin().await?;
        let result = f(&mut tx).await;
        match result {
            Ok(r) => {
                tx.commit().await?;
                Ok(r)
            }
            Err(e) => {
                tx.rollback().await?;
                Err(e)
            }
        }
    }

    /// 스키마 초기화 (렐름 테이블, 실행 기록 테이블, 아이템 테이블)
    pub async fn initialize_database(&self) -> Result<(), sqlx::Error> {
        self.execute_multi_query(queries::CREATE_RUN_TABLE).await?;
        self.execute_multi_query(queries::CREATE_ITEM_TABLE).await?;

        for realm in &REALMS {
            self.execute_multi_query(&queries::create_realm_table(realm))
                .await?;
        }

        info!(
            "{:<12} --> 스키마 초기화 완료: 렐름 테이블 {} 개",
            "Database",
            REALMS.len()
        );
        Ok(())
    }

    /// 모든 렐름 경매 삭제 (유지보수용, 행 단위 삭제는 없다)
    pub async fn purge_auctions(&self) -> Result<u64, sqlx::Error> {
        self.transaction(|tx| {
            Box::pin(async move {
                let mut deleted = 0;
                for realm in &REALMS {
                    deleted += sqlx::query(&queries::delete_realm_auctions(realm))
                        .execute(&mut **tx)
                        .await?
                        .rows_affected();
                }
                Ok::<_, sqlx::Error>(deleted)
            })
        })
        .await
        .inspect(|deleted| info!("{:<12} --> 경매 전체 삭제: {} 건", "Database", deleted))
    }

    /// 여러 쿼리 실행
    async fn execute_multi_query(&self, sql: &str) -> Result<(), sqlx::Error> {
        for query in sql.split(';') {
            let query = query.trim();
            if !query.is_empty() {
                sqlx::query(query).execute(&*self.pool).await?;
            }
        }
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
