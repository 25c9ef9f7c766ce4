// region:    --- Imports
use auctionation::config::Config;
use auctionation::database::DatabaseManager;
use auctionation::handlers;
use auctionation::ingest::{self, PgAuctionStore};
use auctionation::scheduler::IngestionScheduler;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
// endregion: --- Imports

// region:    --- Cli
#[derive(Parser, Debug)]
#[command(name = "auctionation", version, about = "경매장 수집 및 가격 통계 서비스")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 조회 API 서버 실행
    Serve {
        /// 주기적 수집 스케줄러를 함께 실행
        #[arg(long, default_value_t = false)]
        with_scheduler: bool,
    },
    /// 모든 렐름/진영 경매 1회 수집
    Ingest,
    /// 테이블 생성
    Setup,
    /// 모든 렐름 경매 삭제
    Purge,
}
// endregion: --- Cli

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 는 없어도 된다
    dotenvy::dotenv().ok();

    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            error!("{:<12} --> 설정 로드 실패: {}", "Main", e);
            return Err(e.into());
        }
    };

    // 저장소에 연결할 수 없으면 어떤 작업도 시작하지 않는다
    let db_manager = match DatabaseManager::connect(
        &config.database_url,
        config.db_max_connections,
    )
    .await
    {
        Ok(db_manager) => Arc::new(db_manager),
        Err(e) => {
            error!("{:<12} --> 데이터베이스 연결 실패: {:?}", "Main", e);
            return Err(e.into());
        }
    };

    match cli.command {
        Command::Setup => {
            db_manager.initialize_database().await?;
            info!("{:<12} --> 데이터베이스 초기화 성공", "Main");
        }
        Command::Purge => {
            let deleted = db_manager.purge_auctions().await?;
            info!("{:<12} --> 경매 삭제 완료: {} 건", "Main", deleted);
        }
        Command::Ingest => {
            let store = Arc::new(PgAuctionStore::new(db_manager.get_pool()));
            let report = ingest::run_ingestion(&config, store).await?;
            info!(
                "{:<12} --> 수집 완료: run={}, rows={}",
                "Main",
                report.run.id,
                report.loaded_rows()
            );
        }
        Command::Serve { with_scheduler } => {
            if with_scheduler {
                let store = Arc::new(PgAuctionStore::new(db_manager.get_pool()));
                let _scheduler = IngestionScheduler::new(Arc::clone(&config), store).start();
                info!(
                    "{:<12} --> 수집 스케줄러 시작: 주기 {:?}",
                    "Main", config.ingest_interval
                );
            }

            let routes_all = handlers::router(Arc::clone(&db_manager));

            let listener = TcpListener::bind(&config.bind_addr).await?;
            info!(
                "{:<12} --> Web Server: Listening on {}",
                "Main",
                listener.local_addr()?
            );

            // 서버 실행
            if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
                error!("{:<12} --> Server error: {}", "Main", err);
            }
        }
    }

    Ok(())
}
// endregion: --- Main
