/// 수집 오케스트레이터
/// 실행 기록을 먼저 남긴 뒤, 모든 (렐름, 진영) 쌍을 제한된 동시성의 작업으로 처리한다.
/// 한 쌍의 실패(타임아웃, 적재 실패)는 다른 쌍에 영향을 주지 않으며 같은 실행 안에서 재시도하지 않는다.
///
/// 쌍별 상태 전이:
/// Fetching -> Normalizing -> (Empty: 종료) | (Staging -> Loading -> Releasing -> 종료)
// region:    --- Imports
use super::normalizer::{self, Normalized};
use super::staging::{self, StagingFile};
use super::{AuctionSource, AuctionStore, IngestionRun};
use crate::blizzard::FetchOutcome;
use crate::realm::{Faction, Realm, REALMS};
use chrono::{SubsecRound, Utc};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

// endregion: --- Imports

// region:    --- Pair Outcome
/// 쌍 처리 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PairStage {
    Fetching,
    Normalizing,
    Staging,
    Loading,
    Releasing,
}

impl fmt::Display for PairStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// 쌍 처리 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PairOutcome {
    Loaded { rows: u64 },
    /// 빈 경매장 (스테이징/적재 생략)
    Empty,
    /// 요청 시간 초과
    Skipped,
    Failed { stage: PairStage, reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct PairReport {
    pub realm: Realm,
    pub faction: Faction,
    pub outcome: PairOutcome,
}

/// 실행 결과
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run: IngestionRun,
    pub pairs: Vec<PairReport>,
}

impl RunReport {
    pub fn outcome_of(&self, realm_id: i32, faction: Faction) -> Option<&PairOutcome> {
        self.pairs
            .iter()
            .find(|p| p.realm.id == realm_id && p.faction == faction)
            .map(|p| &p.outcome)
    }

    pub fn loaded_rows(&self) -> u64 {
        self.pairs
            .iter()
            .map(|p| match p.outcome {
                PairOutcome::Loaded { rows } => rows,
                _ => 0,
            })
            .sum()
    }

    fn count(&self, pred: impl Fn(&PairOutcome) -> bool) -> usize {
        self.pairs.iter().filter(|p| pred(&p.outcome)).count()
    }
}
// endregion: --- Pair Outcome

// region:    --- Orchestrator
pub struct IngestionOrchestrator<S, L> {
    source: Arc<S>,
    store: Arc<L>,
    staging_dir: PathBuf,
    concurrency: usize,
    realms: Vec<Realm>,
}

impl<S, L> IngestionOrchestrator<S, L>
where
    S: AuctionSource + 'static,
    L: AuctionStore + 'static,
{
    pub fn new(source: Arc<S>, store: Arc<L>, staging_dir: PathBuf, concurrency: usize) -> Self {
        Self {
            source,
            store,
            staging_dir,
            concurrency: concurrency.max(1),
            realms: REALMS.to_vec(),
        }
    }

    /// 처리할 렐름 목록 지정 (기본값은 전체 렐름)
    pub fn with_realms(mut self, realms: Vec<Realm>) -> Self {
        self.realms = realms;
        self
    }

    /// 수집 1회 실행
    /// 실행 기록 실패는 어떤 쌍도 처리하기 전에 에러로 반환한다.
    pub async fn run(&self) -> Result<RunReport, sqlx::Error> {
        let started_at = Utc::now().naive_utc().trunc_subsecs(0);
        let run = self.store.record_run(started_at).await?;
        info!(
            "{:<12} --> 수집 시작: run={}, realms={}, concurrency={}",
            "Ingest",
            run.id,
            self.realms.len(),
            self.concurrency
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for realm in &self.realms {
            for faction in Faction::ALL {
                let realm = *realm;
                let source = Arc::clone(&self.source);
                let store = Arc::clone(&self.store);
                let staging_dir = self.staging_dir.clone();
                let run = run.clone();
                let semaphore = Arc::clone(&semaphore);

                tasks.spawn(async move {
                    // 세마포어는 닫지 않으므로 획득 실패는 없다
                    let _permit = semaphore.acquire_owned().await;
                    let (stage_tx, stage_rx) = watch::channel(PairStage::Fetching);
                    let pair = tokio::spawn(async move {
                        process_pair(&*source, &*store, &staging_dir, &run, realm, faction, &stage_tx)
                            .await
                    });
                    // 쌍 작업이 비정상 종료되어도 보고서에는 마지막 단계의 실패로 남긴다
                    let outcome = match pair.await {
                        Ok(outcome) => outcome,
                        Err(e) => PairOutcome::Failed {
                            stage: *stage_rx.borrow(),
                            reason: format!("작업 비정상 종료: {}", e),
                        },
                    };
                    log_outcome(&realm, faction, &outcome);
                    PairReport {
                        realm,
                        faction,
                        outcome,
                    }
                });
            }
        }

        let mut pairs = Vec::with_capacity(self.realms.len() * Faction::ALL.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(report) => pairs.push(report),
                Err(e) => error!("{:<12} --> 쌍 처리 작업 비정상 종료: {}", "Ingest", e),
            }
        }
        pairs.sort_by_key(|p| (p.realm.id, p.faction.sign()));

        let report = RunReport { run, pairs };
        info!(
            "{:<12} --> 수집 종료: run={}, loaded={}, empty={}, skipped={}, failed={}, rows={}",
            "Ingest",
            report.run.id,
            report.count(|o| matches!(o, PairOutcome::Loaded { .. })),
            report.count(|o| matches!(o, PairOutcome::Empty)),
            report.count(|o| matches!(o, PairOutcome::Skipped)),
            report.count(|o| matches!(o, PairOutcome::Failed { .. })),
            report.loaded_rows()
        );
        Ok(report)
    }
}
// endregion: --- Orchestrator

// region:    --- Pair Processing
/// (렐름, 진영) 한 쌍 처리
/// 현재 단계는 `stage` 로 알린다.
async fn process_pair<S, L>(
    source: &S,
    store: &L,
    staging_dir: &Path,
    run: &IngestionRun,
    realm: Realm,
    faction: Faction,
    stage: &watch::Sender<PairStage>,
) -> PairOutcome
where
    S: AuctionSource + ?Sized,
    L: AuctionStore + ?Sized,
{
    let failed = |stage: PairStage, reason: String| PairOutcome::Failed { stage, reason };
    let enter = |next: PairStage| {
        debug!("{:<12} --> {} {}: {}", "Ingest", realm.name, faction, next);
        stage.send_replace(next);
    };

    // 1. 수집
    enter(PairStage::Fetching);
    let snapshot = match source.fetch_auctions(&realm, faction).await {
        Ok(FetchOutcome::Fetched(snapshot)) => snapshot,
        Ok(FetchOutcome::TimedOut) => return PairOutcome::Skipped,
        Err(e) => return failed(PairStage::Fetching, e.to_string()),
    };

    // 2. 정규화
    enter(PairStage::Normalizing);
    let rows = match normalizer::normalize(&snapshot, faction, run.api_request_time) {
        Ok(Normalized::Rows(rows)) => rows,
        Ok(Normalized::Empty) => return PairOutcome::Empty,
        Err(e) => return failed(PairStage::Normalizing, e.to_string()),
    };
    drop(snapshot);

    // 3. 스테이징 (파일 기록은 블로킹 작업)
    enter(PairStage::Staging);
    let dir = staging_dir.to_path_buf();
    let run_id = run.id;
    let mut staged: StagingFile = match tokio::task::spawn_blocking(move || {
        staging::stage(&dir, run_id, &realm, faction, &rows)
    })
    .await
    {
        Ok(Ok(staged)) => staged,
        Ok(Err(e)) => return failed(PairStage::Staging, e.to_string()),
        Err(e) => return failed(PairStage::Staging, e.to_string()),
    };

    // 4. 적재
    enter(PairStage::Loading);
    let loaded = store.load(&staged, &realm, faction).await;

    // 5. 정리 (적재 성공 여부와 관계없이 항상 수행)
    enter(PairStage::Releasing);
    let released = staged.release().await;
    if let Err(e) = &released {
        warn!(
            "{:<12} --> 스테이징 파일 삭제 실패: {:?}, {}",
            "Ingest",
            staged.path(),
            e
        );
    }

    match (loaded, released) {
        // 데이터는 이미 커밋되었으므로 삭제 실패와 관계없이 적재 결과는 유지한다
        (Ok(rows), _) => PairOutcome::Loaded { rows },
        (Err(e), Ok(_)) => failed(PairStage::Loading, e.to_string()),
        (Err(e), Err(release_err)) => failed(
            PairStage::Loading,
            format!("{} (스테이징 파일 삭제 실패: {})", e, release_err),
        ),
    }
}

fn log_outcome(realm: &Realm, faction: Faction, outcome: &PairOutcome) {
    match outcome {
        PairOutcome::Loaded { rows } => info!(
            "{:<12} --> 적재 성공: realm={}, faction={}, rows={}",
            "Ingest", realm.name, faction, rows
        ),
        PairOutcome::Empty => info!(
            "{:<12} --> 빈 경매장: realm={}, faction={}",
            "Ingest", realm.name, faction
        ),
        PairOutcome::Skipped => warn!(
            "{:<12} --> 시간 초과로 건너뜀: realm={}, faction={}",
            "Ingest", realm.name, faction
        ),
        PairOutcome::Failed { stage, reason } => error!(
            "{:<12} --> 처리 실패: realm={}, faction={}, stage={}, reason={}",
            "Ingest", realm.name, faction, stage, reason
        ),
    }
}
// endregion: --- Pair Processing
