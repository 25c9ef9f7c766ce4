/// 스테이징 파일
/// 정규화된 행을 렐름/진영 단위 CSV 파일로 기록하고, 적재 후 성공 여부와 관계없이 삭제한다.
// region:    --- Imports
use super::normalizer::AuctionRow;
use crate::error::IngestError;
use crate::realm::{Faction, Realm};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

// endregion: --- Imports

// region:    --- Constants
/// 스테이징 파일 컬럼 순서 (헤더 행으로 1회 기록)
pub const STAGING_COLUMNS: [&str; 7] = [
    "faction",
    "wow_id",
    "wow_item_id",
    "buyout",
    "quantity",
    "api_request_time",
    "time_left",
];

/// 수집 시각 텍스트 형식 (Postgres TIMESTAMP 로 그대로 해석된다)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
// endregion: --- Constants

// region:    --- Staging File
/// 스테이징 파일 핸들
/// `release` 는 여러 번 호출해도 파일 삭제는 한 번만 일어난다.
/// 해제하지 않고 drop 되면 그 시점에 삭제한다.
#[derive(Debug)]
pub struct StagingFile {
    path: PathBuf,
    realm_id: i32,
    faction: Faction,
    rows: usize,
    released: bool,
}

impl StagingFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// 스테이징 파일 삭제
    /// 이번 호출에서 실제로 삭제했으면 true
    pub async fn release(&mut self) -> Result<bool, io::Error> {
        if self.released {
            return Ok(false);
        }
        self.released = true;
        let removed = tokio::fs::remove_file(&self.path).await;
        self.removed(removed)
    }

    /// 비동기 컨텍스트 밖(drop, 블로킹 스테이징 작업)에서의 삭제
    fn release_blocking(&mut self) -> Result<bool, io::Error> {
        if self.released {
            return Ok(false);
        }
        self.released = true;
        let removed = fs::remove_file(&self.path);
        self.removed(removed)
    }

    fn removed(&self, result: io::Result<()>) -> Result<bool, io::Error> {
        match result {
            Ok(()) => {
                debug!(
                    "{:<12} --> 스테이징 파일 삭제: realm={}, faction={}",
                    "Staging", self.realm_id, self.faction
                );
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}

impl Drop for StagingFile {
    fn drop(&mut self) {
        if !self.released {
            if let Err(e) = self.release_blocking() {
                warn!(
                    "{:<12} --> 스테이징 파일 삭제 실패: {:?}, {}",
                    "Staging", self.path, e
                );
            }
        }
    }
}
// endregion: --- Staging File

// region:    --- Stage
/// 스테이징 파일 경로 (`<dir>/<realm_id>_<faction>_<run_id>.csv`)
pub fn staging_path(dir: &Path, run_id: i64, realm: &Realm, faction: Faction) -> PathBuf {
    dir.join(format!("{}_{}_{}.csv", realm.id, faction.sign(), run_id))
}

/// 행을 스테이징 파일로 기록
/// 기록 도중 실패하면 만들어진 파일을 지우고 에러를 반환한다.
pub fn stage(
    dir: &Path,
    run_id: i64,
    realm: &Realm,
    faction: Faction,
    rows: &[AuctionRow],
) -> Result<StagingFile, IngestError> {
    fs::create_dir_all(dir)?;

    let mut staged = StagingFile {
        path: staging_path(dir, run_id, realm, faction),
        realm_id: realm.id,
        faction,
        rows: rows.len(),
        released: false,
    };

    if let Err(e) = write_rows(&staged.path, rows) {
        if let Err(release_err) = staged.release_blocking() {
            warn!(
                "{:<12} --> 실패한 스테이징 파일 삭제 실패: {}",
                "Staging", release_err
            );
        }
        return Err(e);
    }

    debug!(
        "{:<12} --> 스테이징 완료: realm={}, faction={}, rows={}",
        "Staging",
        realm.id,
        faction,
        rows.len()
    );
    Ok(staged)
}

fn write_rows(path: &Path, rows: &[AuctionRow]) -> Result<(), IngestError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(STAGING_COLUMNS)?;

    for row in rows {
        writer.write_record([
            row.faction.sign().to_string(),
            row.listing_id.to_string(),
            row.item_id.to_string(),
            row.buyout.to_string(),
            row.quantity.to_string(),
            row.ingested_at.format(TIMESTAMP_FORMAT).to_string(),
            row.time_left.code().to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
// endregion: --- Stage

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::normalizer::TimeLeft;
    use chrono::NaiveDate;

    const REALM: Realm = Realm {
        id: 4476,
        name: "gehennas",
    };

    fn row(listing_id: i64, time_left: TimeLeft) -> AuctionRow {
        AuctionRow {
            faction: Faction::Horde,
            listing_id,
            item_id: 13444,
            buyout: 12500,
            quantity: 5,
            ingested_at: NaiveDate::from_ymd_opt(2021, 3, 14)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
            time_left,
        }
    }

    #[test]
    fn writes_header_then_rows_in_column_order() {
        let dir = tempfile::tempdir().unwrap();
        let staged = stage(
            dir.path(),
            1,
            &REALM,
            Faction::Horde,
            &[row(100, TimeLeft::Short), row(101, TimeLeft::VeryLong)],
        )
        .unwrap();

        let content = fs::read_to_string(staged.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines,
            vec![
                "faction,wow_id,wow_item_id,buyout,quantity,api_request_time,time_left",
                "h,100,13444,12500,5,2021-03-14 09:30:00,1",
                "h,101,13444,12500,5,2021-03-14 09:30:00,4",
            ]
        );
        assert_eq!(staged.row_count(), 2);
    }

    #[tokio::test]
    async fn release_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut staged =
            stage(dir.path(), 2, &REALM, Faction::Horde, &[row(1, TimeLeft::Long)]).unwrap();
        let path = staged.path().to_path_buf();

        assert!(staged.release().await.unwrap());
        assert!(!staged.release().await.unwrap());
        assert!(staged.is_released());
        assert!(!path.exists());
    }

    #[test]
    fn dropping_unreleased_handle_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let staged =
            stage(dir.path(), 3, &REALM, Faction::Horde, &[row(1, TimeLeft::Long)]).unwrap();
        let path = staged.path().to_path_buf();
        assert!(path.exists());

        drop(staged);
        assert!(!path.exists());
    }

    /// 삭제할 수 없는 경로는 에러로 보고하고 다시 시도하지 않는다
    #[tokio::test]
    async fn release_reports_undeletable_path_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut staged =
            stage(dir.path(), 4, &REALM, Faction::Horde, &[row(1, TimeLeft::Long)]).unwrap();
        let path = staged.path().to_path_buf();
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();

        assert!(staged.release().await.is_err());
        assert!(staged.is_released());
        assert!(!staged.release().await.unwrap());
        assert!(path.is_dir());
    }

    #[test]
    fn staging_path_is_scoped_by_realm_faction_and_run() {
        let path = staging_path(Path::new("cache"), 42, &REALM, Faction::Alliance);
        assert_eq!(path, Path::new("cache").join("4476_a_42.csv"));
    }
}
