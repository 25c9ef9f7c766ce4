/// 경매 스냅샷 정규화
/// 1. 즉시 구매가가 없는(입찰 전용) 항목 제외
/// 2. 남은 시간 카테고리를 정수 코드로 변환
// region:    --- Imports
use crate::blizzard::{AuctionSnapshot, RawAuction};
use crate::error::NormalizeError;
use crate::realm::Faction;
use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::debug;

// endregion: --- Imports

// region:    --- Time Left
/// 경매 남은 시간 카테고리
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TimeLeft {
    Short,
    Medium,
    Long,
    VeryLong,
}

impl TimeLeft {
    pub const ALL: [TimeLeft; 4] = [
        TimeLeft::Short,
        TimeLeft::Medium,
        TimeLeft::Long,
        TimeLeft::VeryLong,
    ];

    /// 외부 API 표기로부터 변환 (알 수 없는 값은 None)
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "SHORT" => Some(TimeLeft::Short),
            "MEDIUM" => Some(TimeLeft::Medium),
            "LONG" => Some(TimeLeft::Long),
            "VERY_LONG" => Some(TimeLeft::VeryLong),
            _ => None,
        }
    }

    /// 저장용 정수 코드 (1..=4)
    pub fn code(self) -> i16 {
        match self {
            TimeLeft::Short => 1,
            TimeLeft::Medium => 2,
            TimeLeft::Long => 3,
            TimeLeft::VeryLong => 4,
        }
    }

    pub fn from_code(code: i16) -> Option<Self> {
        TimeLeft::ALL.into_iter().find(|t| t.code() == code)
    }
}
// endregion: --- Time Left

// region:    --- Auction Row
/// 정규화된 경매 행
/// 한 번의 정규화 호출에서 나온 행은 모두 같은 `ingested_at` 을 가진다.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuctionRow {
    pub faction: Faction,
    pub listing_id: i64,
    pub item_id: i32,
    pub buyout: i64,
    pub quantity: i32,
    pub ingested_at: NaiveDateTime,
    pub time_left: TimeLeft,
}

/// 정규화 결과
/// 빈 경매장은 행이 있는 결과와 구분해 이후 스테이징/적재를 건너뛴다.
#[derive(Debug, PartialEq)]
pub enum Normalized {
    Empty,
    Rows(Vec<AuctionRow>),
}
// endregion: --- Auction Row

// region:    --- Normalize
/// 스냅샷 정규화
/// 진영은 응답에서 추론하지 않고 호출자가 넘긴 값을 그대로 사용한다.
pub fn normalize(
    snapshot: &AuctionSnapshot,
    faction: Faction,
    ingested_at: NaiveDateTime,
) -> Result<Normalized, NormalizeError> {
    let mut rows = Vec::with_capacity(snapshot.auctions.len());

    for raw in &snapshot.auctions {
        if let Some(row) = normalize_one(raw, faction, ingested_at)? {
            rows.push(row);
        }
    }

    debug!(
        "{:<12} --> 정규화 완료: 원본 {} 건, 행 {} 건",
        "Normalize",
        snapshot.auctions.len(),
        rows.len()
    );

    if rows.is_empty() {
        return Ok(Normalized::Empty);
    }
    Ok(Normalized::Rows(rows))
}

fn normalize_one(
    raw: &RawAuction,
    faction: Faction,
    ingested_at: NaiveDateTime,
) -> Result<Option<AuctionRow>, NormalizeError> {
    // 입찰 전용 항목은 즉시 구매가 정보가 없으므로 제외
    if raw.buyout == 0 {
        return Ok(None);
    }
    if raw.buyout < 0 {
        return Err(NormalizeError::InvalidBuyout {
            listing_id: raw.id,
            buyout: raw.buyout,
        });
    }
    if raw.quantity < 1 {
        return Err(NormalizeError::InvalidQuantity {
            listing_id: raw.id,
            quantity: raw.quantity,
        });
    }

    let time_left = raw
        .time_left
        .as_deref()
        .and_then(TimeLeft::parse)
        .ok_or_else(|| NormalizeError::UnknownTimeLeft {
            listing_id: raw.id,
            value: raw.time_left.clone().unwrap_or_default(),
        })?;

    Ok(Some(AuctionRow {
        faction,
        listing_id: raw.id,
        item_id: raw.item.id,
        buyout: raw.buyout,
        quantity: raw.quantity,
        ingested_at,
        time_left,
    }))
}
// endregion: --- Normalize
