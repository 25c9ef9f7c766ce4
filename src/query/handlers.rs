// region:    --- Imports
use super::model::{ItemData, LiveAuction, LiveAuctionRow};
use super::{escape_like, queries, Pagination};
use crate::database::DatabaseManager;
use crate::error::QueryError;
use crate::realm::{Faction, Realm};
use crate::stats::{self, ItemStatistics};
use chrono::NaiveDateTime;
use sqlx::Error as SqlxError;
use tracing::info;

// endregion: --- Imports

// region:    --- Query Handlers

/// 아이템 가격 통계 조회
/// 저장된 모든 수집 시각에 대해 최저가, 평균, 중앙값, 건수를 계산한다.
pub async fn get_item_statistics(
    db_manager: &DatabaseManager,
    realm: &Realm,
    faction: Faction,
    item_id: i32,
) -> Result<ItemStatistics, QueryError> {
    info!(
        "{:<12} --> 아이템 통계 조회: realm={}, faction={}, item={}",
        "Query", realm.name, faction, item_id
    );
    let sql = queries::read_item_prices(realm);
    let sign = faction.sign().to_string();
    let rows: Result<Vec<(i64, NaiveDateTime, i32)>, SqlxError> = db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, (i64, NaiveDateTime, i32)>(&sql)
                    .bind(sign)
                    .bind(item_id)
                    .fetch_all(&mut **tx)
                    .await
            })
        })
        .await;

    Ok(stats::compute(stats::group_observations(rows?)).await?)
}

/// 최신 수집분 경매 조회
pub async fn get_live_auctions(
    db_manager: &DatabaseManager,
    realm: &Realm,
    faction: Faction,
    name: &str,
    pagination: Pagination,
) -> Result<Vec<LiveAuction>, SqlxError> {
    info!(
        "{:<12} --> 최신 경매 조회: realm={}, faction={}, name={}, offset={}, limit={}",
        "Query", realm.name, faction, name, pagination.offset, pagination.limit
    );
    let sql = queries::read_live_auctions(realm);
    let sign = faction.sign().to_string();
    let pattern = escape_like(name);
    let rows: Result<Vec<LiveAuctionRow>, SqlxError> = db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, LiveAuctionRow>(&sql)
                    .bind(sign)
                    .bind(pattern)
                    .bind(pagination.offset)
                    .bind(pagination.limit)
                    .fetch_all(&mut **tx)
                    .await
            })
        })
        .await;

    Ok(rows?.into_iter().map(LiveAuction::from).collect())
}

/// 아이템 검색
pub async fn search_items(
    db_manager: &DatabaseManager,
    name: &str,
    pagination: Pagination,
) -> Result<Vec<ItemData>, SqlxError> {
    info!(
        "{:<12} --> 아이템 검색: name={}, offset={}, limit={}",
        "Query", name, pagination.offset, pagination.limit
    );
    let pattern = escape_like(name);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, ItemData>(queries::SEARCH_ITEMS)
                    .bind(pattern)
                    .bind(pagination.offset)
                    .bind(pagination.limit)
                    .fetch_all(&mut **tx)
                    .await
            })
        })
        .await
}

// endregion: --- Query Handlers
