// region:    --- Imports
use crate::database::DatabaseManager;
use crate::error::QueryError;
use crate::query::{self, PageParams};
use crate::realm::{self, Faction, Realm};
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

// endregion: --- Imports

// region:    --- Router
/// 조회 API 라우터
pub fn router(db_manager: Arc<DatabaseManager>) -> Router {
    // 프론트엔드 개발 서버를 위한 cors 설정
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/items/:realm_name/:faction_sign/:wow_item_id",
            get(handle_get_item_statistics),
        )
        .route(
            "/auctions/:realm_name/:faction_sign/:wow_item_slug",
            get(handle_get_live_auctions),
        )
        .route("/item_search/:wow_item_slug", get(handle_search_items))
        .layer(cors)
        .with_state(db_manager)
}
// endregion: --- Router

// region:    --- Query Handlers

/// 아이템 가격 통계 조회
/// 수집 시각별 최저가, 평균, 중앙값, 건수
pub async fn handle_get_item_statistics(
    State(db_manager): State<Arc<DatabaseManager>>,
    Path((realm_name, faction_sign, wow_item_id)): Path<(String, String, i32)>,
) -> Result<impl IntoResponse, QueryError> {
    info!(
        "{:<12} --> 아이템 통계 조회: {}/{}/{}",
        "HandlerQuery", realm_name, faction_sign, wow_item_id
    );
    let realm = resolve_realm(&realm_name)?;
    let faction = resolve_faction(&faction_sign)?;

    let stats =
        query::handlers::get_item_statistics(&db_manager, realm, faction, wow_item_id).await?;
    Ok(Json(stats))
}

/// 최신 경매 조회
/// limit 검증은 렐름 확인과 저장소 접근보다 먼저 수행한다.
pub async fn handle_get_live_auctions(
    State(db_manager): State<Arc<DatabaseManager>>,
    Path((realm_name, faction_sign, wow_item_slug)): Path<(String, String, String)>,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, QueryError> {
    info!(
        "{:<12} --> 최신 경매 조회: {}/{}/{} {:?}",
        "HandlerQuery", realm_name, faction_sign, wow_item_slug, params
    );
    let pagination = params.validate()?;
    let realm = resolve_realm(&realm_name)?;
    let faction = resolve_faction(&faction_sign)?;

    let auctions = query::handlers::get_live_auctions(
        &db_manager,
        realm,
        faction,
        &wow_item_slug,
        pagination,
    )
    .await?;
    Ok(Json(auctions))
}

/// 아이템 검색
pub async fn handle_search_items(
    State(db_manager): State<Arc<DatabaseManager>>,
    Path(wow_item_slug): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, QueryError> {
    info!(
        "{:<12} --> 아이템 검색: {} {:?}",
        "HandlerQuery", wow_item_slug, params
    );
    let pagination = params.validate()?;

    let items = query::handlers::search_items(&db_manager, &wow_item_slug, pagination).await?;
    Ok(Json(items))
}

// endregion: --- Query Handlers

fn resolve_realm(name: &str) -> Result<&'static Realm, QueryError> {
    realm::find_by_name(name).ok_or_else(|| QueryError::RealmNotFound(name.to_string()))
}

fn resolve_faction(sign: &str) -> Result<Faction, QueryError> {
    sign.parse().map_err(QueryError::InvalidFaction)
}
