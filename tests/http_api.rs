use auctionation::database::DatabaseManager;
use auctionation::handlers;
use axum::http::StatusCode;
use reqwest::Client;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;

/// 저장소에 실제로 연결하지 않는 서버 실행
/// 검증 단계에서 거절되는 요청은 커넥션을 요구하지 않는다.
async fn spawn_server() -> String {
    let pool = PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_millis(200))
        .connect_lazy("postgres://nobody@127.0.0.1:1/unreachable")
        .expect("lazy pool 생성 실패");
    let app = handlers::router(Arc::new(DatabaseManager::from_pool(pool)));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service()).await.unwrap();
    });
    format!("http://{addr}")
}

async fn get(url: String) -> (StatusCode, Value) {
    let response = Client::new().get(url).send().await.unwrap();
    let status = StatusCode::from_u16(response.status().as_u16()).unwrap();
    let body = response.json::<Value>().await.unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn auctions_limit_above_max_is_payload_too_large() {
    let base = spawn_server().await;
    let (status, body) = get(format!("{base}/auctions/gehennas/a/linen?page=1&limit=101")).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn limit_check_precedes_realm_lookup() {
    let base = spawn_server().await;
    let (status, _) = get(format!("{base}/auctions/stormwind/a/linen?limit=500")).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn unknown_realm_is_not_found() {
    let base = spawn_server().await;
    let (status, _) = get(format!("{base}/auctions/stormwind/a/linen")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(format!("{base}/items/stormwind/h/2589")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_faction_is_bad_request() {
    let base = spawn_server().await;
    let (status, _) = get(format!("{base}/items/gehennas/x/2589")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn item_search_validates_pagination() {
    let base = spawn_server().await;
    let (status, _) = get(format!("{base}/item_search/linen?limit=101")).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

    let (status, _) = get(format!("{base}/item_search/linen?page=0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// 저장소 장애는 내부 메시지를 노출하지 않는 500 응답이 된다
#[tokio::test]
async fn store_failure_is_internal_error_without_details() {
    let base = spawn_server().await;
    let (status, body) = get(format!("{base}/item_search/linen")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
}
