/// 에러 분류
/// 1. 설정 에러 (시작 시 치명적)
/// 2. 외부 API 에러 (토큰 발급 실패는 실행 전체, 그 외는 해당 렐름/진영만 실패)
/// 3. 정규화 에러 (알 수 없는 남은 시간 카테고리)
/// 4. 적재 에러 (렐름/진영 단위 실패, 나머지는 계속 진행)
/// 5. 조회 에러 (HTTP 응답으로 변환)
// region:    --- Imports
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

// endregion: --- Imports

// region:    --- Config Error
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("필수 환경 변수가 없습니다: {0}")]
    MissingEnvVar(String),
    #[error("환경 변수 {var} 값이 올바르지 않습니다: {reason}")]
    InvalidEnvValue { var: String, reason: String },
}
// endregion: --- Config Error

// region:    --- Api Error
#[derive(Error, Debug)]
pub enum ApiError {
    /// 토큰이 없으면 어떤 요청도 불가능하므로 실행 전체를 중단한다.
    #[error("OAuth 토큰 발급 실패: {0}")]
    Token(String),
    #[error("외부 API 전송 오류: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("외부 API 응답 상태 오류: status={status}, path={path}")]
    Status { status: u16, path: String },
    #[error("외부 API 응답 해석 실패: {0}")]
    Decode(#[from] serde_json::Error),
}
// endregion: --- Api Error

// region:    --- Normalize Error
#[derive(Error, Debug, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("알 수 없는 남은 시간 카테고리: listing={listing_id}, value={value:?}")]
    UnknownTimeLeft { listing_id: i64, value: String },
    #[error("잘못된 즉시 구매가: listing={listing_id}, buyout={buyout}")]
    InvalidBuyout { listing_id: i64, buyout: i64 },
    #[error("잘못된 수량: listing={listing_id}, quantity={quantity}")]
    InvalidQuantity { listing_id: i64, quantity: i32 },
}
// endregion: --- Normalize Error

// region:    --- Ingest Error
/// 렐름/진영 한 쌍의 처리 중 발생한 에러
#[derive(Error, Debug)]
pub enum IngestError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    #[error("스테이징 파일 입출력 오류: {0}")]
    Io(#[from] std::io::Error),
    #[error("스테이징 CSV 오류: {0}")]
    Csv(#[from] csv::Error),
    #[error("데이터베이스 오류: {0}")]
    Database(#[from] sqlx::Error),
}
// endregion: --- Ingest Error

// region:    --- Run Error
/// 렐름 처리 시작 전에 실행 전체를 중단시키는 에러
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("실행 기록 실패: {0}")]
    Database(#[from] sqlx::Error),
}
// endregion: --- Run Error

// region:    --- Query Error
/// 조회 API 에러
/// 클라이언트 에러는 부분 데이터 없이 상태 코드와 메시지만 반환한다.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("limit 은 {max} 이하여야 합니다 (요청: {limit})")]
    PayloadTooLarge { limit: i64, max: i64 },
    #[error("잘못된 페이지 파라미터: page={page}, limit={limit}")]
    InvalidPagination { page: i64, limit: i64 },
    #[error("존재하지 않는 렐름입니다: {0}")]
    RealmNotFound(String),
    #[error("잘못된 진영입니다: {0}")]
    InvalidFaction(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("통계 계산 실패: {0}")]
    Stats(#[from] tokio::task::JoinError),
}

impl QueryError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            QueryError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            QueryError::InvalidPagination { .. } | QueryError::InvalidFaction(_) => {
                StatusCode::BAD_REQUEST
            }
            QueryError::RealmNotFound(_) => StatusCode::NOT_FOUND,
            QueryError::Database(_) | QueryError::Stats(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // 내부 에러 메시지는 로그에만 남긴다
        let message = if status.is_server_error() {
            error!("{:<12} --> 조회 처리 오류: {}", "Handler", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
// endregion: --- Query Error

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_error_status_codes() {
        assert_eq!(
            QueryError::PayloadTooLarge { limit: 101, max: 100 }.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            QueryError::RealmNotFound("stormwind".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            QueryError::InvalidPagination { page: 0, limit: 20 }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            QueryError::Database(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
