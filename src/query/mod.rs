pub mod handlers;
pub mod model;
pub mod queries;

// region:    --- Pagination
use crate::error::QueryError;
use serde::Deserialize;

/// 한 페이지 최대 항목 수
pub const MAX_PAGE_LIMIT: i64 = 100;
pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 20;

/// 페이지 요청 파라미터 (`?page=&limit=`)
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    DEFAULT_PAGE
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// 검증된 페이지 범위
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub offset: i64,
    pub limit: i64,
}

impl PageParams {
    /// 저장소 접근 전에 검증한다
    pub fn validate(&self) -> Result<Pagination, QueryError> {
        if self.limit > MAX_PAGE_LIMIT {
            return Err(QueryError::PayloadTooLarge {
                limit: self.limit,
                max: MAX_PAGE_LIMIT,
            });
        }
        if self.page < 1 || self.limit < 1 {
            return Err(QueryError::InvalidPagination {
                page: self.page,
                limit: self.limit,
            });
        }

        let offset = (self.page - 1)
            .checked_mul(self.limit)
            .ok_or(QueryError::InvalidPagination {
                page: self.page,
                limit: self.limit,
            })?;
        Ok(Pagination {
            offset,
            limit: self.limit,
        })
    }
}
// endregion: --- Pagination

/// LIKE 패턴 특수 문자 이스케이프 (부분 문자열 그대로 일치시키기 위함)
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_computed_from_page_and_limit() {
        let pagination = PageParams { page: 2, limit: 20 }.validate().unwrap();
        assert_eq!(pagination, Pagination { offset: 20, limit: 20 });
        assert_eq!(
            PageParams::default().validate().unwrap(),
            Pagination { offset: 0, limit: 20 }
        );
    }

    #[test]
    fn limit_above_max_is_payload_too_large() {
        assert!(matches!(
            PageParams { page: 1, limit: 101 }.validate(),
            Err(QueryError::PayloadTooLarge { limit: 101, max: 100 })
        ));
        assert!(PageParams { page: 1, limit: 100 }.validate().is_ok());
    }

    #[test]
    fn non_positive_page_or_limit_is_rejected() {
        assert!(matches!(
            PageParams { page: 0, limit: 20 }.validate(),
            Err(QueryError::InvalidPagination { .. })
        ));
        assert!(matches!(
            PageParams { page: 1, limit: 0 }.validate(),
            Err(QueryError::InvalidPagination { .. })
        ));
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("Linen"), "Linen");
        assert_eq!(escape_like("100%_a\\b"), "100\\%\\_a\\\\b");
    }
}
