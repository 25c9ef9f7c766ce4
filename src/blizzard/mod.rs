/// 외부 경매 API 클라이언트
/// 1. OAuth client-credentials 토큰 발급 (클라이언트 생성 시 1회)
/// 2. 제한 시간이 있는 GET 요청 (타임아웃은 에러가 아닌 결과로 반환)
// region:    --- Imports
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::realm::{Faction, Realm};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};

// endregion: --- Imports

// region:    --- Payload Model
/// 경매장 스냅샷 응답
#[derive(Debug, Clone, Deserialize)]
pub struct AuctionSnapshot {
    /// 빈 경매장은 필드 자체가 없을 수 있다
    #[serde(default)]
    pub auctions: Vec<RawAuction>,
}

/// 정규화 전 경매 항목
#[derive(Debug, Clone, Deserialize)]
pub struct RawAuction {
    pub id: i64,
    pub item: RawItemRef,
    /// 입찰만 가능한 항목은 buyout 이 0 이거나 없다
    #[serde(default)]
    pub buyout: i64,
    pub quantity: i32,
    #[serde(default)]
    pub time_left: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawItemRef {
    pub id: i32,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}
// endregion: --- Payload Model

// region:    --- Fetch Outcome
/// GET 요청 결과
/// 호출량이 많아 타임아웃은 예상 가능한 상황이므로 별도 결과로 구분한다.
#[derive(Debug)]
pub enum FetchOutcome<T> {
    Fetched(T),
    TimedOut,
}
// endregion: --- Fetch Outcome

// region:    --- Blizzard Client
pub struct BlizzardClient {
    http: Client,
    config: ApiConfig,
    token: String,
}

impl BlizzardClient {
    /// 클라이언트 생성 및 토큰 발급
    /// 토큰 발급 실패 시 어떤 요청도 할 수 없으므로 에러를 그대로 반환한다.
    pub async fn connect(config: ApiConfig) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        let token = Self::acquire_token(&http, &config).await?;
        info!("{:<12} --> OAuth 토큰 발급 성공", "Api");
        Ok(Self {
            http,
            config,
            token,
        })
    }

    /// client-credentials 토큰 교환
    async fn acquire_token(http: &Client, config: &ApiConfig) -> Result<String, ApiError> {
        let response = http
            .post(&config.token_url)
            .basic_auth(&config.client_id, Some(&config.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| ApiError::Token(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Token(format!("status={}", status.as_u16())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Token(e.to_string()))?;
        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|e| ApiError::Token(e.to_string()))?;
        Ok(token.access_token)
    }

    /// 인증된 GET 요청
    /// 타임아웃은 `FetchOutcome::TimedOut`, 그 외 전송/상태/해석 실패는 에러
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<FetchOutcome<T>, ApiError> {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        debug!("{:<12} --> GET {}", "Api", path);

        let response = match self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[
                ("namespace", self.config.namespace.as_str()),
                ("locale", self.config.locale.as_str()),
            ])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() => return Ok(FetchOutcome::TimedOut),
            Err(e) => return Err(ApiError::Transport(e)),
        };

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        // 본문 수신 중에도 제한 시간이 적용된다
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) if e.is_timeout() => return Ok(FetchOutcome::TimedOut),
            Err(e) => return Err(ApiError::Transport(e)),
        };

        Ok(FetchOutcome::Fetched(serde_json::from_str(&body)?))
    }

    /// 렐름/진영 경매장 스냅샷 조회
    pub async fn fetch_auctions(
        &self,
        realm: &Realm,
        faction: Faction,
    ) -> Result<FetchOutcome<AuctionSnapshot>, ApiError> {
        let path = auctions_path(realm, faction);
        let outcome = self.get_json::<AuctionSnapshot>(&path).await?;
        if let FetchOutcome::TimedOut = outcome {
            warn!(
                "{:<12} --> 요청 시간 초과: realm={}, faction={}",
                "Api", realm.id, faction
            );
        }
        Ok(outcome)
    }
}

/// 경매장 리소스 경로
pub fn auctions_path(realm: &Realm, faction: Faction) -> String {
    format!(
        "/data/wow/connected-realm/{}/auctions/{}",
        realm.id,
        faction.auction_house_id()
    )
}
// endregion: --- Blizzard Client

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auctions_path_uses_faction_code() {
        let realm = Realm {
            id: 4440,
            name: "everlook",
        };
        assert_eq!(
            auctions_path(&realm, Faction::Horde),
            "/data/wow/connected-realm/4440/auctions/6"
        );
    }

    #[test]
    fn snapshot_without_auctions_field_is_empty() {
        let snapshot: AuctionSnapshot = serde_json::from_str(r#"{"_links":{}}"#).unwrap();
        assert!(snapshot.auctions.is_empty());
    }

    #[test]
    fn raw_auction_defaults() {
        let raw: RawAuction =
            serde_json::from_str(r#"{"id":1,"item":{"id":2589},"bid":100,"quantity":5}"#).unwrap();
        assert_eq!(raw.buyout, 0);
        assert_eq!(raw.time_left, None);
    }
}
