/// 환경 변수 기반 설정
// region:    --- Imports
use crate::error::ConfigError;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

// endregion: --- Imports

// region:    --- Defaults
const DEFAULT_TOKEN_URL: &str = "https://us.battle.net/oauth/token";
const DEFAULT_API_URL: &str = "https://eu.api.blizzard.com";
const DEFAULT_NAMESPACE: &str = "dynamic-classic-eu";
const DEFAULT_LOCALE: &str = "en_GB";
const DEFAULT_API_TIMEOUT_SECS: u64 = 10;
const DEFAULT_STAGING_DIR: &str = "cache";
const DEFAULT_INGEST_CONCURRENCY: usize = 8;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 16;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_INGEST_INTERVAL_SECS: u64 = 3600;
// endregion: --- Defaults

// region:    --- Config
/// 외부 API 접속 설정
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub client_id: String,
    pub client_secret: String,
    pub token_url: String,
    pub base_url: String,
    pub namespace: String,
    pub locale: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub api: ApiConfig,
    pub staging_dir: PathBuf,
    pub ingest_concurrency: usize,
    pub bind_addr: String,
    pub ingest_interval: Duration,
}

impl Config {
    /// 환경 변수에서 설정 로드
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 임의의 조회 함수로 설정 로드 (테스트에서 환경 변수 대신 사용)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).ok_or_else(|| ConfigError::MissingEnvVar(key.into()));
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.into());

        let ingest_concurrency = parse_or(&lookup, "INGEST_CONCURRENCY", DEFAULT_INGEST_CONCURRENCY)?;
        if ingest_concurrency == 0 {
            return Err(ConfigError::InvalidEnvValue {
                var: "INGEST_CONCURRENCY".into(),
                reason: "0 보다 커야 합니다".into(),
            });
        }

        // 적재 작업마다 커넥션 하나, 실행 기록/조회용 하나
        let db_max_connections: u32 =
            parse_or(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?;
        if (db_max_connections as usize) < ingest_concurrency.saturating_add(1) {
            return Err(ConfigError::InvalidEnvValue {
                var: "DB_MAX_CONNECTIONS".into(),
                reason: format!(
                    "INGEST_CONCURRENCY({}) + 1 이상이어야 합니다",
                    ingest_concurrency
                ),
            });
        }

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            db_max_connections,
            api: ApiConfig {
                client_id: required("BLIZZARD_CLIENT_ID")?,
                client_secret: required("BLIZZARD_CLIENT_SECRET")?,
                token_url: or_default("BLIZZARD_TOKEN_URL", DEFAULT_TOKEN_URL),
                base_url: or_default("BLIZZARD_API_URL", DEFAULT_API_URL),
                namespace: or_default("BLIZZARD_NAMESPACE", DEFAULT_NAMESPACE),
                locale: or_default("BLIZZARD_LOCALE", DEFAULT_LOCALE),
                timeout: Duration::from_secs(parse_or(
                    &lookup,
                    "API_TIMEOUT_SECS",
                    DEFAULT_API_TIMEOUT_SECS,
                )?),
            },
            staging_dir: PathBuf::from(or_default("STAGING_DIR", DEFAULT_STAGING_DIR)),
            ingest_concurrency,
            bind_addr: or_default("BIND_ADDR", DEFAULT_BIND_ADDR),
            ingest_interval: Duration::from_secs(parse_or(
                &lookup,
                "INGEST_INTERVAL_SECS",
                DEFAULT_INGEST_INTERVAL_SECS,
            )?),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidEnvValue {
            var: key.into(),
            reason: e.to_string(),
        }),
    }
}
// endregion: --- Config

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("DATABASE_URL", "postgres://localhost/auctionation"),
        ("BLIZZARD_CLIENT_ID", "id"),
        ("BLIZZARD_CLIENT_SECRET", "secret"),
    ];

    #[test]
    fn defaults_apply_when_optional_vars_missing() {
        let config = Config::from_lookup(lookup_from(&REQUIRED)).unwrap();
        assert_eq!(config.api.timeout, Duration::from_secs(10));
        assert_eq!(config.api.namespace, "dynamic-classic-eu");
        assert_eq!(config.ingest_concurrency, 8);
        assert_eq!(config.staging_dir, PathBuf::from("cache"));
    }

    #[test]
    fn missing_required_var_is_reported() {
        let err = Config::from_lookup(lookup_from(&REQUIRED[..2])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "BLIZZARD_CLIENT_SECRET"));
    }

    #[test]
    fn invalid_number_is_reported() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("API_TIMEOUT_SECS", "ten"));
        let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvValue { ref var, .. } if var == "API_TIMEOUT_SECS"));
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("INGEST_CONCURRENCY", "0"));
        assert!(Config::from_lookup(lookup_from(&pairs)).is_err());
    }

    #[test]
    fn pool_smaller_than_concurrency_is_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("INGEST_CONCURRENCY", "32"));
        pairs.push(("DB_MAX_CONNECTIONS", "2"));
        let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvValue { ref var, .. } if var == "DB_MAX_CONNECTIONS"));

        // 정확히 동시성 + 1 이면 허용
        pairs.pop();
        pairs.push(("DB_MAX_CONNECTIONS", "33"));
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.db_max_connections, 33);
    }
}
