use std::env;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use chrono::NaiveDate;

use crate::models::Market;
use crate::repositories::SnapshotConflictPolicy;

const DEFAULT_TWSE_BASE_URL: &str = "https://www.twse.com.tw/exchangeReport/MI_INDEX";
const DEFAULT_FINMIND_BASE_URL: &str = "https://api.finmindtrade.com/api/v4/data";
const DEFAULT_DIVIDEND_START_DATE: &str = "2018-01-01";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DB_POOL_SIZE: u32 = 4;

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub database_url: String,
    pub db_pool_size: u32,
    pub twse_base_url: String,
    pub finmind_base_url: String,
    pub finmind_api_token: Option<String>,
    pub dividend_start_date: NaiveDate,
    pub http_timeout: Duration,
    pub dividend_request_delay: Duration,
    pub snapshot_conflict_policy: SnapshotConflictPolicy,
}

impl SyncConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL not set")?;
        let db_pool_size = parse_positive("DB_POOL_SIZE").unwrap_or(DEFAULT_DB_POOL_SIZE);
        let twse_base_url =
            env::var("TWSE_BASE_URL").unwrap_or_else(|_| DEFAULT_TWSE_BASE_URL.to_string());
        let finmind_base_url =
            env::var("FINMIND_BASE_URL").unwrap_or_else(|_| DEFAULT_FINMIND_BASE_URL.to_string());
        let finmind_api_token = env::var("FINMIND_API_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());

        let start_raw = env::var("DIVIDEND_START_DATE")
            .unwrap_or_else(|_| DEFAULT_DIVIDEND_START_DATE.to_string());
        let dividend_start_date = NaiveDate::parse_from_str(&start_raw, "%Y-%m-%d")
            .with_context(|| format!("DIVIDEND_START_DATE 格式错误: {start_raw}"))?;

        let http_timeout = Duration::from_secs(
            parse_positive("HTTP_TIMEOUT_SECS").unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
        );
        let dividend_request_delay = Duration::from_millis(
            env::var("DIVIDEND_REQUEST_DELAY_MS")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(0),
        );

        let snapshot_conflict_policy = match env::var("SNAPSHOT_CONFLICT_POLICY") {
            Ok(raw) => raw
                .parse::<SnapshotConflictPolicy>()
                .map_err(|e| anyhow!(e))?,
            Err(_) => SnapshotConflictPolicy::default(),
        };

        Ok(Self {
            database_url,
            db_pool_size,
            twse_base_url,
            finmind_base_url,
            finmind_api_token,
            dividend_start_date,
            http_timeout,
            dividend_request_delay,
            snapshot_conflict_policy,
        })
    }

    /// 默认的 MI_INDEX 只有上市股票；上櫃行情必须通过 TWSE_BASE_URL 指向同格式的其他端点
    pub fn ensure_snapshot_market(&self, market: Market) -> anyhow::Result<()> {
        if market == Market::Otc && self.twse_base_url == DEFAULT_TWSE_BASE_URL {
            bail!("默认的 TWSE MI_INDEX 端点只提供上市行情；抓取上櫃行情请设置 TWSE_BASE_URL");
        }
        Ok(())
    }
}

fn parse_positive<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .filter(|value| *value > T::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_url(twse_base_url: &str) -> SyncConfig {
        SyncConfig {
            database_url: "postgres://localhost/test".to_string(),
            db_pool_size: DEFAULT_DB_POOL_SIZE,
            twse_base_url: twse_base_url.to_string(),
            finmind_base_url: DEFAULT_FINMIND_BASE_URL.to_string(),
            finmind_api_token: None,
            dividend_start_date: NaiveDate::from_ymd_opt(2018, 1, 1).unwrap(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            dividend_request_delay: Duration::ZERO,
            snapshot_conflict_policy: SnapshotConflictPolicy::default(),
        }
    }

    #[test]
    fn default_endpoint_only_serves_listed_market() {
        let cfg = config_with_url(DEFAULT_TWSE_BASE_URL);
        assert!(cfg.ensure_snapshot_market(Market::Listed).is_ok());
        assert!(cfg.ensure_snapshot_market(Market::Otc).is_err());
    }

    #[test]
    fn otc_allowed_with_overridden_endpoint() {
        let cfg = config_with_url("http://localhost:8080/otc_quotes");
        assert!(cfg.ensure_snapshot_market(Market::Otc).is_ok());
    }
}
