use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;
use thiserror::Error;

use crate::api_models::finmind::FinMindDividendRow;
use crate::api_models::twse::TwseQuoteRow;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("http status {status}: {body}")]
    Status { status: StatusCode, body: String },
    /// 提供方明确表示额度已用尽
    #[error("quota exhausted: {message}")]
    QuotaExhausted { message: String },
    #[error("provider returned status {code}: {message}")]
    Api { code: i64, message: String },
    #[error("parse error: {0}")]
    Parse(String),
}

impl ProviderError {
    pub fn is_quota_exhausted(&self) -> bool {
        matches!(self, ProviderError::QuotaExhausted { .. })
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(e: serde_json::Error) -> Self {
        ProviderError::Parse(e.to_string())
    }
}

/// 每日收盘行情来源
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    /// 指定日期没有行情（休市、尚未发布）时返回空列表
    async fn fetch_daily_quotes(&self, date: NaiveDate) -> Result<Vec<TwseQuoteRow>, ProviderError>;
}

/// 历年股利来源
#[async_trait]
pub trait DividendProvider: Send + Sync {
    async fn fetch_dividends(
        &self,
        symbol: &str,
        start_date: NaiveDate,
    ) -> Result<Vec<FinMindDividendRow>, ProviderError>;
}
