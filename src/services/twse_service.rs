use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;

use crate::api_models::twse::{TwseDailyReport, TwseQuoteRow};
use crate::utils::trade_date::to_twse_param;

use super::provider::{ProviderError, SnapshotProvider};

/// 全部（不含权证、牛熊证、可展延牛熊证）
const TWSE_REPORT_TYPE: &str = "ALLBUT0999";

pub struct TwseClient {
    client: Client,
    base_url: String,
}

impl TwseClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub async fn fetch_daily_report(&self, date: NaiveDate) -> Result<TwseDailyReport, ProviderError> {
        let date_param = to_twse_param(date);
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("response", "json"),
                ("date", date_param.as_str()),
                ("type", TWSE_REPORT_TYPE),
            ])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Status { status, body });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

/// 从日报中取出每日收盘行情，没有该表时返回空列表
pub fn extract_quote_rows(report: &TwseDailyReport) -> Vec<TwseQuoteRow> {
    let Some(table) = report.closing_quotes() else {
        return Vec::new();
    };
    let (rows, rejected) = table.quote_rows();
    for reason in rejected {
        tracing::warn!("丢弃无法识别的行情行: {}", reason);
    }
    rows
}

#[async_trait]
impl SnapshotProvider for TwseClient {
    async fn fetch_daily_quotes(&self, date: NaiveDate) -> Result<Vec<TwseQuoteRow>, ProviderError> {
        tracing::info!("尝试抓取 TWSE 资料：{}", to_twse_param(date));
        let report = self.fetch_daily_report(date).await?;
        if !report.is_ok() {
            tracing::debug!("TWSE {} 无资料: {}", to_twse_param(date), report.stat);
        }
        Ok(extract_quote_rows(&report))
    }
}
