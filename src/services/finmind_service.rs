use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};

use crate::api_models::finmind::{FinMindDividendRow, FinMindResponse, DIVIDEND_DATASET};

use super::provider::{DividendProvider, ProviderError};

/// FinMind 超出使用额度时回传的状态码
const QUOTA_STATUS: i64 = 402;

pub struct FinMindClient {
    client: Client,
    base_url: String,
    api_token: String,
}

impl FinMindClient {
    pub fn new(client: Client, base_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_token: api_token.into(),
        }
    }
}

/// 额度用尽可能出现在 HTTP 状态码上，也可能出现在响应体的 status 字段里
pub fn parse_dividend_response(
    status: StatusCode,
    body: &str,
) -> Result<Vec<FinMindDividendRow>, ProviderError> {
    if status == StatusCode::PAYMENT_REQUIRED || status == StatusCode::TOO_MANY_REQUESTS {
        return Err(ProviderError::QuotaExhausted {
            message: quota_message(body),
        });
    }
    if !status.is_success() {
        return Err(ProviderError::Status {
            status,
            body: body.to_string(),
        });
    }

    let resp: FinMindResponse<FinMindDividendRow> = serde_json::from_str(body)?;
    match resp.status {
        Some(QUOTA_STATUS) => Err(ProviderError::QuotaExhausted {
            message: resp.msg.unwrap_or_default(),
        }),
        Some(code) if code != 200 => Err(ProviderError::Api {
            code,
            message: resp.msg.unwrap_or_default(),
        }),
        _ => Ok(resp.data),
    }
}

fn quota_message(body: &str) -> String {
    serde_json::from_str::<FinMindResponse<serde_json::Value>>(body)
        .ok()
        .and_then(|resp| resp.msg)
        .unwrap_or_else(|| body.to_string())
}

/// reqwest 的错误信息会带上完整 URL，其中包含 token
fn strip_token(e: reqwest::Error) -> ProviderError {
    ProviderError::Http(e.without_url())
}

#[async_trait]
impl DividendProvider for FinMindClient {
    async fn fetch_dividends(
        &self,
        symbol: &str,
        start_date: NaiveDate,
    ) -> Result<Vec<FinMindDividendRow>, ProviderError> {
        let start = start_date.format("%Y-%m-%d").to_string();
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("dataset", DIVIDEND_DATASET),
                ("data_id", symbol),
                ("start_date", start.as_str()),
                ("token", self.api_token.as_str()),
            ])
            .send()
            .await
            .map_err(strip_token)?;

        let status = resp.status();
        let body = resp.text().await.map_err(strip_token)?;
        parse_dividend_response(status, &body)
    }
}
