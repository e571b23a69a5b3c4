use std::time::Duration;

use reqwest::{Client, header::{HeaderMap, HeaderValue, USER_AGENT, ACCEPT}};

/// 创建访问 TWSE / FinMind 的 HTTP 客户端
/// 所有请求都带超时，避免单个请求把整个任务卡住
pub fn create_provider_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
        ),
    );
    headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));

    Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .build()
}
