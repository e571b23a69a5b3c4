use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde::Serialize;
use tokio::time::sleep;

use crate::repositories::{InsertOutcome, MarketStore};
use crate::services::backlog::symbols_needing_dividend_sync;
use crate::services::provider::DividendProvider;
use crate::utils::payload_normalizer::normalize_dividend_row;

use super::error::SyncError;

pub const JOB_NAME: &str = "dividend_sync";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DividendSyncScope {
    /// 所有还没有股利资料的股票，只增不删
    AllBacklog,
    /// 指定单一股票：先清空该股票的股利资料再重新抓取
    OneSymbol(String),
}

#[derive(Debug, Clone)]
pub struct DividendSyncOptions {
    pub start_date: NaiveDate,
    /// 两次请求之间的基础间隔，实际会再加上最多 50% 的随机抖动
    pub request_delay: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolAction {
    Synced,
    Skipped,
    QuotaExhausted,
}

#[derive(Debug, Serialize)]
pub struct DividendSyncDetail {
    pub stock_code: String,
    pub action: SymbolAction,
    pub fetched_count: usize,
    pub written_count: usize,
    pub error: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct DividendSyncReport {
    pub attempted_count: usize,
    pub written_count: usize,
    pub unchanged_count: usize,
    pub details: Vec<DividendSyncDetail>,
    /// 额度用尽时触发中止的股票代码
    pub quota_exhausted_at: Option<String>,
    pub cancelled: bool,
}

impl DividendSyncReport {
    pub fn skipped_symbols(&self) -> Vec<&str> {
        self.details
            .iter()
            .filter(|d| d.action == SymbolAction::Skipped)
            .map(|d| d.stock_code.as_str())
            .collect()
    }

    pub fn synced_symbols(&self) -> Vec<&str> {
        self.details
            .iter()
            .filter(|d| d.action == SymbolAction::Synced)
            .map(|d| d.stock_code.as_str())
            .collect()
    }

    pub fn terminated_early(&self) -> bool {
        self.quota_exhausted_at.is_some()
    }
}

/// 逐只股票抓取股利并写入
///
/// - 单只股票的网络、解析、状态码错误：记录后继续下一只
/// - 额度用尽：立即停止，剩余股票不再尝试，结果里标记 `quota_exhausted_at`
/// - 存储错误：直接返回错误
pub async fn run_dividend_sync<S, P>(
    store: &S,
    provider: &P,
    scope: &DividendSyncScope,
    options: &DividendSyncOptions,
    cancel: &Arc<AtomicBool>,
) -> Result<DividendSyncReport, SyncError>
where
    S: MarketStore + ?Sized,
    P: DividendProvider + ?Sized,
{
    let symbols = match scope {
        DividendSyncScope::AllBacklog => {
            let pending = symbols_needing_dividend_sync(store)?;
            tracing::info!("将处理 {} 档尚未有股利资料的股票", pending.len());
            pending
        }
        DividendSyncScope::OneSymbol(symbol) => {
            tracing::info!("仅抓取指定股票：{}", symbol);
            vec![symbol.clone()]
        }
    };

    let mut report = DividendSyncReport::default();

    for (index, symbol) in symbols.iter().enumerate() {
        if index > 0 {
            pause_between_requests(options.request_delay).await;
        }

        // 等待结束后再检查中止信号
        if cancel.load(Ordering::SeqCst) {
            tracing::warn!("收到中止信号，剩余 {} 只股票未处理", symbols.len() - index);
            report.cancelled = true;
            break;
        }

        report.attempted_count += 1;

        if matches!(scope, DividendSyncScope::OneSymbol(_)) {
            let removed = store.delete_dividends(symbol)?;
            tracing::info!("已清除 {} 的旧有股利资料 {} 笔", symbol, removed);
        }

        let rows = match provider.fetch_dividends(symbol, options.start_date).await {
            Ok(rows) => rows,
            Err(e) if e.is_quota_exhausted() => {
                tracing::error!("股票 {} 抓取时额度用尽，中止本次任务: {}", symbol, e);
                report.details.push(DividendSyncDetail {
                    stock_code: symbol.clone(),
                    action: SymbolAction::QuotaExhausted,
                    fetched_count: 0,
                    written_count: 0,
                    error: Some(e.to_string()),
                });
                report.quota_exhausted_at = Some(symbol.clone());
                break;
            }
            Err(e) => {
                tracing::warn!("股票 {} 抓取失败，跳过: {}", symbol, e);
                report.details.push(DividendSyncDetail {
                    stock_code: symbol.clone(),
                    action: SymbolAction::Skipped,
                    fetched_count: 0,
                    written_count: 0,
                    error: Some(e.to_string()),
                });
                continue;
            }
        };

        let mut written = 0;
        for row in &rows {
            let record = normalize_dividend_row(symbol, row);
            if record.year.is_none() {
                tracing::warn!("股票 {} 有一笔股利年度无法解析，以空值写入", symbol);
            }
            match store.insert_dividend(&record)? {
                InsertOutcome::Inserted => written += 1,
                InsertOutcome::Unchanged => report.unchanged_count += 1,
            }
        }

        report.written_count += written;
        tracing::info!("写入完成：{}，共 {} 笔，新增 {} 笔", symbol, rows.len(), written);
        report.details.push(DividendSyncDetail {
            stock_code: symbol.clone(),
            action: SymbolAction::Synced,
            fetched_count: rows.len(),
            written_count: written,
            error: None,
        });
    }

    tracing::info!(
        "股利同步结束，尝试: {}，新增: {}，跳过: {}，额度用尽: {}",
        report.attempted_count,
        report.written_count,
        report.skipped_symbols().len(),
        report.terminated_early()
    );

    Ok(report)
}

async fn pause_between_requests(base: Duration) {
    if base.is_zero() {
        return;
    }
    let base_ms = base.as_millis() as u64;
    let jitter_ms = rand::random::<u64>() % (base_ms / 2 + 1);
    let delay_ms = base_ms + jitter_ms;
    tracing::debug!("等待 {} 毫秒后处理下一只股票", delay_ms);
    sleep(Duration::from_millis(delay_ms)).await;
}
