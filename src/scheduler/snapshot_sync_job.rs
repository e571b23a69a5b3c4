use chrono::NaiveDate;
use serde::Serialize;

use crate::models::Market;
use crate::repositories::{InsertOutcome, MarketStore, SnapshotConflictPolicy};
use crate::services::provider::SnapshotProvider;
use crate::services::trading_calendar::{find_latest_available_date, ProviderProbe};
use crate::utils::payload_normalizer::normalize_quote_row;

use super::error::SyncError;

pub const JOB_NAME: &str = "snapshot_sync";

#[derive(Debug, Clone)]
pub struct SnapshotSyncOptions {
    /// 该接口一次只回传一个市场的行情，由调用方指定
    pub market: Market,
    pub policy: SnapshotConflictPolicy,
    pub today: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct RejectedQuote {
    pub stock_code: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct SnapshotSyncReport {
    pub trade_date: NaiveDate,
    pub fetched_count: usize,
    pub written_count: usize,
    /// 已存在同代码的行，按策略保持不变
    pub unchanged_count: usize,
    pub rejected: Vec<RejectedQuote>,
}

/// 找到最近交易日，抓取当日全部行情并逐行写入
///
/// 找不到交易日、网络错误和存储错误都会直接返回错误；
/// 主键冲突不算错误，只计入 `unchanged_count`。
pub async fn run_snapshot_sync<S, P>(
    store: &S,
    provider: &P,
    options: &SnapshotSyncOptions,
) -> Result<SnapshotSyncReport, SyncError>
where
    S: MarketStore + ?Sized,
    P: SnapshotProvider + ?Sized,
{
    tracing::info!("开始执行快照同步任务，市场: {}", options.market.as_db_str());

    let (trade_date, rows) = find_latest_available_date(&ProviderProbe(provider), options.today).await?;

    let mut report = SnapshotSyncReport {
        trade_date,
        fetched_count: rows.len(),
        written_count: 0,
        unchanged_count: 0,
        rejected: Vec::new(),
    };

    for row in &rows {
        let snapshot = match normalize_quote_row(row, options.market, trade_date) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("股票 {} 行情格式错误，跳过: {}", row.symbol, e);
                report.rejected.push(RejectedQuote {
                    stock_code: row.symbol.clone(),
                    error: e.to_string(),
                });
                continue;
            }
        };

        match store.insert_snapshot(&snapshot, options.policy)? {
            InsertOutcome::Inserted => report.written_count += 1,
            InsertOutcome::Unchanged => report.unchanged_count += 1,
        }
    }

    tracing::info!(
        "快照写入完成：{}，共 {} 笔，写入: {}，未变更: {}，格式错误: {}",
        trade_date,
        report.fetched_count,
        report.written_count,
        report.unchanged_count,
        report.rejected.len()
    );

    Ok(report)
}
