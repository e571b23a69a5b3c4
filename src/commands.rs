use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;

use crate::app::{self, DbPool};
use crate::models::Market;
use crate::repositories::{MarketStore, PgMarketStore};
use crate::scheduler::dividend_sync_job::{self, DividendSyncOptions, DividendSyncScope};
use crate::scheduler::job_history::{JobRun, JobSummary};
use crate::scheduler::snapshot_sync_job::{self, SnapshotSyncOptions};
use crate::services::finmind_service::FinMindClient;
use crate::services::trading_calendar::{find_latest_available_date, CalendarError, StoredSnapshotProbe};
use crate::services::twse_service::TwseClient;
use crate::utils::config::SyncConfig;
use crate::utils::http_client;
use crate::utils::trade_date::taipei_today;

/// 被 Ctrl-C 中止时的退出码
const EXIT_CANCELLED: u8 = 130;

fn connect(cfg: &SyncConfig) -> anyhow::Result<DbPool> {
    let pool = app::build_pool(cfg).context("创建数据库连接池失败")?;
    app::run_migrations(&pool)?;
    Ok(pool)
}

pub async fn run_snapshot(cfg: SyncConfig, market: Market) -> anyhow::Result<ExitCode> {
    cfg.ensure_snapshot_market(market)?;
    let pool = connect(&cfg)?;
    let store = PgMarketStore::new(pool.clone());
    let client = http_client::create_provider_client(cfg.http_timeout)?;
    let twse = TwseClient::new(client, cfg.twse_base_url.clone());
    let options = SnapshotSyncOptions {
        market,
        policy: cfg.snapshot_conflict_policy,
        today: taipei_today(),
    };

    let job = JobRun::start(&pool, snapshot_sync_job::JOB_NAME);
    match snapshot_sync_job::run_snapshot_sync(&store, &twse, &options).await {
        Ok(report) => {
            job.finish(JobSummary::from(&report));
            println!(
                "快照同步完成：交易日 {}，抓取 {} 笔，写入 {} 笔，未变更 {} 笔，格式错误 {} 笔",
                report.trade_date,
                report.fetched_count,
                report.written_count,
                report.unchanged_count,
                report.rejected.len()
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::error!("快照同步任务失败: {}", e);
            job.finish(JobSummary::failed(&e));
            Ok(ExitCode::FAILURE)
        }
    }
}

pub async fn run_dividends(cfg: SyncConfig, symbol: Option<String>) -> anyhow::Result<ExitCode> {
    let token = cfg
        .finmind_api_token
        .clone()
        .context("FINMIND_API_TOKEN not set")?;
    let pool = connect(&cfg)?;
    let store = PgMarketStore::new(pool.clone());
    let client = http_client::create_provider_client(cfg.http_timeout)?;
    let finmind = FinMindClient::new(client, cfg.finmind_base_url.clone(), token);

    let scope = match symbol {
        Some(symbol) => DividendSyncScope::OneSymbol(symbol),
        None => DividendSyncScope::AllBacklog,
    };
    let options = DividendSyncOptions {
        start_date: cfg.dividend_start_date,
        request_delay: cfg.dividend_request_delay,
    };

    let cancel = Arc::new(AtomicBool::new(false));
    install_ctrl_c_handler(cancel.clone());

    let job = JobRun::start(&pool, dividend_sync_job::JOB_NAME);
    let report = match dividend_sync_job::run_dividend_sync(&store, &finmind, &scope, &options, &cancel).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("股利同步任务失败: {}", e);
            job.finish(JobSummary::failed(&e));
            return Ok(ExitCode::FAILURE);
        }
    };
    job.finish(JobSummary::from(&report));

    println!(
        "股利同步结束：尝试 {} 只，新增 {} 笔，未变更 {} 笔，跳过 {} 只",
        report.attempted_count,
        report.written_count,
        report.unchanged_count,
        report.skipped_symbols().len()
    );
    for detail in report.details.iter().filter(|d| d.error.is_some()) {
        println!(
            "  {} {:?}: {}",
            detail.stock_code,
            detail.action,
            detail.error.as_deref().unwrap_or_default()
        );
    }

    if let Some(symbol) = &report.quota_exhausted_at {
        eprintln!("API 额度用尽，于 {} 中止", symbol);
        return Ok(ExitCode::FAILURE);
    }
    if report.cancelled {
        return Ok(ExitCode::from(EXIT_CANCELLED));
    }
    Ok(ExitCode::SUCCESS)
}

/// 找出库中最近有快照的交易日
pub async fn run_latest(cfg: SyncConfig) -> anyhow::Result<ExitCode> {
    let pool = connect(&cfg)?;
    let store = PgMarketStore::new(pool);

    match find_latest_available_date(&StoredSnapshotProbe(&store), taipei_today()).await {
        Ok((date, count)) => {
            println!("最近交易日 {}，共 {} 笔快照", date, count);
            for row in store.snapshots_on(date)?.iter().take(10) {
                println!("  {} {} {}", row.stock_symbol, row.stock_name, row.trade_volume);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(CalendarError::NotFound { lookback_days }) => {
            eprintln!("最近 {} 天内没有快照资料", lookback_days);
            Ok(ExitCode::FAILURE)
        }
        Err(CalendarError::Probe(e)) => Err(e.into()),
    }
}

fn install_ctrl_c_handler(cancel: Arc<AtomicBool>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("收到 Ctrl-C，处理完当前股票后停止");
            cancel.store(true, Ordering::SeqCst);
        }
    });
}
