mod api_models;
mod app;
mod commands;
mod models;
mod repositories;
mod scheduler;
mod schema;
mod services;
mod utils;

#[cfg(test)]
mod test_helpers;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::models::Market;
use crate::utils::config::SyncConfig;

#[derive(Parser)]
#[command(
    name = "twse-market-sync",
    about = "TWSE 每日行情快照与 FinMind 股利资料同步"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 回溯最近交易日，写入当日全部股票快照
    Snapshot {
        /// 本次行情所属市场；otc 需要 TWSE_BASE_URL 指向上櫃行情端点
        #[arg(long, value_enum, default_value_t = Market::Listed)]
        market: Market,
    },
    /// 抓取历年股利；不指定 --symbol 时处理所有尚无股利资料的股票
    Dividends {
        /// 只刷新这一只股票（先删除旧资料再重新抓取）
        #[arg(long)]
        symbol: Option<String>,
    },
    /// 显示库中最近有快照的交易日
    Latest,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    utils::logging::init_logging();

    let cli = Cli::parse();
    let cfg = match SyncConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("配置错误: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Snapshot { market } => commands::run_snapshot(cfg, market).await,
        Commands::Dividends { symbol } => commands::run_dividends(cfg, symbol).await,
        Commands::Latest => commands::run_latest(cfg).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("执行错误: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_symbol_flag_with_equals() {
        let cli = Cli::try_parse_from(["twse-market-sync", "dividends", "--symbol=2330"]).unwrap();
        match cli.command {
            Commands::Dividends { symbol } => assert_eq!(symbol.as_deref(), Some("2330")),
            _ => panic!("expected dividends command"),
        }
    }

    #[test]
    fn dividends_without_symbol_is_backlog_mode() {
        let cli = Cli::try_parse_from(["twse-market-sync", "dividends"]).unwrap();
        assert!(matches!(cli.command, Commands::Dividends { symbol: None }));
    }

    #[test]
    fn snapshot_defaults_to_listed_market() {
        let cli = Cli::try_parse_from(["twse-market-sync", "snapshot"]).unwrap();
        assert!(matches!(cli.command, Commands::Snapshot { market: Market::Listed }));

        let cli = Cli::try_parse_from(["twse-market-sync", "snapshot", "--market", "otc"]).unwrap();
        assert!(matches!(cli.command, Commands::Snapshot { market: Market::Otc }));
    }
}
