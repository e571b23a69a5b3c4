//! 持久化网关
//!
//! 两张表上的写入策略是显式命名的业务规则，而不是存储层的副作用：
//! - 快照表：默认 [`SnapshotConflictPolicy::FirstWriteWins`]，每个股票代码只保留第一次写入的交易日
//! - 股利表：永不覆盖已存在的 (股票代码, 年度) 记录

pub mod dividend_record;
pub mod job_execution_history;
pub mod trading_snapshot;

use std::str::FromStr;

use chrono::NaiveDate;
use thiserror::Error;

use crate::app::DbPool;
use crate::models::{DividendRecord, NewDividendRecord, NewTradingSnapshot, TradingSnapshot};

pub use trading_snapshot::PgPoolConn;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
}

/// 单行写入结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// 主键冲突，按策略保留原有行
    Unchanged,
}

impl InsertOutcome {
    fn from_affected(rows: usize) -> Self {
        if rows > 0 {
            InsertOutcome::Inserted
        } else {
            InsertOutcome::Unchanged
        }
    }
}

/// 快照表冲突策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapshotConflictPolicy {
    /// 已存在同代码的行时什么都不做
    #[default]
    FirstWriteWins,
    /// 已存在同代码的行时用新的交易日覆盖
    LatestWins,
}

impl FromStr for SnapshotConflictPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first-write-wins" | "first_write_wins" => Ok(Self::FirstWriteWins),
            "latest-wins" | "latest_wins" => Ok(Self::LatestWins),
            other => Err(format!("未知的快照冲突策略: {other}")),
        }
    }
}

/// 同步任务依赖的存储操作，外部读写方也只需要这些
pub trait MarketStore: Send + Sync {
    fn insert_snapshot(
        &self,
        row: &NewTradingSnapshot,
        policy: SnapshotConflictPolicy,
    ) -> Result<InsertOutcome, StoreError>;

    fn find_snapshot(&self, symbol: &str) -> Result<Option<TradingSnapshot>, StoreError>;

    fn snapshots_on(&self, date: NaiveDate) -> Result<Vec<TradingSnapshot>, StoreError>;

    fn count_snapshots_on(&self, date: NaiveDate) -> Result<i64, StoreError>;

    fn snapshot_symbols(&self) -> Result<Vec<String>, StoreError>;

    fn insert_dividend(&self, row: &NewDividendRecord) -> Result<InsertOutcome, StoreError>;

    fn dividends_for(&self, symbol: &str) -> Result<Vec<DividendRecord>, StoreError>;

    fn delete_dividends(&self, symbol: &str) -> Result<usize, StoreError>;

    fn dividend_symbols(&self) -> Result<Vec<String>, StoreError>;
}

/// 基于连接池的 Postgres 实现，每次操作取一个连接，用完即归还
#[derive(Clone)]
pub struct PgMarketStore {
    pool: DbPool,
}

impl PgMarketStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<PgPoolConn, StoreError> {
        Ok(self.pool.get()?)
    }
}

impl MarketStore for PgMarketStore {
    fn insert_snapshot(
        &self,
        row: &NewTradingSnapshot,
        policy: SnapshotConflictPolicy,
    ) -> Result<InsertOutcome, StoreError> {
        let mut conn = self.conn()?;
        let affected = match policy {
            SnapshotConflictPolicy::FirstWriteWins => {
                trading_snapshot::insert_first_write_wins(&mut conn, row)?
            }
            SnapshotConflictPolicy::LatestWins => trading_snapshot::insert_latest_wins(&mut conn, row)?,
        };
        Ok(InsertOutcome::from_affected(affected))
    }

    fn find_snapshot(&self, symbol: &str) -> Result<Option<TradingSnapshot>, StoreError> {
        let mut conn = self.conn()?;
        Ok(trading_snapshot::find_by_symbol(&mut conn, symbol)?)
    }

    fn snapshots_on(&self, date: NaiveDate) -> Result<Vec<TradingSnapshot>, StoreError> {
        let mut conn = self.conn()?;
        Ok(trading_snapshot::list_by_trade_date(&mut conn, date)?)
    }

    fn count_snapshots_on(&self, date: NaiveDate) -> Result<i64, StoreError> {
        let mut conn = self.conn()?;
        Ok(trading_snapshot::count_by_trade_date(&mut conn, date)?)
    }

    fn snapshot_symbols(&self) -> Result<Vec<String>, StoreError> {
        let mut conn = self.conn()?;
        Ok(trading_snapshot::list_distinct_symbols(&mut conn)?)
    }

    fn insert_dividend(&self, row: &NewDividendRecord) -> Result<InsertOutcome, StoreError> {
        let mut conn = self.conn()?;
        let affected = dividend_record::insert_never_overwrite(&mut conn, row)?;
        Ok(InsertOutcome::from_affected(affected))
    }

    fn dividends_for(&self, symbol: &str) -> Result<Vec<DividendRecord>, StoreError> {
        let mut conn = self.conn()?;
        Ok(dividend_record::list_by_symbol(&mut conn, symbol)?)
    }

    fn delete_dividends(&self, symbol: &str) -> Result<usize, StoreError> {
        let mut conn = self.conn()?;
        Ok(dividend_record::delete_by_symbol(&mut conn, symbol)?)
    }

    fn dividend_symbols(&self) -> Result<Vec<String>, StoreError> {
        let mut conn = self.conn()?;
        Ok(dividend_record::list_distinct_symbols(&mut conn)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_conflict_policy_names() {
        assert_eq!(
            "first-write-wins".parse::<SnapshotConflictPolicy>(),
            Ok(SnapshotConflictPolicy::FirstWriteWins)
        );
        assert_eq!(
            "LATEST_WINS".parse::<SnapshotConflictPolicy>(),
            Ok(SnapshotConflictPolicy::LatestWins)
        );
        assert!("overwrite".parse::<SnapshotConflictPolicy>().is_err());
        assert_eq!(SnapshotConflictPolicy::default(), SnapshotConflictPolicy::FirstWriteWins);
    }

    #[test]
    fn affected_rows_map_to_outcome() {
        assert_eq!(InsertOutcome::from_affected(1), InsertOutcome::Inserted);
        assert_eq!(InsertOutcome::from_affected(0), InsertOutcome::Unchanged);
    }
}
