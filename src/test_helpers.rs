//! 测试用的内存存储与假提供方

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;

use crate::api_models::finmind::{AmountField, FinMindDividendRow, YearField};
use crate::api_models::twse::TwseQuoteRow;
use crate::models::{DividendRecord, Market, NewDividendRecord, NewTradingSnapshot, TradingSnapshot};
use crate::repositories::{InsertOutcome, MarketStore, SnapshotConflictPolicy, StoreError};
use crate::services::provider::{DividendProvider, ProviderError, SnapshotProvider};

/// 模拟两张表上的唯一约束：快照按代码唯一，股利按 (代码, 年度) 唯一，年度为空时不冲突
#[derive(Default)]
pub struct InMemoryStore {
    snapshots: Mutex<Vec<TradingSnapshot>>,
    dividends: Mutex<Vec<DividendRecord>>,
    next_id: Mutex<i32>,
    fail_writes: AtomicBool,
}

impl InMemoryStore {
    fn next_id(&self) -> i32 {
        let mut id = self.next_id.lock().unwrap();
        *id += 1;
        *id
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Database(diesel::result::Error::BrokenTransactionManager));
        }
        Ok(())
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn seed_snapshots(&self, symbols: &[&str]) {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        for symbol in symbols {
            self.insert_snapshot(
                &NewTradingSnapshot::new(*symbol, *symbol, Market::Listed, 1, date),
                SnapshotConflictPolicy::FirstWriteWins,
            )
            .unwrap();
        }
    }

    pub fn seed_dividend(&self, symbol: &str, year: Option<i32>) {
        self.insert_dividend(&NewDividendRecord {
            stock_symbol: symbol.to_string(),
            year,
            ex_dividend_date: None,
            cash_dividend: Some("1".to_string()),
            stock_dividend: None,
            total_dividend: Some("1".to_string()),
            issued_date: None,
        })
        .unwrap();
    }

    pub fn snapshot_count(&self) -> usize {
        self.snapshots.lock().unwrap().len()
    }

    pub fn dividend_years(&self, symbol: &str) -> Vec<Option<i32>> {
        let mut years: Vec<Option<i32>> = self
            .dividends
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.stock_symbol == symbol)
            .map(|d| d.year)
            .collect();
        years.sort();
        years
    }
}

impl MarketStore for InMemoryStore {
    fn insert_snapshot(
        &self,
        row: &NewTradingSnapshot,
        policy: SnapshotConflictPolicy,
    ) -> Result<InsertOutcome, StoreError> {
        self.check_writable()?;
        let mut snapshots = self.snapshots.lock().unwrap();
        if let Some(existing) = snapshots.iter_mut().find(|s| s.stock_symbol == row.stock_symbol) {
            return Ok(match policy {
                SnapshotConflictPolicy::FirstWriteWins => InsertOutcome::Unchanged,
                SnapshotConflictPolicy::LatestWins => {
                    existing.stock_name = row.stock_name.clone();
                    existing.market = row.market.clone();
                    existing.trade_volume = row.trade_volume;
                    existing.trade_date = row.trade_date;
                    InsertOutcome::Inserted
                }
            });
        }
        let id = self.next_id();
        snapshots.push(TradingSnapshot {
            id,
            stock_symbol: row.stock_symbol.clone(),
            stock_name: row.stock_name.clone(),
            market: row.market.clone(),
            trade_volume: row.trade_volume,
            trade_date: row.trade_date,
        });
        Ok(InsertOutcome::Inserted)
    }

    fn find_snapshot(&self, symbol: &str) -> Result<Option<TradingSnapshot>, StoreError> {
        Ok(self
            .snapshots
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.stock_symbol == symbol)
            .cloned())
    }

    fn snapshots_on(&self, date: NaiveDate) -> Result<Vec<TradingSnapshot>, StoreError> {
        let mut rows: Vec<TradingSnapshot> = self
            .snapshots
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.trade_date == date)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.trade_volume.cmp(&a.trade_volume));
        Ok(rows)
    }

    fn count_snapshots_on(&self, date: NaiveDate) -> Result<i64, StoreError> {
        Ok(self.snapshots_on(date)?.len() as i64)
    }

    fn snapshot_symbols(&self) -> Result<Vec<String>, StoreError> {
        let unique: HashSet<String> = self
            .snapshots
            .lock()
            .unwrap()
            .iter()
            .map(|s| s.stock_symbol.clone())
            .collect();
        Ok(unique.into_iter().collect())
    }

    fn insert_dividend(&self, row: &NewDividendRecord) -> Result<InsertOutcome, StoreError> {
        self.check_writable()?;
        let mut dividends = self.dividends.lock().unwrap();
        let conflict = row.year.is_some()
            && dividends
                .iter()
                .any(|d| d.stock_symbol == row.stock_symbol && d.year == row.year);
        if conflict {
            return Ok(InsertOutcome::Unchanged);
        }
        let id = self.next_id();
        dividends.push(DividendRecord {
            id,
            stock_symbol: row.stock_symbol.clone(),
            year: row.year,
            ex_dividend_date: row.ex_dividend_date.clone(),
            cash_dividend: row.cash_dividend.clone(),
            stock_dividend: row.stock_dividend.clone(),
            total_dividend: row.total_dividend.clone(),
            issued_date: row.issued_date.clone(),
        });
        Ok(InsertOutcome::Inserted)
    }

    fn dividends_for(&self, symbol: &str) -> Result<Vec<DividendRecord>, StoreError> {
        let mut rows: Vec<DividendRecord> = self
            .dividends
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.stock_symbol == symbol)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.year.cmp(&a.year));
        Ok(rows)
    }

    fn delete_dividends(&self, symbol: &str) -> Result<usize, StoreError> {
        self.check_writable()?;
        let mut dividends = self.dividends.lock().unwrap();
        let before = dividends.len();
        dividends.retain(|d| d.stock_symbol != symbol);
        Ok(before - dividends.len())
    }

    fn dividend_symbols(&self) -> Result<Vec<String>, StoreError> {
        let unique: HashSet<String> = self
            .dividends
            .lock()
            .unwrap()
            .iter()
            .map(|d| d.stock_symbol.clone())
            .collect();
        Ok(unique.into_iter().collect())
    }
}

/// 按日期预置行情的假 TWSE，记录每次探测的日期
#[derive(Default)]
pub struct FakeSnapshotProvider {
    days: Mutex<HashMap<NaiveDate, Vec<TwseQuoteRow>>>,
    failing: Mutex<HashSet<NaiveDate>>,
    probed: Mutex<Vec<NaiveDate>>,
}

impl FakeSnapshotProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_day(self, date: NaiveDate, rows: Vec<TwseQuoteRow>) -> Self {
        self.set_day(date, rows);
        self
    }

    pub fn set_day(&self, date: NaiveDate, rows: Vec<TwseQuoteRow>) {
        self.days.lock().unwrap().insert(date, rows);
    }

    pub fn fail_on(&self, date: NaiveDate) {
        self.failing.lock().unwrap().insert(date);
    }

    pub fn probed_dates(&self) -> Vec<NaiveDate> {
        self.probed.lock().unwrap().clone()
    }
}

#[async_trait]
impl SnapshotProvider for FakeSnapshotProvider {
    async fn fetch_daily_quotes(&self, date: NaiveDate) -> Result<Vec<TwseQuoteRow>, ProviderError> {
        self.probed.lock().unwrap().push(date);
        if self.failing.lock().unwrap().contains(&date) {
            return Err(ProviderError::Status {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: "maintenance".to_string(),
            });
        }
        Ok(self.days.lock().unwrap().get(&date).cloned().unwrap_or_default())
    }
}

#[derive(Clone)]
pub enum FakeDividendResponse {
    Rows(Vec<FinMindDividendRow>),
    QuotaExhausted,
    Failure,
}

/// 按股票代码预置响应的假 FinMind，记录调用顺序
#[derive(Default)]
pub struct FakeDividendProvider {
    responses: Mutex<HashMap<String, FakeDividendResponse>>,
    calls: Mutex<Vec<String>>,
}

impl FakeDividendProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, symbol: &str, response: FakeDividendResponse) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(symbol.to_string(), response);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DividendProvider for FakeDividendProvider {
    async fn fetch_dividends(
        &self,
        symbol: &str,
        _start_date: NaiveDate,
    ) -> Result<Vec<FinMindDividendRow>, ProviderError> {
        self.calls.lock().unwrap().push(symbol.to_string());
        let response = self.responses.lock().unwrap().get(symbol).cloned();
        match response {
            Some(FakeDividendResponse::Rows(rows)) => Ok(rows),
            Some(FakeDividendResponse::QuotaExhausted) => Err(ProviderError::QuotaExhausted {
                message: "Requests reach the upper limit.".to_string(),
            }),
            Some(FakeDividendResponse::Failure) => Err(ProviderError::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: "boom".to_string(),
            }),
            None => Ok(Vec::new()),
        }
    }
}

pub fn quote(symbol: &str, volume: &str) -> TwseQuoteRow {
    TwseQuoteRow {
        symbol: symbol.to_string(),
        name: format!("{symbol} 股份"),
        volume: volume.to_string(),
    }
}

pub fn dividend_row(symbol: &str, year: &str, cash: Option<f64>) -> FinMindDividendRow {
    FinMindDividendRow {
        stock_id: symbol.to_string(),
        year: YearField::Text(year.to_string()),
        date: None,
        cash_ex_dividend_trading_date: None,
        cash_earnings_distribution: cash
            .and_then(serde_json::Number::from_f64)
            .map(AmountField::Number),
        stock_earnings_distribution: None,
        total_dividend: None,
    }
}
