use chrono::NaiveDate;
use diesel::prelude::*;
use serde::Serialize;

use crate::schema::daily_stocks;

/// 市场别，数据库中沿用 "上市" / "上櫃" 标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Market {
    Listed,
    Otc,
}

impl Market {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Market::Listed => "上市",
            Market::Otc => "上櫃",
        }
    }
}

#[derive(Queryable, Selectable, Serialize, Debug, Clone)]
#[diesel(table_name = daily_stocks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TradingSnapshot {
    pub id: i32,
    pub stock_symbol: String,
    pub stock_name: String,
    pub market: String,
    pub trade_volume: i64,
    pub trade_date: NaiveDate,
}

#[derive(Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = daily_stocks)]
pub struct NewTradingSnapshot {
    pub stock_symbol: String,
    pub stock_name: String,
    pub market: String,
    pub trade_volume: i64,
    pub trade_date: NaiveDate,
}

impl NewTradingSnapshot {
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        market: Market,
        volume: i64,
        date: NaiveDate,
    ) -> Self {
        Self {
            stock_symbol: symbol.into(),
            stock_name: name.into(),
            market: market.as_db_str().to_string(),
            trade_volume: volume,
            trade_date: date,
        }
    }
}
