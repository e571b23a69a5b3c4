use diesel::prelude::*;
use serde::Serialize;

use crate::schema::dividends;

#[derive(Queryable, Selectable, Serialize, Debug, Clone)]
#[diesel(table_name = dividends)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DividendRecord {
    pub id: i32,
    pub stock_symbol: String,
    pub year: Option<i32>,
    pub ex_dividend_date: Option<String>,
    pub cash_dividend: Option<String>,
    pub stock_dividend: Option<String>,
    pub total_dividend: Option<String>,
    pub issued_date: Option<String>,
}

/// 股利记录，日期字段保留提供方原始字符串
#[derive(Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = dividends)]
pub struct NewDividendRecord {
    pub stock_symbol: String,
    pub year: Option<i32>,
    pub ex_dividend_date: Option<String>,
    pub cash_dividend: Option<String>,
    pub stock_dividend: Option<String>,
    pub total_dividend: Option<String>,
    pub issued_date: Option<String>,
}
