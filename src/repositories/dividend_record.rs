use diesel::prelude::*;

use crate::models::{DividendRecord, NewDividendRecord};
use crate::schema::dividends::dsl::*;

use super::trading_snapshot::PgPoolConn;

/// 同一股票同一年度已有记录时不覆盖，返回受影响行数（0 或 1）
pub fn insert_never_overwrite(
    conn: &mut PgPoolConn,
    new_rec: &NewDividendRecord,
) -> Result<usize, diesel::result::Error> {
    diesel::insert_into(dividends)
        .values(new_rec)
        .on_conflict((stock_symbol, year))
        .do_nothing()
        .execute(conn)
}

/// 按年度降序
pub fn list_by_symbol(
    conn: &mut PgPoolConn,
    symbol: &str,
) -> Result<Vec<DividendRecord>, diesel::result::Error> {
    dividends
        .filter(stock_symbol.eq(symbol))
        .order(year.desc())
        .select(DividendRecord::as_select())
        .load(conn)
}

pub fn delete_by_symbol(conn: &mut PgPoolConn, symbol: &str) -> Result<usize, diesel::result::Error> {
    diesel::delete(dividends.filter(stock_symbol.eq(symbol))).execute(conn)
}

pub fn list_distinct_symbols(conn: &mut PgPoolConn) -> Result<Vec<String>, diesel::result::Error> {
    dividends
        .select(stock_symbol)
        .distinct()
        .load::<String>(conn)
}
