use chrono::NaiveDate;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};

use crate::models::{NewTradingSnapshot, TradingSnapshot};
use crate::schema::daily_stocks::dsl::*;

pub type PgPoolConn = PooledConnection<ConnectionManager<PgConnection>>;

/// 先写入者胜：同一股票代码已存在时不做任何修改，返回受影响行数（0 或 1）
pub fn insert_first_write_wins(
    conn: &mut PgPoolConn,
    new_rec: &NewTradingSnapshot,
) -> Result<usize, diesel::result::Error> {
    diesel::insert_into(daily_stocks)
        .values(new_rec)
        .on_conflict(stock_symbol)
        .do_nothing()
        .execute(conn)
}

/// 后写入者胜：同一股票代码已存在时覆盖名称、市场、成交量与交易日
pub fn insert_latest_wins(
    conn: &mut PgPoolConn,
    new_rec: &NewTradingSnapshot,
) -> Result<usize, diesel::result::Error> {
    diesel::insert_into(daily_stocks)
        .values(new_rec)
        .on_conflict(stock_symbol)
        .do_update()
        .set(new_rec)
        .execute(conn)
}

pub fn find_by_symbol(
    conn: &mut PgPoolConn,
    symbol: &str,
) -> Result<Option<TradingSnapshot>, diesel::result::Error> {
    daily_stocks
        .filter(stock_symbol.eq(symbol))
        .select(TradingSnapshot::as_select())
        .first(conn)
        .optional()
}

/// 指定交易日的全部快照，按成交量降序
pub fn list_by_trade_date(
    conn: &mut PgPoolConn,
    date: NaiveDate,
) -> Result<Vec<TradingSnapshot>, diesel::result::Error> {
    daily_stocks
        .filter(trade_date.eq(date))
        .order(trade_volume.desc())
        .select(TradingSnapshot::as_select())
        .load(conn)
}

pub fn count_by_trade_date(conn: &mut PgPoolConn, date: NaiveDate) -> Result<i64, diesel::result::Error> {
    daily_stocks
        .filter(trade_date.eq(date))
        .count()
        .get_result(conn)
}

pub fn list_distinct_symbols(conn: &mut PgPoolConn) -> Result<Vec<String>, diesel::result::Error> {
    daily_stocks
        .select(stock_symbol)
        .distinct()
        .load::<String>(conn)
}
