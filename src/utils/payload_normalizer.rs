//! 提供方原始字段 -> 领域类型的纯函数转换
//!
//! 年度、金额等字段解析失败时归一化为 `None`，不视为错误；
//! 只有成交量这种非空列在格式错误时返回 [`NormalizeError`]。

use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use thiserror::Error;

use crate::api_models::finmind::{AmountField, FinMindDividendRow, YearField};
use crate::api_models::twse::TwseQuoteRow;
use crate::models::{Market, NewDividendRecord, NewTradingSnapshot};

/// dividends 表文本列的宽度，即 VARCHAR(20)
pub const MAX_DIVIDEND_TEXT_LEN: usize = 20;

#[derive(Debug, Error, PartialEq)]
pub enum NormalizeError {
    #[error("malformed number: {0:?}")]
    MalformedNumber(String),
    #[error("missing field: {0}")]
    MissingField(&'static str),
}

/// "12,345" -> 12345
pub fn parse_volume(raw: &str) -> Result<i64, NormalizeError> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return Err(NormalizeError::MalformedNumber(raw.to_string()));
    }
    cleaned
        .parse::<i64>()
        .map_err(|_| NormalizeError::MalformedNumber(raw.to_string()))
}

/// 数字原样返回；字符串去掉所有非数字字符后再解析（"2023年" -> 2023）
pub fn normalize_year(raw: &YearField) -> Option<i32> {
    match raw {
        YearField::Number(n) => i32::try_from(*n).ok(),
        YearField::Text(s) => {
            let digits: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
            if digits.is_empty() {
                return None;
            }
            digits.parse::<i32>().ok()
        }
        YearField::Other(_) => None,
    }
}

/// 超过列宽的值按缺失处理
fn fit_column(value: String) -> Option<String> {
    if value.chars().count() > MAX_DIVIDEND_TEXT_LEN {
        tracing::warn!("股利字段超出 {} 字元，以空值写入: {}", MAX_DIVIDEND_TEXT_LEN, value);
        return None;
    }
    Some(value)
}

/// 日期类字段作为不透明文本透传，空串视为缺失
pub fn normalize_optional_text(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .and_then(fit_column)
}

/// 金额字段转成其数值的字符串表示
pub fn normalize_amount(raw: Option<&AmountField>) -> Option<String> {
    let rendered = match raw? {
        AmountField::Number(n) => n.to_string(),
        AmountField::Text(s) => {
            let trimmed = s.trim();
            BigDecimal::from_str(trimmed).ok()?;
            trimmed.to_string()
        }
        AmountField::Other(_) => return None,
    };
    fit_column(rendered)
}

/// 提供方给了合计就直接用；否则 cash + stock，缺失项按 0 计，两者都缺失时为 None
pub fn total_dividend(
    combined: Option<&str>,
    cash: Option<&str>,
    stock: Option<&str>,
) -> Option<String> {
    if let Some(total) = combined {
        return fit_column(total.to_string());
    }
    if cash.is_none() && stock.is_none() {
        return None;
    }

    let to_decimal = |v: Option<&str>| {
        v.and_then(|s| BigDecimal::from_str(s).ok())
            .unwrap_or_else(|| BigDecimal::from(0))
    };
    let sum = to_decimal(cash) + to_decimal(stock);
    fit_column(sum.to_string())
}

pub fn normalize_quote_row(
    row: &TwseQuoteRow,
    market: Market,
    trade_date: NaiveDate,
) -> Result<NewTradingSnapshot, NormalizeError> {
    let symbol = row.symbol.trim();
    if symbol.is_empty() {
        return Err(NormalizeError::MissingField("symbol"));
    }
    let volume = parse_volume(&row.volume)?;
    Ok(NewTradingSnapshot::new(
        symbol,
        row.name.trim(),
        market,
        volume,
        trade_date,
    ))
}

/// `requested_symbol` 用于提供方没有回传 stock_id 的情况
pub fn normalize_dividend_row(requested_symbol: &str, row: &FinMindDividendRow) -> NewDividendRecord {
    let stock_symbol = match row.stock_id.trim() {
        "" => requested_symbol.to_string(),
        id => id.to_string(),
    };
    let cash_dividend = normalize_amount(row.cash_earnings_distribution.as_ref());
    let stock_dividend = normalize_amount(row.stock_earnings_distribution.as_ref());
    let combined = normalize_amount(row.total_dividend.as_ref());
    let total = total_dividend(
        combined.as_deref(),
        cash_dividend.as_deref(),
        stock_dividend.as_deref(),
    );

    NewDividendRecord {
        stock_symbol,
        year: normalize_year(&row.year),
        ex_dividend_date: normalize_optional_text(row.cash_ex_dividend_trading_date.as_deref()),
        cash_dividend,
        stock_dividend,
        total_dividend: total,
        issued_date: normalize_optional_text(row.date.as_deref()),
    }
}
