use serde::Deserialize;
use serde_json::Value;

pub const DIVIDEND_DATASET: &str = "TaiwanStockDividend";

/// FinMind v4 通用响应
#[derive(Debug, Deserialize)]
pub struct FinMindResponse<T> {
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// 年度字段：可能是数字，也可能是 "112年" 这样的字符串
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum YearField {
    Number(i64),
    Text(String),
    Other(Value),
}

impl Default for YearField {
    fn default() -> Self {
        YearField::Other(Value::Null)
    }
}

/// 金额字段：数字或数字字符串，其它形态归一化时视为缺失
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AmountField {
    Number(serde_json::Number),
    Text(String),
    Other(Value),
}

#[derive(Debug, Clone, Deserialize)]
pub struct FinMindDividendRow {
    #[serde(default)]
    pub stock_id: String,
    #[serde(default)]
    pub year: YearField,
    /// 发放日
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, rename = "CashExDividendTradingDate", alias = "ex_dividend_trading_date")]
    pub cash_ex_dividend_trading_date: Option<String>,
    #[serde(default, rename = "CashEarningsDistribution", alias = "cash_dividend")]
    pub cash_earnings_distribution: Option<AmountField>,
    #[serde(default, rename = "StockEarningsDistribution", alias = "stock_dividend")]
    pub stock_earnings_distribution: Option<AmountField>,
    #[serde(default, alias = "TotalDividend")]
    pub total_dividend: Option<AmountField>,
}
