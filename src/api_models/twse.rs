use serde::Deserialize;
use serde_json::Value;

/// 每日收盘行情表的标题关键字
pub const CLOSING_QUOTES_TITLE: &str = "每日收盤行情";

/// MI_INDEX 接口响应
/// 无数据时只有 `stat` 字段，例如 "很抱歉，沒有符合條件的資料!"
#[derive(Debug, Deserialize)]
pub struct TwseDailyReport {
    pub stat: String,
    #[allow(dead_code)]
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub tables: Vec<TwseTable>,
}

#[derive(Debug, Deserialize)]
pub struct TwseTable {
    #[serde(default)]
    pub title: Option<String>,
    #[allow(dead_code)]
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub data: Vec<Vec<Value>>,
}

/// 每日收盘行情中的一行，只保留需要的前三列
#[derive(Debug, Clone, PartialEq)]
pub struct TwseQuoteRow {
    pub symbol: String,
    pub name: String,
    pub volume: String,
}

impl TwseDailyReport {
    pub fn is_ok(&self) -> bool {
        self.stat == "OK"
    }

    /// 找出标题包含 "每日收盤行情" 的表
    pub fn closing_quotes(&self) -> Option<&TwseTable> {
        if !self.is_ok() {
            return None;
        }
        self.tables.iter().find(|table| {
            table
                .title
                .as_deref()
                .is_some_and(|title| title.contains(CLOSING_QUOTES_TITLE))
        })
    }
}

impl TwseTable {
    /// 按固定位置 `[代號, 名稱, 成交股數, ...]` 取列
    /// 列数不足三列的行直接丢弃并返回在第二个集合里
    pub fn quote_rows(&self) -> (Vec<TwseQuoteRow>, Vec<String>) {
        let mut rows = Vec::with_capacity(self.data.len());
        let mut rejected = Vec::new();

        for raw in &self.data {
            if raw.len() < 3 {
                rejected.push(format!("列数不足: {:?}", raw));
                continue;
            }
            rows.push(TwseQuoteRow {
                symbol: cell_text(&raw[0]),
                name: cell_text(&raw[1]),
                volume: cell_text(&raw[2]),
            });
        }

        (rows, rejected)
    }
}

fn cell_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
