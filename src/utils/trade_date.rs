use chrono::{NaiveDate, Utc};
use chrono_tz::Asia::Taipei;

/// 台北时区的"今天"
pub fn taipei_today() -> NaiveDate {
    Utc::now().with_timezone(&Taipei).date_naive()
}

/// TWSE 查询参数格式：YYYYMMDD
pub fn to_twse_param(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}
