use thiserror::Error;

use crate::repositories::StoreError;
use crate::services::provider::ProviderError;
use crate::services::trading_calendar::CalendarError;

/// 整次运行级别的致命错误，由调用方决定退出码
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("最近 {lookback_days} 天内都没有交易资料")]
    NoTradingDate { lookback_days: u32 },
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<CalendarError<ProviderError>> for SyncError {
    fn from(e: CalendarError<ProviderError>) -> Self {
        match e {
            CalendarError::NotFound { lookback_days } => SyncError::NoTradingDate { lookback_days },
            CalendarError::Probe(e) => SyncError::Provider(e),
        }
    }
}
