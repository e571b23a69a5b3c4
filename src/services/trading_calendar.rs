//! 交易日回溯
//!
//! 提供方只在交易日发布资料，且这里不维护假日表，
//! 所以从今天开始往前逐日探测，最多 7 天（偏移 0..=6），第一天有资料即返回。

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use thiserror::Error;

use crate::api_models::twse::TwseQuoteRow;
use crate::repositories::{MarketStore, StoreError};

use super::provider::{ProviderError, SnapshotProvider};

pub const LOOKBACK_DAYS: u32 = 7;

#[derive(Debug, Error)]
pub enum CalendarError<E: std::error::Error + 'static> {
    #[error("最近 {lookback_days} 天内都没有交易资料")]
    NotFound { lookback_days: u32 },
    #[error(transparent)]
    Probe(E),
}

/// 对某一天做一次探测：有资料返回 `Some`，空结果返回 `None`
#[async_trait]
pub trait TradingDayProbe: Send + Sync {
    type Output: Send;
    type Error: std::error::Error + Send + 'static;

    async fn probe(&self, date: NaiveDate) -> Result<Option<Self::Output>, Self::Error>;
}

/// 返回最近一个有资料的日期以及该次探测的结果；探测出错立即返回，不再继续往前找
pub async fn find_latest_available_date<P>(
    probe: &P,
    today: NaiveDate,
) -> Result<(NaiveDate, P::Output), CalendarError<P::Error>>
where
    P: TradingDayProbe + ?Sized,
{
    for offset in 0..LOOKBACK_DAYS {
        let Some(date) = today.checked_sub_days(Days::new(u64::from(offset))) else {
            break;
        };
        tracing::debug!("探测交易日 {} (偏移 {})", date, offset);
        if let Some(output) = probe.probe(date).await.map_err(CalendarError::Probe)? {
            tracing::info!("找到有效资料日：{}", date);
            return Ok((date, output));
        }
    }

    Err(CalendarError::NotFound {
        lookback_days: LOOKBACK_DAYS,
    })
}

/// 直接向行情提供方探测，命中时顺带返回当天的行情行
pub struct ProviderProbe<'a, P: ?Sized>(pub &'a P);

#[async_trait]
impl<'a, P> TradingDayProbe for ProviderProbe<'a, P>
where
    P: SnapshotProvider + ?Sized,
{
    type Output = Vec<TwseQuoteRow>;
    type Error = ProviderError;

    async fn probe(&self, date: NaiveDate) -> Result<Option<Self::Output>, Self::Error> {
        let rows = self.0.fetch_daily_quotes(date).await?;
        Ok((!rows.is_empty()).then_some(rows))
    }
}

/// 对已入库的快照做探测，命中时返回当天的行数
pub struct StoredSnapshotProbe<'a, S: ?Sized>(pub &'a S);

#[async_trait]
impl<'a, S> TradingDayProbe for StoredSnapshotProbe<'a, S>
where
    S: MarketStore + ?Sized,
{
    type Output = i64;
    type Error = StoreError;

    async fn probe(&self, date: NaiveDate) -> Result<Option<Self::Output>, Self::Error> {
        let count = self.0.count_snapshots_on(date)?;
        Ok((count > 0).then_some(count))
    }
}
