use std::collections::BTreeSet;

use crate::repositories::{MarketStore, StoreError};

/// 有快照但还没有任何股利记录的股票代码
///
/// 返回值按代码排序只是为了日志稳定，调用方不应依赖顺序。
pub fn symbols_needing_dividend_sync<S>(store: &S) -> Result<Vec<String>, StoreError>
where
    S: MarketStore + ?Sized,
{
    let synced: BTreeSet<String> = store.dividend_symbols()?.into_iter().collect();
    let pending: BTreeSet<String> = store
        .snapshot_symbols()?
        .into_iter()
        .filter(|symbol| !synced.contains(symbol))
        .collect();
    Ok(pending.into_iter().collect())
}
