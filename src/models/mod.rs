pub mod dividend_records;
pub mod job_execution_history;
pub mod trading_snapshots;

pub use dividend_records::{DividendRecord, NewDividendRecord};
pub use job_execution_history::{JobExecutionHistory, NewJobExecutionHistory, UpdateJobExecutionHistory};
pub use trading_snapshots::{Market, NewTradingSnapshot, TradingSnapshot};
