pub mod dividend_sync_job;
pub mod error;
pub mod job_history;
pub mod snapshot_sync_job;
