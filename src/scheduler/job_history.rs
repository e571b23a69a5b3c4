use chrono::{Local, NaiveDateTime};
use serde_json::Value;

use crate::app::DbPool;
use crate::models::{NewJobExecutionHistory, UpdateJobExecutionHistory};
use crate::repositories::job_execution_history;

use super::dividend_sync_job::DividendSyncReport;
use super::snapshot_sync_job::SnapshotSyncReport;

/// 写入 job_execution_history 所需的汇总
#[derive(Debug, Default)]
pub struct JobSummary {
    pub status: &'static str,
    pub total_count: usize,
    pub success_count: usize,
    pub failed_count: usize,
    pub skipped_count: usize,
    pub details: Option<Value>,
    pub error_message: Option<String>,
}

impl JobSummary {
    pub fn failed(error: impl ToString) -> Self {
        Self {
            status: "failed",
            error_message: Some(error.to_string()),
            ..Default::default()
        }
    }
}

impl From<&SnapshotSyncReport> for JobSummary {
    fn from(report: &SnapshotSyncReport) -> Self {
        Self {
            status: if report.rejected.is_empty() { "success" } else { "partial" },
            total_count: report.fetched_count,
            success_count: report.written_count,
            failed_count: report.rejected.len(),
            skipped_count: report.unchanged_count,
            details: serde_json::to_value(report).ok(),
            error_message: None,
        }
    }
}

impl From<&DividendSyncReport> for JobSummary {
    fn from(report: &DividendSyncReport) -> Self {
        let skipped = report.skipped_symbols().len();
        let synced = report.synced_symbols().len();
        let status = if report.terminated_early() {
            "failed"
        } else if report.cancelled {
            "cancelled"
        } else if skipped == 0 {
            "success"
        } else {
            "partial"
        };
        Self {
            status,
            total_count: report.attempted_count,
            success_count: synced,
            failed_count: usize::from(report.terminated_early()),
            skipped_count: skipped,
            details: serde_json::to_value(&report.details).ok(),
            error_message: report
                .quota_exhausted_at
                .as_ref()
                .map(|symbol| format!("额度用尽，中止于 {symbol}")),
        }
    }
}

/// 任务执行记录；写记录失败只打日志，不影响任务本身
pub struct JobRun {
    pool: DbPool,
    history_id: Option<i32>,
    started_at: NaiveDateTime,
}

impl JobRun {
    pub fn start(pool: &DbPool, job_name: &str) -> Self {
        let started_at = Local::now().naive_local();
        let new_history = NewJobExecutionHistory {
            job_name: job_name.to_string(),
            status: "running".to_string(),
            started_at,
        };

        let history_id = match pool.get() {
            Ok(mut conn) => match job_execution_history::create(&mut conn, &new_history) {
                Ok(history) => {
                    tracing::debug!("创建任务执行记录，ID: {}", history.id);
                    Some(history.id)
                }
                Err(e) => {
                    tracing::warn!("创建任务执行记录失败: {}", e);
                    None
                }
            },
            Err(e) => {
                tracing::warn!("获取数据库连接失败，无法记录任务: {}", e);
                None
            }
        };

        Self {
            pool: pool.clone(),
            history_id,
            started_at,
        }
    }

    pub fn finish(self, summary: JobSummary) {
        let Some(id) = self.history_id else {
            return;
        };
        let end_time = Local::now().naive_local();
        let update = UpdateJobExecutionHistory {
            status: Some(summary.status.to_string()),
            completed_at: Some(end_time),
            total_count: Some(summary.total_count as i32),
            success_count: Some(summary.success_count as i32),
            failed_count: Some(summary.failed_count as i32),
            skipped_count: Some(summary.skipped_count as i32),
            details: summary.details,
            error_message: summary.error_message,
            duration_ms: Some((end_time - self.started_at).num_milliseconds()),
        };

        match self.pool.get() {
            Ok(mut conn) => match job_execution_history::update(&mut conn, id, &update) {
                Ok(_) => tracing::debug!("任务执行记录已更新"),
                Err(e) => tracing::warn!("更新任务执行记录失败: {}", e),
            },
            Err(e) => tracing::warn!("获取数据库连接失败，无法更新任务记录: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::dividend_sync_job::{DividendSyncDetail, SymbolAction};

    fn detail(code: &str, action: SymbolAction) -> DividendSyncDetail {
        DividendSyncDetail {
            stock_code: code.to_string(),
            action,
            fetched_count: 0,
            written_count: 0,
            error: None,
        }
    }

    #[test]
    fn dividend_summary_reflects_quota_abort() {
        let report = DividendSyncReport {
            attempted_count: 2,
            details: vec![
                detail("A", SymbolAction::Synced),
                detail("B", SymbolAction::QuotaExhausted),
            ],
            quota_exhausted_at: Some("B".to_string()),
            ..Default::default()
        };

        let summary = JobSummary::from(&report);
        assert_eq!(summary.status, "failed");
        assert_eq!(summary.success_count, 1);
        assert_eq!(summary.failed_count, 1);
        assert!(summary.error_message.unwrap().contains('B'));
    }

    #[test]
    fn dividend_summary_is_partial_with_soft_skips() {
        let report = DividendSyncReport {
            attempted_count: 2,
            details: vec![
                detail("A", SymbolAction::Synced),
                detail("B", SymbolAction::Skipped),
            ],
            ..Default::default()
        };

        let summary = JobSummary::from(&report);
        assert_eq!(summary.status, "partial");
        assert_eq!(summary.skipped_count, 1);
    }
}
