use diesel::prelude::*;
use diesel::result::Error as DieselError;

use crate::models::job_execution_history::{JobExecutionHistory, NewJobExecutionHistory, UpdateJobExecutionHistory};
use crate::schema::job_execution_history::dsl::*;

/// 创建任务执行历史记录
pub fn create(
    conn: &mut PgConnection,
    new_history: &NewJobExecutionHistory,
) -> Result<JobExecutionHistory, DieselError> {
    diesel::insert_into(job_execution_history)
        .values(new_history)
        .returning(JobExecutionHistory::as_returning())
        .get_result(conn)
}

/// 更新任务执行历史
pub fn update(
    conn: &mut PgConnection,
    history_id: i32,
    update_data: &UpdateJobExecutionHistory,
) -> Result<JobExecutionHistory, DieselError> {
    diesel::update(job_execution_history.find(history_id))
        .set(update_data)
        .returning(JobExecutionHistory::as_returning())
        .get_result(conn)
}
