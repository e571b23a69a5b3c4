pub mod finmind;
pub mod twse;
