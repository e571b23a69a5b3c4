pub mod backlog;
pub mod finmind_service;
pub mod provider;
pub mod trading_calendar;
pub mod twse_service;
