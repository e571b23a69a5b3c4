//! 日志初始化：控制台始终输出，`LOG_TO_FILE` 打开时另写按天轮转的文件

use std::path::PathBuf;

use chrono::Utc;
use chrono_tz::Asia::Taipei;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{self, format::Writer, time::FormatTime};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info,reqwest=warn,hyper=warn,diesel=warn";
const LOG_FILE_PREFIX: &str = "twse-market-sync.log";

/// 日志时间戳使用台北时间
struct TaipeiTimer;

impl FormatTime for TaipeiTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Utc::now().with_timezone(&Taipei).format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

#[derive(Debug, PartialEq)]
struct LogTarget {
    /// None 表示只输出到控制台
    file_dir: Option<PathBuf>,
}

impl LogTarget {
    fn from_vars(log_to_file: Option<&str>, log_dir: Option<&str>) -> Self {
        let enabled = matches!(log_to_file.map(str::trim), Some("true") | Some("1"));
        let file_dir = enabled.then(|| PathBuf::from(log_dir.unwrap_or("./logs")));
        Self { file_dir }
    }

    fn from_env() -> Self {
        let log_to_file = std::env::var("LOG_TO_FILE").ok();
        let log_dir = std::env::var("LOG_DIR").ok();
        Self::from_vars(log_to_file.as_deref(), log_dir.as_deref())
    }
}

pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let target = LogTarget::from_env();

    let console = fmt::layer()
        .with_timer(TaipeiTimer)
        .with_target(true)
        .with_line_number(true);

    let file = target.file_dir.as_ref().map(|dir| {
        fmt::layer()
            .with_timer(TaipeiTimer)
            .with_writer(RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX))
            .with_ansi(false)
            .with_target(true)
            .with_line_number(true)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .init();

    if let Some(dir) = &target.file_dir {
        tracing::debug!("日志同时写入 {}", dir.display());
    }
}
