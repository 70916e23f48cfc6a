//! 日志初始化：按天滚动的日志文件，`-v` 时同时输出到 stderr

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE_PREFIX: &str = "zview.log";

/// Keeps the file writer alive; dropping it flushes pending lines.
pub struct LoggingGuard {
    _file: WorkerGuard,
    log_dir: PathBuf,
}

impl LoggingGuard {
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

fn default_filter(verbose: bool) -> EnvFilter {
    let level = if verbose { "debug" } else { "info" };
    EnvFilter::new(format!("zview={level},zview_demo={level}"))
}

/// `RUST_LOG` overrides the level picked from `verbose`. Returns `None` when
/// the log directory cannot be created or a subscriber is already set.
pub fn init(verbose: bool) -> Option<LoggingGuard> {
    let log_dir = std::env::temp_dir().join("zview").join("logs");
    std::fs::create_dir_all(&log_dir).ok()?;

    let (file_writer, file_guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(&log_dir, LOG_FILE_PREFIX));
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(verbose));

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true);
    let stderr_layer = verbose.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_file(true)
            .with_line_number(true)
            .compact()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .ok()?;

    std::panic::set_hook(Box::new(|info| {
        tracing::error!(panic = %info, "panic");
    }));
    tracing::debug!(log_dir = %log_dir.display(), "logging ready");

    Some(LoggingGuard {
        _file: file_guard,
        log_dir,
    })
}
