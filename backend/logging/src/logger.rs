//! Structured Logger
//!
//! Wraps `tracing` to provide console output, optional JSON formatting, daily
//! rolling NDJSON files, and environment-based level control.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Options for [`init_logger`].
#[derive(Debug, Clone, Default)]
pub struct LoggerOptions<'a> {
    /// Default `EnvFilter` directive; `RUST_LOG` takes precedence.
    pub level: &'a str,
    /// Write rolling NDJSON files into this directory when set.
    pub log_dir: Option<&'a Path>,
    /// Format console output as JSON instead of human-readable text.
    pub json_console: bool,
}

/// Initialize the global structured logger.
///
/// Console output goes to stderr so command output on stdout stays parseable.
/// The returned guard flushes the file writer on drop and must be held for
/// the lifetime of the process.
pub fn init_logger(options: LoggerOptions<'_>) -> Option<WorkerGuard> {
    let level = if options.level.is_empty() { "info" } else { options.level };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = if options.json_console {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_ansi(true)
            .boxed()
    };

    let (file_layer, guard) = match options.log_dir {
        Some(dir) => {
            // Rolling file appender: writes NDJSON to `bugscope.log.YYYY-MM-DD`
            let appender = RollingFileAppender::new(Rotation::DAILY, dir, "bugscope.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .json()
                .with_writer(writer)
                .with_ansi(false)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    guard
}
