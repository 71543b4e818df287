//! Log output for the server, driven by the `[logging]` config section.
//!
//! Development prints pretty, span-annotated events to stdout. Production
//! writes JSON events to a daily file `<directory>/<file_prefix>.<date>.log`
//! and a compact copy to stdout for the service manager.
//!
//! `RUST_LOG` takes precedence over `logging.level`.

use std::sync::OnceLock;

use anyhow::Context;
use parkwatch_core::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Flush guards for the non-blocking writers; dropping them loses buffered
/// events.
static GUARDS: OnceLock<[WorkerGuard; 2]> = OnceLock::new();

/// Install the global subscriber.
///
/// # Errors
///
/// Returns an error if the filter directives do not parse, or, in
/// production, if the log directory or file cannot be created.
pub fn init(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = env_filter(&config.level)?;

    if config.production {
        init_production(filter, file_appender(config)?);
    } else {
        init_development(filter);
    }

    tracing::debug!(production = config.production, level = %config.level, "Logging ready");
    Ok(())
}

fn env_filter(level: &str) -> anyhow::Result<EnvFilter> {
    match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) => EnvFilter::try_new(&directives)
            .with_context(|| format!("Invalid {} '{directives}'", EnvFilter::DEFAULT_ENV)),
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("Invalid logging.level '{level}'")),
    }
}

fn file_appender(config: &LoggingConfig) -> anyhow::Result<RollingFileAppender> {
    std::fs::create_dir_all(&config.directory).with_context(|| {
        format!(
            "Failed to create log directory {}",
            config.directory.display()
        )
    })?;

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(config.file_prefix.as_str())
        .filename_suffix("log")
        .build(&config.directory)
        .with_context(|| format!("Failed to open log file in {}", config.directory.display()))
}

fn init_production(filter: EnvFilter, appender: RollingFileAppender) {
    let (file_writer, file_guard) = tracing_appender::non_blocking(appender);
    let (stdout_writer, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());

    let file_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_current_span(true)
        .with_writer(file_writer)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    let stdout_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(stdout_writer)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    let _ = GUARDS.set([file_guard, stdout_guard]);
}

fn init_development(filter: EnvFilter) {
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .pretty()
                .with_file(true)
                .with_line_number(true)
                .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE),
        )
        .init();
}
