//! # Logging
//!
//! Console plus JSON-file tracing for background update runs. The file lands in
//! `<log_dir>/<environment>.<pid>.<timestamp>.log` so concurrent hosts never share
//! one.

use crate::config::LoggingConfig;
use chrono::Utc;
use std::fs;
use std::path::PathBuf;
use std::process;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize logging into `./log` at the environment's default level
pub fn init_structured_logging() {
    init_structured_logging_in(PathBuf::from("log"), None);
}

/// Initialize structured logging from the `logging` configuration section
pub fn init_from_config(config: &LoggingConfig) {
    init_structured_logging_in(PathBuf::from(&config.log_directory), config.level.as_deref());
}

/// Initialize structured logging into a specific directory, optionally
/// overriding the environment's default level
pub fn init_structured_logging_in(log_dir: PathBuf, level_override: Option<&str>) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = level_override
            .unwrap_or_else(|| default_level_for(&environment))
            .to_string();

        let pid = process::id();
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
        let log_filename = format!("{environment}.{pid}.{timestamp}.log");

        let console_layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_level(true)
            .with_ansi(true)
            .with_filter(EnvFilter::new(log_level.clone()));

        // File output is best effort; hosts with read-only working directories
        // still get console logging.
        if let Err(e) = fs::create_dir_all(&log_dir) {
            let _ = tracing_subscriber::registry().with(console_layer).try_init();
            tracing::warn!(
                log_dir = %log_dir.display(),
                error = %e,
                "Could not create log directory - console logging only"
            );
            return;
        }

        let file_appender = tracing_appender::rolling::never(&log_dir, &log_filename);
        let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

        let subscriber = tracing_subscriber::registry().with(console_layer).with(
            fmt::layer()
                .with_writer(file_writer)
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(false)
                .json()
                .with_filter(EnvFilter::new(log_level)),
        );

        // A host process may already own the global subscriber
        if subscriber.try_init().is_err() {
            tracing::debug!("Global tracing subscriber already set; keeping it");
        }

        tracing::info!(
            pid = pid,
            environment = %environment,
            log_file = %log_dir.join(&log_filename).display(),
            "STRUCTURED LOGGING: Initialized with file output"
        );

        // Keep the writer alive for the life of the process
        std::mem::forget(guard);
    });
}

/// `HOSTUPDATE_ENV`, then `APP_ENV`, then `development`
pub(crate) fn get_environment() -> String {
    std::env::var("HOSTUPDATE_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

fn default_level_for(environment: &str) -> &'static str {
    if environment == "production" {
        "info"
    } else {
        "debug"
    }
}

/// Log structured data for task runner operations
pub fn log_task_operation(
    operation: &str,
    task_name: &str,
    run_id: Option<&str>,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        task_name = %task_name,
        run_id = run_id,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "TASK_OPERATION"
    );
}

/// Log structured data for per-update operations
pub fn log_update_operation(
    operation: &str,
    update_id: Option<&str>,
    title: Option<&str>,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        update_id = update_id,
        title = title,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "UPDATE_OPERATION"
    );
}

/// Log a failure with the component and operation it happened in
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "ERROR"
    );
}
