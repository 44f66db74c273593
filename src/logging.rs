//! Logging utilities for the ismip-hom pipeline.
//!
//! This module provides structured logging functionality to make logs more
//! searchable, analyzable, and useful when comparing long batch runs.

use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::IsmipError;

/// Initialize the tracing subscriber with the given log level.
///
/// `RUST_LOG`, when set, takes precedence. Calling this twice is harmless.
pub fn init_tracing(log_level: &str) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(val) => val,
        Err(_) => log_level.to_string(),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .try_init();
}

/// Log a start message for a significant operation
pub fn log_operation_start(operation: &str, details: Option<&str>) {
    if let Some(details) = details {
        info!(
            operation = operation,
            details = details,
            "Starting operation"
        );
    } else {
        info!(operation = operation, "Starting operation");
    }
}

/// Log the completion of a significant operation
pub fn log_operation_end(operation: &str, start_time: Instant, success: bool) {
    let duration = start_time.elapsed();
    let duration_ms = duration.as_secs_f64() * 1000.0;

    if success {
        info!(
            operation = operation,
            duration_ms = duration_ms,
            "Operation completed successfully"
        );
    } else {
        warn!(
            operation = operation,
            duration_ms = duration_ms,
            "Operation completed with warnings"
        );
    }
}

/// Log an operation with timing and result in a single statement
pub fn log_timed_operation<F, R>(operation: &str, f: F) -> R
where
    F: FnOnce() -> R,
{
    let start = Instant::now();
    let operation_id = Uuid::new_v4();

    debug!(
        operation = operation,
        operation_id = %operation_id,
        "Starting operation"
    );

    let result = f();

    let duration = start.elapsed();

    info!(
        operation = operation,
        operation_id = %operation_id,
        duration_ms = duration.as_secs_f64() * 1000.0,
        "Operation completed"
    );

    result
}

/// Log detailed information about a loaded data file
pub fn log_load_stats(
    file_path: &str,
    model: &str,
    experiment: char,
    scenario: &str,
    method_class: &str,
    rows: usize,
    cols: usize,
) {
    debug!(
        operation = "data_load",
        file_path = file_path,
        model = model,
        experiment = %experiment,
        scenario = scenario,
        method_class = method_class,
        rows = rows,
        cols = cols,
        "Data loaded successfully"
    );
}

/// Log a data file that was dropped from the run
pub fn log_record_failure(error: &IsmipError, path: &Path) {
    error!(
        error = %error,
        file = %path.display(),
        error_type = error.kind(),
        "Record excluded from the run"
    );
}

/// Generate a unique run ID
pub fn generate_run_id() -> Uuid {
    Uuid::new_v4()
}
