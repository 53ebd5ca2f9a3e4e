//! Metrics recording for history store operations.

use std::time::Instant;

/// Records the outcome and latency of a store operation.
///
/// Emits `storage_operations_total` (counter) and
/// `storage_operation_duration_ms` (histogram), both labelled by backend,
/// operation and status. Without an installed recorder these are no-ops.
pub fn record_operation_metrics(
    backend: &'static str,
    operation: &'static str,
    start: Instant,
    status: &'static str,
) {
    metrics::counter!(
        "storage_operations_total",
        "backend" => backend,
        "operation" => operation,
        "status" => status
    )
    .increment(1);
    metrics::histogram!(
        "storage_operation_duration_ms",
        "backend" => backend,
        "operation" => operation,
        "status" => status
    )
    .record(start.elapsed().as_secs_f64() * 1000.0);
}

/// Maps a result to the status label used by [`record_operation_metrics`].
pub const fn status_label<T, E>(result: &Result<T, E>) -> &'static str {
    if result.is_ok() { "success" } else { "error" }
}
