//! Tracing hooks for statement observability.
//!
//! Enable the `tracing` feature to emit events via the `tracing` crate.
//! These macros no-op when the feature is disabled, avoiding `#[cfg]`
//! boilerplate at every call site.

/// Emit a debug-level event with the rendered SQL text.
///
/// ```ignore
/// relq_trace_query!(&sql_text);
/// ```
#[macro_export]
macro_rules! relq_trace_query {
    ($sql:expr) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(sql = %$sql, "relq.query");
    };
}

/// Emit a debug-level event for a completed mutation with its row count.
///
/// ```ignore
/// relq_trace_exec!(&sql_text, rows_affected);
/// ```
#[macro_export]
macro_rules! relq_trace_exec {
    ($sql:expr, $rows:expr) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(sql = %$sql, rows = $rows, "relq.exec");
    };
}
