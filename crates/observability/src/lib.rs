//! Process-wide logging setup shared by the binaries.

/// Tracing subscriber configuration.
pub mod tracing;

/// Initialize structured logging.
///
/// `RUST_LOG` wins over `default_filter`. Safe to call more than once;
/// later calls are no-ops.
pub fn init(default_filter: &str) {
    tracing::init(default_filter);
}
