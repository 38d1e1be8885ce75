//! Tracing/logging setup shared by the gate binaries.

/// Initialize process-wide logging with the `info` default filter and the
/// format named by `TOLLGATE_LOG_FORMAT` (JSON when unset).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init("info", tracing::LogFormat::from_env());
}

/// Tracing configuration (filters, layers).
pub mod tracing;

pub use tracing::LogFormat;
