//! Process-wide tracing setup shared by every portal binary and test harness.

/// Initialize process-wide logging from the environment.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(&tracing::LogSettings::from_env());
}

/// Subscriber configuration (filters, output format).
pub mod tracing;

pub use tracing::{LogFormat, LogSettings};
