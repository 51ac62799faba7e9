//! Shared test helpers.

use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber once per test binary. Respects `RUST_LOG`;
/// subsequent calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
