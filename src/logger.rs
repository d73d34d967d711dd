use tracing_subscriber::{EnvFilter, fmt};

/// Initialize the tracing subscriber used by scriptest.
///
/// The level is controlled through `RUST_LOG`, defaulting to `info`:
/// - RUST_LOG=scriptest=debug cargo test
/// - RUST_LOG=trace cargo test
///
/// Test binaries may call this from several tests; only the first call
/// installs the subscriber.
pub fn init_logger() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_test_writer()
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("Logger initialized");
    }
}
