use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// Filter resolution order: `RUST_LOG` if set, otherwise the `default_level`
/// the caller pulled from config (`LOG_LEVEL`).
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
