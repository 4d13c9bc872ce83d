use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the logging system with JSON formatting and
/// environment-based filtering (defaults to "info" if not set).
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .json()
        .flatten_event(true)
        .init();
}
