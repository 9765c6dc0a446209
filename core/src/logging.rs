/// Tracing setup for embedding applications
use tracing_subscriber::EnvFilter;

/// Initialize tracing with RUST_LOG support, defaulting to `info`.
/// Safe to call once per process; later calls are ignored.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}
