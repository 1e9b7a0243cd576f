//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Installs the global `fmt` subscriber.
///
/// `RUST_LOG` takes precedence over `level` when it is set and valid. A
/// second call leaves the first subscriber in place.
pub fn init(level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if let Err(err) = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init()
    {
        tracing::debug!(%err, "tracing subscriber already installed");
    }
}
