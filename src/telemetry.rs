use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global subscriber: `RUST_LOG` if set, else `log_level`,
/// formatted to stderr so stdout stays machine-readable.
///
/// # Arguments
///
/// * `log_level` - Filter directive used when `RUST_LOG` is unset, e.g. `info` or `freightdesk=debug`.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(log_level: &str) -> Result<(), TryInitError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(false),
        )
        .try_init()
}
