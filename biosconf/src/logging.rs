//! Diagnostic tracing to stderr.
//!
//! This is not the deployment log. The CMTrace file written by
//! [`crate::io::cmtrace`] is the product output and is written regardless of
//! the settings here; tracing only helps whoever is debugging a run.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the stderr subscriber.
///
/// `RUST_LOG` wins when set. Otherwise `verbose` selects `biosconf=debug`,
/// and the default is `warn`.
///
/// ```bash
/// RUST_LOG=biosconf::io::powershell=debug biosconf --get-settings
/// ```
pub fn init(verbose: bool) {
    let fallback = if verbose { "warn,biosconf=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose)
                .compact(),
        )
        .init();
}
