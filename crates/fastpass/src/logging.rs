//! Subscriber setup for embedders that don't install their own.
//!
//! Hosts that already run a `tracing` subscriber should skip this: FastPass
//! only emits events and works with whatever is listening.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

/// Installs a global subscriber built from `config`.
///
/// `RUST_LOG` takes precedence over `config.level` when set.
///
/// Returns `false` if a global subscriber was already installed, in which
/// case nothing changes.
pub fn init(config: &LoggingConfig) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if config.json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_names(true),
            )
            .try_init()
            .is_ok()
    } else {
        registry
            .with(fmt::layer().with_target(true).with_thread_names(true))
            .try_init()
            .is_ok()
    };

    if installed {
        tracing::debug!(level = %config.level, json = config.json, "logging initialized");
    }
    installed
}
