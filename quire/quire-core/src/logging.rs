//! Logging initialisation.

use crate::config::GeneralConfig;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Build the filter used by [`init_logging`].
///
/// `RUST_LOG` wins when set; otherwise the configured level applies to the
/// quire crates and everything else logs at `warn`.
pub fn build_filter(config: &GeneralConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "quire_core={level},quire_resource={level},warn",
            level = config.log_level
        ))
    })
}

/// Install the global tracing subscriber.
///
/// Returns `false` if a subscriber was already installed, which makes the
/// call safe to repeat from tests and embedding applications.
pub fn init_logging(config: &GeneralConfig) -> bool {
    let filter = build_filter(config);

    if config.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init()
            .is_ok()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .try_init()
            .is_ok()
    }
}
