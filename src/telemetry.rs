//! Process-wide tracing setup.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Filter from `RUST_LOG` when set, else the configured directive.
pub fn env_filter(cfg: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.filter))
}

/// Install the global subscriber. Returns `false` if one was already set,
/// which happens when tests or an embedding application got there first.
pub fn init_tracing(cfg: &LoggingConfig) -> bool {
    let json = cfg.json.then(|| fmt::layer().json().with_current_span(true));
    let plain = (!cfg.json).then(|| fmt::layer().with_target(true));
    tracing_subscriber::registry()
        .with(env_filter(cfg))
        .with(json)
        .with(plain)
        .try_init()
        .is_ok()
}
