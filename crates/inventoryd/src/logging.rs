use tracing_subscriber::filter::Targets;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::util::TryInitError;

use crate::config::LoggingConfig;

/// Build the per-target filter for `config`.
pub fn filter(config: &LoggingConfig) -> Targets {
    config
        .overrides
        .iter()
        .fold(Targets::new().with_default(config.level), |targets, (target, level)| {
            targets.with_target(target.clone(), *level)
        })
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init(config: &LoggingConfig) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter(config))
        .try_init()
}
