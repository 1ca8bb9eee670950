use crate::config::AppConfig;
use tracing_subscriber::EnvFilter;

/// Initialises the global tracing subscriber.
///
/// The filter is taken from `RUST_LOG` when set, otherwise from the
/// configured log level. Safe to call more than once; later calls are no-ops.
pub fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    if config.log_json {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    }
}
