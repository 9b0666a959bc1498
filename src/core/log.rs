use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

/// Installs the global subscriber. Quiet unless `verbose` or `RUST_LOG` is set.
pub fn init_logging(verbose: bool) {
    tracing_subscriber::registry()
        .with(log_filter(verbose, EnvFilter::try_from_default_env().ok()))
        .with(fmt::layer().with_writer(std::io::stderr).without_time())
        .init();
}

/// `RUST_LOG` wins when present; otherwise `bondterm` logs at debug with
/// `verbose` and not at all without it.
fn log_filter(verbose: bool, env_filter: Option<EnvFilter>) -> Box<dyn Layer<Registry> + Send + Sync> {
    match env_filter {
        Some(env_filter) => Box::new(env_filter),
        None => {
            let level = if verbose {
                LevelFilter::DEBUG
            } else {
                LevelFilter::OFF
            };
            Box::new(Targets::new().with_target("bondterm", level))
        }
    }
}
