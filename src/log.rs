use tracing_subscriber::{
    EnvFilter, fmt, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt,
};

/// Installs the tracing subscriber. Without `--verbose` only warnings (such
/// as failed historical rate fetches) reach the terminal, so report tables
/// stay uncluttered. `RUST_LOG` overrides either default.
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose { "mstk=debug" } else { "mstk=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(fmt::layer().compact().without_time())
        .with(filter)
        .init();
}
