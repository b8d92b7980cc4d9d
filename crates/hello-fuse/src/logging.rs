use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Log level for a run, before `RUST_LOG` directives are applied
pub fn level(debug: bool) -> Level {
    if debug {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

/// Install the global subscriber. `fuser`'s `log` records are bridged in.
pub fn init(debug: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level(debug).into()))
        .init();
}
