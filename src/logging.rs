use std::sync::Once;
use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVE: &str = "time_scheduler=info";

static INIT: Once = Once::new();

/// Installs the stderr fmt subscriber. `RUST_LOG` overrides the default
/// filter. Later calls are no-ops.
pub fn init() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init();
    });
}
