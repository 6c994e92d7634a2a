use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

/// Installs the global `tracing` subscriber. `RUST_LOG` overrides the
/// default `tripsplit=info,actix_web=info` filter. Also picks up `log`
/// records, which is how actix-web's request logger reaches the output.
pub fn init() {
    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("tripsplit=info,actix_web=info"));

        fmt().with_env_filter(filter).init();
    });
}
