pub mod api;
pub mod commands;
pub mod error;
pub mod notifications;
pub mod state;

pub use error::{ConsoleError, Result};
pub use state::{ConsoleState, Settings};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// filter. Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "topic_console=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
