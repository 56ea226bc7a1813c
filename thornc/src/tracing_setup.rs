//! Tracing initialization for the Thorn driver.
//!
//! Controlled by environment variables:
//! - `THORNC_LOG`: Filter string (`RUST_LOG` syntax). Falls back to `RUST_LOG`.
//!
//! When neither is set, defaults to `warn` level.

use std::sync::OnceLock;
use tracing_subscriber::{prelude::*, EnvFilter, Registry};

static INIT: OnceLock<()> = OnceLock::new();

/// Initializes the tracing subscriber. Safe to call multiple times — only
/// the first call takes effect.
pub fn init() {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_env("THORNC_LOG")
            .or_else(|_| EnvFilter::try_from_env("RUST_LOG"))
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        Registry::default()
            .with(tracing_subscriber::fmt::layer().with_target(true).with_writer(std::io::stderr).compact())
            .with(filter)
            .init();
    });
}
