//! Tracing initialization for tests
//!
//! Call [`init_tracing`] at the top of a test to see the ledger's
//! structured logs; output is filtered through `RUST_LOG` as usual.

use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;

static INIT: OnceCell<()> = OnceCell::new();

/// Installs a test-friendly tracing subscriber exactly once
pub fn init_tracing() {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}
