//! Shared setup for the `recall` and `recall-server` binaries.

pub mod http;

pub use http::router;

use recall_core::config::{Config, Settings};
use tracing_subscriber::EnvFilter;

/// Log to stderr so stdout stays machine-readable. `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

pub fn load_settings() -> anyhow::Result<Settings> {
    let config = Config::load()?;
    Ok(config.settings()?)
}
