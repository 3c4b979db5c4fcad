use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

use crate::settings::{Config, LogFormat};

/// Filter applied when `RUST_LOG` is not set.
fn default_directive(cfg: &Config) -> &'static str {
    if cfg.debug_logging() { "debug" } else { "warn" }
}

/// Install the global `tracing` subscriber.
///
/// Logs go to stderr so stdout only carries the progress lines.
/// `RUST_LOG` overrides the level chosen from the flags.
pub fn init(cfg: &Config) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(cfg)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let res = match cfg.log_format.unwrap_or_default() {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
    res.map_err(|e| anyhow!("failed to initialise logging: {e}"))
}
