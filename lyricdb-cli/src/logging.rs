//! Log subscriber setup
//!
//! The subscriber is installed before the config file is read. It starts
//! with the filter from `RUST_LOG` or `--log-level` when one is given and
//! `info` otherwise; the configured level replaces that startup filter only
//! when neither was given.

use anyhow::{Context, Result};
use tracing_subscriber::{
    layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

const STARTUP_LEVEL: &str = "info";

/// Handle on the installed filter
pub struct LogFilter {
    handle: reload::Handle<EnvFilter, Registry>,
    explicit: bool,
}

impl LogFilter {
    /// Switch to the configured level unless a filter was given explicitly.
    /// Returns whether the filter changed.
    pub fn apply_configured(&self, level: &str) -> Result<bool> {
        if self.explicit {
            return Ok(false);
        }
        self.handle
            .reload(EnvFilter::new(level))
            .context("Failed to apply configured log level")?;
        Ok(true)
    }
}

/// Reloadable filter layer for a registry-based subscriber
pub fn filter_layer(explicit: Option<&str>) -> (reload::Layer<EnvFilter, Registry>, LogFilter) {
    let (layer, handle) = reload::Layer::new(EnvFilter::new(explicit.unwrap_or(STARTUP_LEVEL)));
    let filter = LogFilter {
        handle,
        explicit: explicit.is_some(),
    };
    (layer, filter)
}

/// Install the global subscriber. Logs go to stderr, stdout carries the
/// JSON result.
pub fn init(explicit: Option<&str>) -> Result<LogFilter> {
    let (layer, filter) = filter_layer(explicit);
    tracing_subscriber::registry()
        .with(layer)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .context("Failed to install log subscriber")?;
    Ok(filter)
}
