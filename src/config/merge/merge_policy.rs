//! Merge rules: defaults, override order, conflict handling.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

use crate::config::DEFAULT_ENDPOINT;

/// Create a Config builder with merge policy defaults applied.
///
/// Sources added afterwards override these key by key, so a file that sets only
/// `sync.poll_interval_ms` keeps every other default.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("endpoint", DEFAULT_ENDPOINT)?
        .set_default("request_timeout_secs", 60_i64)?
        .set_default("connect_timeout_secs", 10_i64)?
        .set_default("sync.poll_interval_ms", 1500_i64)?
        .set_default("sync.sync_timeout_secs", 225_i64)?
        .set_default("sync.clear_timeout_secs", 60_i64)
}
