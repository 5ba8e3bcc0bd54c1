//! Environment source: CTXSYNC_ prefix, `__` between nested keys.
//!
//! `CTXSYNC_API_KEY` sets `api_key`; `CTXSYNC_SYNC__POLL_INTERVAL_MS` sets
//! `sync.poll_interval_ms`.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

pub const ENV_PREFIX: &str = "CTXSYNC";

pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    )
}
