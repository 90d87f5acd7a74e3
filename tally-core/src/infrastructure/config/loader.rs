//! Configuration loader using Figment for layered config management.
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. TOML config file
//! 3. Environment variables (`TALLY_*` prefix)

use crate::foundation::LedgerError;
use crate::infrastructure::config::types::NodeConfig;
use crate::infrastructure::config::validation::validate_config;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use log::{debug, info};
use std::path::Path;

/// Environment variable prefix for config overrides.
///
/// Example: `TALLY_SESSION_TIMEOUT_SECONDS=120` -> `session_timeout_seconds`.
const ENV_PREFIX: &str = "TALLY_";

/// Default config file name inside a data directory.
pub const CONFIG_FILE_NAME: &str = "tally-config.toml";

/// Load configuration from the default file in `data_dir`.
pub fn load_config(data_dir: &Path) -> Result<NodeConfig, LedgerError> {
    load_config_from_file(&data_dir.join(CONFIG_FILE_NAME))
}

/// Load configuration from a specific file path, validated.
pub fn load_config_from_file(path: &Path) -> Result<NodeConfig, LedgerError> {
    info!("loading configuration path={}", path.display());
    let figment = Figment::from(Serialized::defaults(NodeConfig::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX));
    let config: NodeConfig =
        figment.extract().map_err(|e| LedgerError::ConfigError(format!("config extraction failed: {e}")))?;
    validate_config(&config)?;
    debug!(
        "configuration loaded party={} notary={} peers={} session_timeout_seconds={}",
        config.party,
        config.notary,
        config.peers.len(),
        config.session_timeout_seconds
    );
    Ok(config)
}
