use super::models::AppConfig;
use super::tables::{ConfigTables, TABLE_NAMES};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Load configuration from disk, falling back to defaults on any error.
pub fn load_config(path: &Path) -> AppConfig {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) => {
            info!(
                path = %path.display(),
                "No config file found ({err}); using defaults"
            );
            return AppConfig::default();
        }
    };

    match parse_config(&data) {
        Ok(config) => {
            debug!(path = %path.display(), "Loaded config");
            config
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                "Invalid config file; using defaults: {err:#}"
            );
            AppConfig::default()
        }
    }
}

/// Parse either the sectioned layout (`[playback]`, `[voices]`, ...) or a flat
/// file whose keys match `AppConfig` fields.
pub fn parse_config(data: &str) -> Result<AppConfig> {
    let raw: toml::Table = toml::from_str(data).context("Parsing config TOML")?;
    let sectioned = TABLE_NAMES
        .iter()
        .any(|name| matches!(raw.get(*name), Some(toml::Value::Table(_))));

    if sectioned {
        let tables: ConfigTables = toml::from_str(data).context("Reading config tables")?;
        Ok(tables.into())
    } else {
        toml::from_str(data).context("Reading flat config")
    }
}

pub fn serialize_config(config: &AppConfig) -> Result<String> {
    let tables = ConfigTables::from(config);
    toml::to_string(&tables).context("Serializing config")
}
