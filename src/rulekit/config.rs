// SPDX-License-Identifier: MIT

//! Runtime configuration
//!
//! Defaults are overridden by environment variables, which are in turn
//! overridden by command line flags (applied by the binary).

use crate::engine::{AttrValue, DataRecord, Result, RuleError};
use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};

pub const RULES_FILE_ENV: &str = "RULEKIT_RULES_FILE";
pub const PORT_ENV: &str = "RULEKIT_PORT";
pub const DATA_FILE_ENV: &str = "RULEKIT_DATA_FILE";

pub const DEFAULT_RULES_FILE: &str = "rules.json";
pub const DEFAULT_PORT: u16 = 5000;

/// Record used when a caller does not supply one
pub static SAMPLE_RECORD: Lazy<DataRecord> = Lazy::new(|| {
    [
        ("age", AttrValue::Int(35)),
        ("department", AttrValue::Str("Sales".to_string())),
        ("salary", AttrValue::Int(60000)),
        ("experience", AttrValue::Int(3)),
    ]
    .into_iter()
    .collect()
});

#[derive(Debug, Clone)]
pub struct Config {
    pub rules_file: PathBuf,
    pub port: u16,
    pub default_record: DataRecord,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rules_file: PathBuf::from(DEFAULT_RULES_FILE),
            port: DEFAULT_PORT,
            default_record: SAMPLE_RECORD.clone(),
        }
    }
}

impl Config {
    /// Build configuration from defaults and environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(path) = std::env::var(RULES_FILE_ENV) {
            config.rules_file = PathBuf::from(path);
        }
        if let Ok(port) = std::env::var(PORT_ENV) {
            config.port = port.parse().map_err(|_| {
                RuleError::invalid_input(format!("{} must be a port number, got '{}'", PORT_ENV, port))
            })?;
        }
        if let Ok(path) = std::env::var(DATA_FILE_ENV) {
            config.default_record = load_record(path)?;
        }

        Ok(config)
    }
}

/// Read a data record from a JSON or YAML file
pub fn load_record<P: AsRef<Path>>(path: P) -> Result<DataRecord> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    if path
        .extension()
        .is_some_and(|ext| ext == "yaml" || ext == "yml")
    {
        Ok(serde_yaml::from_str(&content)?)
    } else {
        Ok(serde_json::from_str(&content)?)
    }
}

/// Parse an inline JSON record, e.g. `{"age": 35}`
pub fn parse_record(json: &str) -> Result<DataRecord> {
    Ok(serde_json::from_str(json)?)
}
