// Configuration for the vecpf engine

use crate::vector::ByteOrder;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Name of the configuration file searched by [`EngineConfig::from_dir`]
pub const CONFIG_FILE_NAME: &str = "vecpf.json";

/// The 128-bit path prints each 64-bit half with `%lx` and friends, so it
/// needs a C `long` of 64 bits (LP64). Elsewhere the halves would be
/// truncated.
pub const INT128_SUPPORTED: bool = std::mem::size_of::<libc::c_ulong>() == 8;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Register the `vv` modifier (vectors of two doubles)
    #[serde(default = "default_true")]
    pub vector_double: bool,

    /// Register the `vz`/`zv` modifiers (one 128-bit integer). Ignored on
    /// targets without a 64-bit C `long`.
    #[serde(default = "default_int128")]
    pub int128: bool,

    /// Byte order of incoming register images; platform order when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub byte_order: Option<ByteOrder>,
}

fn default_true() -> bool {
    true
}

fn default_int128() -> bool {
    INT128_SUPPORTED
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            vector_double: default_true(),
            int128: default_int128(),
            byte_order: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a vecpf.json file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from directory (searches for vecpf.json, then parents)
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, ConfigError> {
        let mut current = Some(dir.as_ref());
        while let Some(dir) = current {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Self::from_file(config_path);
            }
            current = dir.parent();
        }

        // No config found, use defaults
        Ok(Self::default())
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Example configuration file contents
    pub fn example() -> Result<String, ConfigError> {
        let example = Self {
            byte_order: Some(ByteOrder::native()),
            ..Self::default()
        };
        Ok(serde_json::to_string_pretty(&example)?)
    }

    /// Byte order the engine decodes lanes with
    pub fn effective_byte_order(&self) -> ByteOrder {
        self.byte_order.unwrap_or_else(ByteOrder::native)
    }
}
