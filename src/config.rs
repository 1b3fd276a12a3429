//! Bridge configuration, loaded from TOML and the environment

use crate::logging::LogConfig;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

static CURRENT: Lazy<RwLock<Arc<BridgeConfig>>> =
    Lazy::new(|| RwLock::new(Arc::new(BridgeConfig::default())));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Print the pending exception (`ExceptionDescribe`) before clearing it
    /// on a resolution failure
    pub describe_exceptions: bool,

    /// Validate typed arguments and the requested return type against the
    /// method descriptor before dispatching
    pub check_arguments: bool,

    pub log: LogConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            describe_exceptions: true,
            check_arguments: true,
            log: LogConfig::default(),
        }
    }
}

impl BridgeConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config: {}", e))?;

        Self::parse(&content)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("Failed to parse config: {}", e))
    }

    /// Load from `JNI_BRIDGE_CONFIG` if set, then apply logging overrides
    pub fn from_env() -> Result<Self, String> {
        let mut config = match std::env::var("JNI_BRIDGE_CONFIG") {
            Ok(path) => Self::load(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        config.log = config.log.with_env_overrides();
        Ok(config)
    }
}

/// Replace the process-wide configuration
pub fn install(config: BridgeConfig) {
    *CURRENT.write() = Arc::new(config);
}

/// Snapshot of the process-wide configuration
pub fn current() -> Arc<BridgeConfig> {
    CURRENT.read().clone()
}
