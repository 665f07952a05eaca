use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::registry::dump::DEFAULT_MAX_EXTENSION_LEN;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// How the host registry is reached
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegistryConfig {
    /// `lsregister` binary used for discovery dumps
    #[serde(default = "default_lsregister_path")]
    pub lsregister_path: PathBuf,
    /// Discovery drops extensions longer than this
    #[serde(default = "default_max_extension_len")]
    pub max_extension_len: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            lsregister_path: default_lsregister_path(),
            max_extension_len: default_max_extension_len(),
        }
    }
}

fn default_lsregister_path() -> PathBuf {
    PathBuf::from(
        "/System/Library/Frameworks/CoreServices.framework/Frameworks/LaunchServices.framework/Support/lsregister",
    )
}

fn default_max_extension_len() -> usize {
    DEFAULT_MAX_EXTENSION_LEN
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive, used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "openwith=info".to_string()
}
