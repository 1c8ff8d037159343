//! Configuration file support for confmgrd
//!
//! Loads and validates daemon settings from TOML.
//! Default location: /etc/sonic/confmgrd.toml

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sonic_cfgmgr_common::{CfgMgrError, CfgMgrResult};
use tracing::info;

use crate::paths::DEFAULT_CONFIG_PATH;

/// Log levels accepted by `[logging] level`
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Template source configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplatesConfig {
    /// Root of the salt-style template tree (`<root>/<env>/<name>`)
    #[serde(default = "default_template_root")]
    pub root: PathBuf,

    /// Environment used when a request names none
    #[serde(default = "default_env")]
    pub default_env: String,

    /// Fail rendering on variables missing from the context
    #[serde(default = "default_strict")]
    pub strict: bool,
}

/// BGP reconciliation defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BgpConfig {
    #[serde(default)]
    pub push_only_if_changes: bool,
}

/// CONFIG_DB reconciliation defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigDbConfig {
    /// Run `config reload` after a CONFIG_DB apply
    #[serde(default)]
    pub reload_on_change: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter; `RUST_LOG` takes precedence
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

/// Complete confmgrd configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfmgrConfig {
    #[serde(default)]
    pub templates: TemplatesConfig,

    #[serde(default)]
    pub bgp: BgpConfig,

    #[serde(default)]
    pub config_db: ConfigDbConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_template_root() -> PathBuf {
    PathBuf::from("/srv/salt")
}

fn default_env() -> String {
    "base".to_string()
}

fn default_strict() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            root: default_template_root(),
            default_env: default_env(),
            strict: default_strict(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl ConfmgrConfig {
    /// Load configuration from file, falling back to defaults if file not found
    pub fn load_or_default(path: impl AsRef<Path>) -> CfgMgrResult<Self> {
        let path = path.as_ref();
        let path_display = path.display().to_string();

        match fs::read_to_string(path) {
            Ok(content) => {
                toml::from_str(&content).map_err(|e| CfgMgrError::parse(path_display, e.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path_display, "Config file not found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(CfgMgrError::io(path_display, e)),
        }
    }

    /// Load from default location or defaults
    pub fn load() -> CfgMgrResult<Self> {
        Self::load_or_default(DEFAULT_CONFIG_PATH)
    }

    /// Validate configuration
    pub fn validate(&self) -> CfgMgrResult<()> {
        if self.templates.root.as_os_str().is_empty() {
            return Err(CfgMgrError::invalid_config("templates.root", "must not be empty"));
        }

        if self.templates.default_env.trim().is_empty() {
            return Err(CfgMgrError::invalid_config(
                "templates.default_env",
                "must not be empty",
            ));
        }

        let level = self.logging.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(CfgMgrError::invalid_config(
                "logging.level",
                format!("unknown level '{}'", self.logging.level),
            ));
        }

        Ok(())
    }
}
