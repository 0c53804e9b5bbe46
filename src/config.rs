use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::domain::{RetentionPolicy, TagFormat};
use crate::error::{DrcleanError, Result};

/// Name of the configuration file looked up in the working and config directories.
pub const CONFIG_FILE_NAME: &str = "drclean.toml";

/// Represents the complete configuration for drclean.
///
/// Contains the registry connection and the tag format and retention settings.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub registry: RegistryConfig,

    #[serde(default)]
    pub tag: TagConfig,
}

fn default_registry_url() -> String {
    "https://registry-1.docker.io/".to_string()
}

/// Registry connection settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RegistryConfig {
    #[serde(default = "default_registry_url")]
    pub url: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        RegistryConfig {
            url: default_registry_url(),
            username: String::new(),
            password: String::new(),
        }
    }
}

fn default_seperator() -> String {
    crate::domain::tag::DEFAULT_SEPARATOR.to_string()
}

fn default_dateformat() -> String {
    crate::domain::tag::DEFAULT_DATE_FORMAT.to_string()
}

fn default_keepmin() -> usize {
    10
}

fn default_maxage() -> Duration {
    Duration::from_secs(120 * 60 * 60)
}

/// Tag format and retention settings.
///
/// Key names follow the established `tag.*` option names, including the
/// `seperator` spelling.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TagConfig {
    #[serde(default = "default_seperator")]
    pub seperator: String,

    #[serde(default = "default_dateformat")]
    pub dateformat: String,

    #[serde(default = "default_keepmin")]
    pub keepmin: usize,

    /// Retention age, written as a human duration (`120h`, `5days`, `1w 2d`)
    #[serde(with = "humantime_serde", default = "default_maxage")]
    pub maxage: Duration,
}

impl Default for TagConfig {
    fn default() -> Self {
        TagConfig {
            seperator: default_seperator(),
            dateformat: default_dateformat(),
            keepmin: default_keepmin(),
            maxage: default_maxage(),
        }
    }
}

impl Config {
    /// Build the validated tag format.
    pub fn tag_format(&self) -> Result<TagFormat> {
        TagFormat::new(self.tag.seperator.as_str(), self.tag.dateformat.as_str())
    }

    /// Build the retention policy from `tag.maxage` and `tag.keepmin`.
    pub fn retention_policy(&self) -> Result<RetentionPolicy> {
        let max_age = chrono::Duration::from_std(self.tag.maxage).map_err(|_| {
            DrcleanError::config(format!(
                "maxage '{}' is out of range",
                humantime::format_duration(self.tag.maxage)
            ))
        })?;
        Ok(RetentionPolicy::new(max_age, self.tag.keepmin))
    }

    /// Apply environment overrides.
    ///
    /// Each option maps to its key with `.` replaced by `_`, uppercased
    /// (`tag.keepmin` -> `TAG_KEEPMIN`). Unset or empty variables are ignored.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(v) = env_value("REGISTRY_URL") {
            self.registry.url = v;
        }
        if let Some(v) = env_value("REGISTRY_USERNAME") {
            self.registry.username = v;
        }
        if let Some(v) = env_value("REGISTRY_PASSWORD") {
            self.registry.password = v;
        }
        if let Some(v) = env_value("TAG_SEPERATOR") {
            self.tag.seperator = v;
        }
        if let Some(v) = env_value("TAG_DATEFORMAT") {
            self.tag.dateformat = v;
        }
        if let Some(v) = env_value("TAG_KEEPMIN") {
            self.tag.keepmin = v.trim().parse().map_err(|_| {
                DrcleanError::config(format!("TAG_KEEPMIN must be a non-negative integer, got '{}'", v))
            })?;
        }
        if let Some(v) = env_value("TAG_MAXAGE") {
            self.tag.maxage = humantime::parse_duration(v.trim()).map_err(|e| {
                DrcleanError::config(format!("TAG_MAXAGE must be a duration like 120h, got '{}': {}", v, e))
            })?;
        }
        Ok(())
    }
}

fn env_value(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

/// Loads configuration from file, then applies environment overrides.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `drclean.toml` in current directory
/// 3. `drclean.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read or parsed, or an override is malformed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let mut config = load_config_file(config_path)?;
    config.apply_env_overrides()?;
    Ok(config)
}

fn load_config_file(config_path: Option<&str>) -> Result<Config> {
    let local = Path::new(".").join(CONFIG_FILE_NAME);
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if local.exists() {
        fs::read_to_string(local)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config: Config = toml::from_str(&config_str)?;
    Ok(config)
}
