//! Application configuration for tabxml.
//!
//! User config lives at `~/.tabxml/tabxml.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TabXmlError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "tabxml.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".tabxml";

// ---------------------------------------------------------------------------
// Config structs (matching tabxml.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Conversion defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default column delimiter for the table converter.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Default number of leading rows to skip.
    #[serde(default)]
    pub skip: usize,

    /// Whether element output is indented by default.
    #[serde(default)]
    pub indent: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            skip: 0,
            indent: false,
        }
    }
}

fn default_delimiter() -> String {
    "\t".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.tabxml/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| TabXmlError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.tabxml/tabxml.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| TabXmlError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| TabXmlError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| TabXmlError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| TabXmlError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| TabXmlError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
