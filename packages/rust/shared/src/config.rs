//! Application configuration for mdreader.
//!
//! User config lives at `~/.mdreader/mdreader.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MdReaderError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "mdreader.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".mdreader";

// ---------------------------------------------------------------------------
// Config structs (matching mdreader.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Reader behavior.
    #[serde(default)]
    pub reader: ReaderConfig,
}

/// `[reader]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Return each file as one document instead of one per header section.
    #[serde(default)]
    pub read_as_single_doc: bool,

    /// Replace `[text](url)` links with their text.
    #[serde(default = "default_true")]
    pub remove_hyperlinks: bool,

    /// Drop `![[...]]` image embeds.
    #[serde(default = "default_true")]
    pub remove_images: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            read_as_single_doc: false,
            remove_hyperlinks: true,
            remove_images: true,
        }
    }
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.mdreader/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| MdReaderError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.mdreader/mdreader.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| MdReaderError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| MdReaderError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    init_config_in(&config_dir()?)
}

/// Write a default config file into `dir`, creating it if needed.
pub fn init_config_in(dir: &Path) -> Result<PathBuf> {
    let path = dir.join(CONFIG_FILE_NAME);
    write_default_config(&path)?;
    Ok(path)
}

/// Write a default config to `path`, replacing whatever is there.
///
/// The existing file is never parsed, so this also repairs a malformed config.
pub fn write_default_config(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| MdReaderError::io(dir, e))?;
    }

    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| MdReaderError::config(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| MdReaderError::io(path, e))?;
    tracing::info!(?path, "wrote default config file");

    Ok(())
}
