//! Configuration loading and data-root resolution

use crate::{Error, Result};
use std::path::PathBuf;

/// Optional TOML configuration file contents
///
/// Looked up at `~/.config/agrec/config.toml` (or `/etc/agrec/config.toml`
/// on Linux). Every field can also be supplied by CLI flag or environment
/// variable, which take priority.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct TomlConfig {
    pub data_root: Option<String>,
    pub source_db: Option<String>,
    pub port: Option<u16>,
}

/// Load the TOML config file if one exists, otherwise defaults
pub fn load_toml_config() -> TomlConfig {
    match find_config_file() {
        Ok(path) => match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Ignoring malformed config file {:?}: {}", path, e);
                    TomlConfig::default()
                }
            },
            Err(_) => TomlConfig::default(),
        },
        Err(_) => TomlConfig::default(),
    }
}

/// Data-root resolution following the priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_data_root(cli_arg: Option<&str>, env_var_name: &str) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        return PathBuf::from(path);
    }

    // Priority 3: TOML config file
    if let Some(root) = load_toml_config().data_root {
        return PathBuf::from(root);
    }

    // Priority 4: OS-dependent compiled default
    get_default_data_root()
}

/// Get default configuration file path for the platform
fn find_config_file() -> Result<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("agrec").join("config.toml"));

    if let Some(path) = user_config {
        if path.exists() {
            return Ok(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/agrec/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
    }

    Err(Error::Config("No config file found".to_string()))
}

/// Get OS-dependent default data root path
fn get_default_data_root() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("agrec"))
        .unwrap_or_else(|| PathBuf::from("./agrec_data"))
}

/// Ensures the data root exists before the artifact store touches it
pub struct DataRootInitializer {
    root: PathBuf,
}

impl DataRootInitializer {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Create the data-root directory (and parents) if missing
    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        Ok(())
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}
