//! Data directory discovery and config file I/O.

use std::fs;
use std::path::{Path, PathBuf};

use crate::model::VaultConfig;

/// Error type for config I/O
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse vault.toml: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("could not serialize vault.toml: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not determine a data directory for this platform")]
    NoDataDir,
}

/// Resolve the vault data directory: an explicit `-C` override, or the
/// platform data dir (`~/.local/share/feedvault` on Linux).
pub fn data_dir(override_dir: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(dir) = override_dir {
        return Ok(dir.to_path_buf());
    }
    let base = dirs::data_dir()
        .or_else(dirs::home_dir)
        .ok_or(ConfigError::NoDataDir)?;
    Ok(base.join("feedvault"))
}

/// Load vault.toml from the data directory. A missing file yields the
/// defaults; a malformed file is an error the operator should see.
pub fn load_config(dir: &Path) -> Result<VaultConfig, ConfigError> {
    let path = dir.join("vault.toml");
    if !path.exists() {
        return Ok(VaultConfig::default());
    }
    let text = fs::read_to_string(&path).map_err(|e| ConfigError::Read {
        path: path.clone(),
        source: e,
    })?;
    Ok(toml::from_str(&text)?)
}

/// Write vault.toml to the data directory
pub fn save_config(dir: &Path, config: &VaultConfig) -> Result<(), ConfigError> {
    fs::create_dir_all(dir)?;
    let text = toml::to_string_pretty(config)?;
    fs::write(dir.join("vault.toml"), text)?;
    Ok(())
}
