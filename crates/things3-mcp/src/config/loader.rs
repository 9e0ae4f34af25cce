//! Config file discovery and loading for `.things3-mcp.toml`.
//!
//! Checks two locations in precedence order:
//! 1. `./.things3-mcp.toml` (project-local)
//! 2. `~/.config/things3-mcp.toml` (user-global)

use std::path::{Path, PathBuf};

use super::{ConfigError, FileConfig};

const CONFIG_FILENAME: &str = ".things3-mcp.toml";
const GLOBAL_CONFIG_DIR: &str = ".config";
const GLOBAL_CONFIG_FILENAME: &str = "things3-mcp.toml";

/// Load the config file, or return defaults.
///
/// An explicitly named file must exist and parse. A discovered file that
/// fails to load is logged and ignored.
pub fn load_file_config(explicit: Option<&Path>) -> Result<FileConfig, ConfigError> {
    if let Some(path) = explicit {
        return read_config_file(path);
    }

    if let Some(path) = find_config_file() {
        match read_config_file(&path) {
            Ok(config) => {
                tracing::debug!(?path, "Loaded config file");
                return Ok(config);
            }
            Err(e) => {
                tracing::warn!(?path, error = %e, "Failed to load config file, using defaults");
            }
        }
    }
    Ok(FileConfig::default())
}

pub fn read_config_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Search for config file in precedence order.
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILENAME);
    if local.is_file() {
        return Some(local);
    }

    let global = home_dir()?
        .join(GLOBAL_CONFIG_DIR)
        .join(GLOBAL_CONFIG_FILENAME);
    global.is_file().then_some(global)
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}
