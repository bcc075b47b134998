//! Configuration-directory context for shaker.
//!
//! Every component that touches durable state receives a `ConfigContext`
//! rather than consulting globals. The context resolves the configuration
//! directory once per invocation, in this order:
//!
//! 1. The `--config-dir` flag
//! 2. The `SHAKER_CONFIG_DIR` environment variable
//! 3. `~/.shaker`
//!
//! Profiles live under `<config_dir>/profile/`, user-data templates under
//! `<config_dir>/templates/`, and the invocation log at
//! `<config_dir>/shaker.log`.

use crate::error::{Result, ShakerError};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable consulted when no `--config-dir` flag is given.
pub const CONFIG_DIR_ENV: &str = "SHAKER_CONFIG_DIR";

/// Fallback directory name under the user's home directory.
pub const DEFAULT_CONFIG_DIR_NAME: &str = ".shaker";

/// Resolved paths for one shaker invocation.
///
/// All paths are derived from the resolved config directory. The directory
/// itself is created eagerly; subdirectories are created by the components
/// that own them.
#[derive(Debug, Clone)]
pub struct ConfigContext {
    /// Absolute path to the configuration directory.
    pub config_dir: PathBuf,
}

impl ConfigContext {
    /// Resolve the config directory from flag, environment, or home fallback.
    ///
    /// Creates the directory if it does not exist. Failure to create it is
    /// one of the few conditions allowed to abort the invocation.
    pub fn resolve(flag: Option<&Path>) -> Result<Self> {
        let config_dir = if let Some(dir) = flag {
            dir.to_path_buf()
        } else if let Some(dir) = env::var_os(CONFIG_DIR_ENV).filter(|v| !v.is_empty()) {
            PathBuf::from(dir)
        } else {
            let home = dirs::home_dir().ok_or_else(|| {
                ShakerError::UserError(
                    "cannot determine home directory; pass --config-dir or set SHAKER_CONFIG_DIR"
                        .to_string(),
                )
            })?;
            home.join(DEFAULT_CONFIG_DIR_NAME)
        };

        if !config_dir.is_dir() {
            fs::create_dir_all(&config_dir).map_err(|e| {
                ShakerError::UserError(format!(
                    "failed to create config directory '{}': {}",
                    config_dir.display(),
                    e
                ))
            })?;
        }

        Ok(Self { config_dir })
    }

    /// Directory holding persisted profiles.
    pub fn profile_dir(&self) -> PathBuf {
        self.config_dir.join("profile")
    }

    /// Path to a named profile file.
    pub fn profile_path(&self, name: &str) -> PathBuf {
        self.profile_dir().join(name)
    }

    /// Directory holding user-data templates.
    pub fn template_dir(&self) -> PathBuf {
        self.config_dir.join("templates")
    }

    /// Path to the invocation log file.
    pub fn log_path(&self) -> PathBuf {
        self.config_dir.join("shaker.log")
    }
}
