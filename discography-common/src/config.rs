//! Configuration loading and root folder resolution
//!
//! Every setting follows the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing TOML file is never an error. A malformed one is logged and ignored
//! so that a bad edit cannot keep a service from starting.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "DISCOGRAPHY_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "discography.db";

/// Settings readable from `config.toml`
///
/// All fields are optional; absent fields fall through to compiled defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub regional_api_url: Option<String>,
    pub bind_address: Option<String>,
    pub sync_interval_secs: Option<u64>,
    pub admin_secret: Option<i64>,
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse TOML config content
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Load the platform config file, falling back to an empty config
    ///
    /// A file that exists but cannot be used is returned alongside the empty
    /// config so the caller can report it once logging is running.
    pub fn load_or_default() -> (Self, Option<RejectedConfig>) {
        match config_file_path() {
            Some(path) => Self::load_lenient(&path),
            None => (Self::default(), None),
        }
    }

    /// Load `path`, substituting an empty config when it is unusable
    pub fn load_lenient(path: &Path) -> (Self, Option<RejectedConfig>) {
        match Self::load(path) {
            Ok(config) => (config, None),
            Err(error) => (
                Self::default(),
                Some(RejectedConfig {
                    path: path.to_path_buf(),
                    error,
                }),
            ),
        }
    }
}

/// Config file that was found but ignored
#[derive(Debug)]
pub struct RejectedConfig {
    pub path: PathBuf,
    pub error: Error,
}

impl std::fmt::Display for RejectedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ignoring config file {}: {}", self.path.display(), self.error)
    }
}

/// Locate the config file for this platform
///
/// On Linux the user file (`~/.config/discography/config.toml`) wins over the
/// system file (`/etc/discography/config.toml`).
pub fn config_file_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("discography").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/discography/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Get OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/discography (or /var/lib/discography for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("discography"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/discography"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("discography"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/discography"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("discography"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\discography"))
    } else {
        PathBuf::from("./discography_data")
    }
}

/// Resolves the root folder from CLI, environment, TOML and compiled default
#[derive(Debug, Clone, Default)]
pub struct RootFolderResolver {
    cli_arg: Option<PathBuf>,
    toml_value: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(cli_arg: Option<PathBuf>, toml_config: &TomlConfig) -> Self {
        Self {
            cli_arg,
            toml_value: toml_config.root_folder.clone(),
        }
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &self.toml_value {
            return path.clone();
        }

        default_root_folder()
    }
}

/// Creates the root folder and locates the database inside it
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            debug!("Created root folder: {}", self.root_folder.display());
        }
        Ok(())
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }
}
