//! Configuration file support.
//!
//! Settings live in an INI file under the user's configuration directory,
//! by default `~/.config/ghinstall/config.ini`:
//!
//! ```ini
//! [github]
//! host = github.com
//! token =
//!
//! [install]
//! repos = @CRAN@
//! library =
//! dependencies = Depends, Imports
//! build_args =
//! build_docs = true
//! install_type =
//!
//! [general]
//! temp_dir =
//! ```
//!
//! Every key is optional; missing keys fall back to the defaults. CLI
//! arguments override values read here.

mod keys;

use std::fs;
use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

use crate::builder::split_build_args;
use crate::manager::InstallOptions;
use crate::reference::DEFAULT_HOST;
use crate::runtime::DependencyKind;

pub use keys::ConfigKey;

/// Directory name under the platform configuration directory.
const CONFIG_DIR_NAME: &str = "ghinstall";

/// Configuration file name.
const CONFIG_FILE_NAME: &str = "config.ini";

/// Errors reading or writing the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    #[error("failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),
}

/// `[github]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubSettings {
    /// Hosting service hostname.
    pub host: String,
    /// Access token for private repositories.
    pub token: Option<String>,
}

impl Default for GithubSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            token: None,
        }
    }
}

/// `[install]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallSettings {
    /// Package sources searched after the staging repository.
    pub repos: Vec<String>,
    /// Target library.
    pub library: Option<PathBuf>,
    /// Dependency categories to install.
    pub dependencies: Vec<DependencyKind>,
    /// Build tool flags, whitespace separated.
    pub build_args: String,
    /// Whether to build documentation.
    pub build_docs: bool,
    /// Installer `type` argument.
    pub install_type: Option<String>,
}

impl Default for InstallSettings {
    fn default() -> Self {
        Self {
            repos: Vec::new(),
            library: None,
            dependencies: DependencyKind::defaults(),
            build_args: String::new(),
            build_docs: true,
            install_type: None,
        }
    }
}

/// `[general]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneralSettings {
    /// Parent directory for scratch space.
    pub temp_dir: Option<PathBuf>,
}

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub github: GithubSettings,
    pub install: InstallSettings,
    pub general: GeneralSettings,
}

/// Default location of the configuration file.
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
        .join(CONFIG_FILE_NAME)
}

impl ConfigFile {
    /// Load from the default location, or defaults if the file is absent.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load from a specific file, or defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_ini(&ini)
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Save to a specific file, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        self.to_ini()
            .write_to_file(path)
            .map_err(|e| ConfigError::Write {
                path: path.to_path_buf(),
                source: e,
            })
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        for key in ConfigKey::all() {
            let value = ini
                .section(Some(key.section()))
                .and_then(|section| section.get(key.key_name()));
            if let Some(value) = value {
                key.set(&mut config, value)?;
            }
        }
        Ok(config)
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            ini.with_section(Some(key.section()))
                .set(key.key_name(), key.get(self));
        }
        ini
    }

    /// Install options seeded from this file.
    pub fn install_options(&self) -> InstallOptions {
        let mut options = InstallOptions::new()
            .with_host(self.github.host.clone())
            .with_build_args(split_build_args(&self.install.build_args))
            .with_build_docs(self.install.build_docs)
            .with_dependencies(self.install.dependencies.clone());

        for repo in &self.install.repos {
            options = options.with_package_source(repo.clone());
        }
        if let Some(library) = &self.install.library {
            options = options.with_library(library.clone());
        }
        if let Some(install_type) = &self.install.install_type {
            options = options.with_install_type(install_type.clone());
        }
        if let Some(temp_dir) = &self.general.temp_dir {
            options = options.with_temp_dir(temp_dir.clone());
        }
        options
    }
}
