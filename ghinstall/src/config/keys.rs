//! Addressable configuration keys (`section.key`).

use std::path::PathBuf;
use std::str::FromStr;

use super::{ConfigError, ConfigFile};
use crate::runtime::DependencyKind;

/// A single setting in the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    GithubHost,
    GithubToken,
    InstallRepos,
    InstallLibrary,
    InstallDependencies,
    InstallBuildArgs,
    InstallBuildDocs,
    InstallType,
    GeneralTempDir,
}

impl ConfigKey {
    /// Every key, in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::GithubHost,
            ConfigKey::GithubToken,
            ConfigKey::InstallRepos,
            ConfigKey::InstallLibrary,
            ConfigKey::InstallDependencies,
            ConfigKey::InstallBuildArgs,
            ConfigKey::InstallBuildDocs,
            ConfigKey::InstallType,
            ConfigKey::GeneralTempDir,
        ]
    }

    /// INI section holding the key.
    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::GithubHost | ConfigKey::GithubToken => "github",
            ConfigKey::GeneralTempDir => "general",
            _ => "install",
        }
    }

    /// Key name inside its section.
    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::GithubHost => "host",
            ConfigKey::GithubToken => "token",
            ConfigKey::InstallRepos => "repos",
            ConfigKey::InstallLibrary => "library",
            ConfigKey::InstallDependencies => "dependencies",
            ConfigKey::InstallBuildArgs => "build_args",
            ConfigKey::InstallBuildDocs => "build_docs",
            ConfigKey::InstallType => "install_type",
            ConfigKey::GeneralTempDir => "temp_dir",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as written to the file. Unset values are empty.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::GithubHost => config.github.host.clone(),
            ConfigKey::GithubToken => config.github.token.clone().unwrap_or_default(),
            ConfigKey::InstallRepos => config.install.repos.join(", "),
            ConfigKey::InstallLibrary => path_value(&config.install.library),
            ConfigKey::InstallDependencies => config
                .install
                .dependencies
                .iter()
                .map(|k| k.field_name())
                .collect::<Vec<_>>()
                .join(", "),
            ConfigKey::InstallBuildArgs => config.install.build_args.clone(),
            ConfigKey::InstallBuildDocs => config.install.build_docs.to_string(),
            ConfigKey::InstallType => config.install.install_type.clone().unwrap_or_default(),
            ConfigKey::GeneralTempDir => path_value(&config.general.temp_dir),
        }
    }

    /// Parse and store a value. An empty value resets optional settings.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match self {
            ConfigKey::GithubHost => {
                if value.is_empty() {
                    return Err(self.invalid(value, "host cannot be empty"));
                }
                config.github.host = value.to_string();
            }
            ConfigKey::GithubToken => config.github.token = optional(value),
            ConfigKey::InstallRepos => config.install.repos = split_list(value),
            ConfigKey::InstallLibrary => config.install.library = optional(value).map(PathBuf::from),
            ConfigKey::InstallDependencies => {
                config.install.dependencies = split_list(value)
                    .iter()
                    .map(|kind| kind.parse::<DependencyKind>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|reason| self.invalid(value, &reason))?;
            }
            ConfigKey::InstallBuildArgs => config.install.build_args = value.to_string(),
            ConfigKey::InstallBuildDocs => {
                config.install.build_docs = parse_bool(value)
                    .ok_or_else(|| self.invalid(value, "expected true or false"))?;
            }
            ConfigKey::InstallType => config.install.install_type = optional(value),
            ConfigKey::GeneralTempDir => config.general.temp_dir = optional(value).map(PathBuf::from),
        }
        Ok(())
    }

    fn invalid(&self, value: &str, reason: &str) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn path_value(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default()
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}
