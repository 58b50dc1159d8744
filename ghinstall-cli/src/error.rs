//! CLI error type.

use std::error::Error;
use std::fmt;

use console::style;
use ghinstall::config::ConfigError;
use ghinstall::manager::InstallError;
use ghinstall::reference::ReferenceError;

/// Errors surfaced to the user by a command.
#[derive(Debug)]
pub enum CliError {
    /// Bad or missing configuration.
    Config(String),
    /// Reading or writing the configuration file failed.
    ConfigFile(ConfigError),
    /// A reference did not parse.
    Reference(ReferenceError),
    /// The install run failed.
    Install(InstallError),
    /// Output could not be serialized.
    Json(serde_json::Error),
}

impl CliError {
    /// Print the error and its source chain to stderr.
    pub fn report(&self) {
        eprintln!("{} {}", style("error:").red().bold(), self);
        let mut source = self.source();
        while let Some(cause) = source {
            eprintln!("  {} {}", style("caused by:").dim(), cause);
            source = cause.source();
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "{}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::Reference(e) => write!(f, "{}", e),
            CliError::Install(e) => write!(f, "{}", e),
            CliError::Json(e) => write!(f, "failed to write JSON: {}", e),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CliError::Config(_) => None,
            CliError::ConfigFile(e) => e.source(),
            CliError::Reference(e) => e.source(),
            CliError::Install(e) => e.source(),
            CliError::Json(e) => Some(e),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<ReferenceError> for CliError {
    fn from(e: ReferenceError) -> Self {
        CliError::Reference(e)
    }
}

impl From<InstallError> for CliError {
    fn from(e: InstallError) -> Self {
        CliError::Install(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}
