//! Config command - view and change settings from the command line.

use clap::Subcommand;
use console::style;
use ghinstall::config::{config_file_path, ConfigFile, ConfigKey};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print one value
    Get {
        /// Key as section.key (e.g. install.repos)
        key: String,
    },

    /// Change one value; an empty value resets optional settings
    Set {
        /// Key as section.key (e.g. install.repos)
        key: String,

        /// New value
        value: String,
    },

    /// Print every setting
    List,

    /// Print the configuration file location
    Path,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => {
            let key = parse_key(&key)?;
            let config = ConfigFile::load()?;
            println!("{}", display_value(key, &config));
        }
        ConfigCommands::Set { key, value } => {
            let key = parse_key(&key)?;
            let mut config = ConfigFile::load()?;
            key.set(&mut config, &value)?;
            config.save()?;
            println!("{} = {}", key.name(), display_value(key, &config));
        }
        ConfigCommands::List => {
            let config = ConfigFile::load()?;
            let mut section = "";
            for key in ConfigKey::all() {
                if key.section() != section {
                    if !section.is_empty() {
                        println!();
                    }
                    section = key.section();
                    println!("{}", style(format!("[{}]", section)).bold());
                }
                println!("  {} = {}", key.key_name(), display_value(*key, &config));
            }
        }
        ConfigCommands::Path => println!("{}", config_file_path().display()),
    }
    Ok(())
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "Unknown configuration key '{}'. Use 'ghinstall config list' to see available keys.",
            key
        ))
    })
}

/// Value for display; secrets are masked and unset values marked.
fn display_value(key: ConfigKey, config: &ConfigFile) -> String {
    let value = key.get(config);
    if value.is_empty() {
        "(not set)".to_string()
    } else if key == ConfigKey::GithubToken {
        mask_secret(&value)
    } else {
        value
    }
}

fn mask_secret(value: &str) -> String {
    let visible: String = value.chars().take(4).collect();
    format!("{}****", visible)
}
