//! Init command - initialize configuration file.

use ghinstall::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Run the init command.
pub fn run() -> Result<(), CliError> {
    let path = config_file_path();

    // Keep existing settings, fill in the rest
    let config = if path.exists() {
        println!("Updating existing configuration.");
        ConfigFile::load()?
    } else {
        ConfigFile::default()
    };
    config.save()?;

    println!("Configuration file: {}", path.display());
    println!();
    println!("Edit this file to customize ghinstall settings.");
    println!("CLI arguments override config file values when specified.");
    Ok(())
}
