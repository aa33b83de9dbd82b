//! Init command - create the default configuration file.

use kymobutler::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Run the init command.
pub fn run() -> Result<(), CliError> {
    let path = config_file_path();
    if path.exists() {
        println!("Configuration already exists at {}", path.display());
        return Ok(());
    }

    let path = ConfigFile::ensure_exists()?;
    println!("Created {}", path.display());
    println!();
    println!("Next, set the service URL:");
    println!("  kymobutler config set service.url <URL>");
    Ok(())
}
