//! Config Command
//!
//! Show, locate and initialize configuration files.

use crate::config::ConfigLoader;
use crate::types::Result;

pub fn show(format: &str) -> Result<()> {
    ConfigLoader::show_config(format == "json")
}

pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

pub fn init(global: bool, force: bool) -> Result<()> {
    if global {
        let dir = ConfigLoader::init_global(force)?;
        println!("✓ Global config initialized in {}", dir.display());
    } else {
        let dir = ConfigLoader::init_project(force)?;
        println!("✓ Project config initialized in {}", dir.display());
    }
    Ok(())
}
