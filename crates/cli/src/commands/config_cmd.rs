//! `colloquy config` — show the engine configuration.

use std::path::Path;

use colloquy_config::EngineConfig;

use super::load_config;

pub fn run(config_path: Option<&Path>, defaults: bool) -> Result<(), Box<dyn std::error::Error>> {
    if defaults {
        print!("{}", EngineConfig::default_toml());
        return Ok(());
    }

    // Loading validates; errors surface here.
    let config = load_config(config_path)?;
    println!("# Effective configuration (valid)");
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
