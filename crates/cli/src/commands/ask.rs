//! `colloquy ask` — resolve a single utterance.

use std::path::Path;

use super::{build_engine, load_config};

pub async fn run(
    config_path: Option<&Path>,
    utterance: &str,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = build_engine(load_config(config_path)?)?;
    let mut session = engine.new_session();

    let response = engine.execute(&mut session, utterance).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("{response}");
    }
    Ok(())
}
