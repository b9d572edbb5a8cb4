//! `colloquy intents` — list the registered intents.

use std::path::Path;

use colloquy_core::intent::{EntityType, Extraction};

use super::{build_engine, load_config};

pub fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let engine = build_engine(load_config(config_path)?)?;

    println!();
    for intent in engine.registry().iter() {
        println!("  {:<10} {}", intent.id, intent.label);
        for param in &intent.parameters {
            let need = if param.required { "required" } else { "optional" };
            let entity = match &param.extraction {
                Extraction::ByEntityType(EntityType::Any) => "any",
                Extraction::ByEntityType(t) => t.entity_kind().map(|k| k.as_str()).unwrap_or("any"),
                Extraction::Custom(_) => "custom",
            };
            println!("  {:<10}   - {} ({entity}, {need})", "", param.name);
        }
        for ctx in &intent.output_contexts {
            println!("  {:<10}   > {} for {} turn(s)", "", ctx.name, ctx.lifespan);
        }
        for fu in &intent.follow_ups {
            println!(
                "  {:<10}   ~ {} when '{}' is active: {}",
                "",
                fu.name,
                fu.requires_context,
                fu.trigger_words.join(", ")
            );
        }
    }
    println!();
    Ok(())
}
