//! The `vestibench list-models` command.

use std::path::PathBuf;

use anyhow::Result;

use vestibench_providers::create_provider;

pub fn execute(provider_filter: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let config = vestibench_providers::config::load_config_from(config_path.as_deref())?;

    let mut found_any = false;

    for (name, provider_config) in &config.providers {
        if let Some(filter) = &provider_filter {
            if name != filter {
                continue;
            }
        }

        let provider = create_provider(name, provider_config)?;
        let models = provider.available_models();

        if !models.is_empty() {
            found_any = true;
            println!("Provider: {name}");
            for model in &models {
                let cost = if model.free { "free" } else { "paid" };
                println!("  {} — {} ({cost}; {})", model.id, model.name, model.notes);
            }
            println!();
        }
    }

    if !found_any {
        println!("No providers configured. Run `vestibench init` to create a config file.");
    }

    Ok(())
}
