//! Rank Command
//!
//! Scores repository quality signals without touching any LLM backend.

use std::path::Path;

use crate::cli::output::Output;
use crate::config::ConfigLoader;
use crate::context::RepositoryContext;
use crate::rank::QualityFeatures;
use crate::types::{ForgeError, Result};

pub fn run(path: &Path, format: &str) -> Result<()> {
    let config = ConfigLoader::load()?;
    let ctx = RepositoryContext::read(&config, path)?;
    let features = QualityFeatures::from_tree(&ctx.tree);

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&features)?),
        "text" => {
            let out = Output::new();
            out.section(&format!("Quality report: {}", ctx.metadata.name));
            println!("{}", features.report());
        }
        _ => {
            return Err(ForgeError::Config(format!(
                "Unknown format '{}'. Valid values: text, json",
                format
            )));
        }
    }

    Ok(())
}
