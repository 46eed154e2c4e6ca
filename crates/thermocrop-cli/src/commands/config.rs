use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use thermocrop_core::pipeline::AnalysisConfig;

use super::load_config_file;
use crate::summary::print_config_summary;

#[derive(Args)]
pub struct ConfigArgs {
    /// Write the default config to a file instead of stdout
    #[arg(short, long, conflicts_with = "check")]
    pub output: Option<PathBuf>,

    /// Validate a config file and show the settings it resolves to
    #[arg(long)]
    pub check: Option<PathBuf>,
}

pub fn run(args: &ConfigArgs) -> Result<()> {
    if let Some(path) = &args.check {
        let config = load_config_file(path)?;
        print_config_summary(&config);
        if config == AnalysisConfig::default() {
            println!("  {} matches the defaults", path.display());
        } else {
            println!("  {} is valid", path.display());
        }
        return Ok(());
    }

    let defaults = toml::to_string_pretty(&AnalysisConfig::default())
        .context("Failed to serialize the default config")?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, &defaults)
                .with_context(|| format!("Failed to write config to {}", path.display()))?;
            println!("Default config saved to {}", path.display());
        }
        None => print!("{defaults}"),
    }

    Ok(())
}
