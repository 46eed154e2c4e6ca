use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use console::Style;
use thermocrop_core::metadata::{parse_identifier, ImageKind, MetadataConfig};

use super::load_config_file;

#[derive(Args)]
pub struct ParseArgs {
    /// Image filenames (or paths)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Analysis config file (TOML); only the metadata section is used
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: &ParseArgs) -> Result<()> {
    let metadata = match &args.config {
        Some(path) => load_config_file(path)?.metadata,
        None => MetadataConfig::default(),
    };
    let fallback = Style::new().yellow();

    println!(
        "{:<40}  {:<10}  {:<8}  {:<12}  {:<8}  {:<6}  {:<8}",
        "File", "Plant", "Ambient", "Treatment", "Period", "Rep", "Kind"
    );
    println!("{}", "-".repeat(102));

    let mut fallbacks = 0usize;
    for file in &args.files {
        let identity = parse_identifier(&file.to_string_lossy(), &metadata);
        let m = identity.metadata();
        let kind = match m.image_kind() {
            Some(ImageKind::Thermal) => "thermal".to_string(),
            Some(ImageKind::Visual) => "visual".to_string(),
            Some(ImageKind::Other(token)) => token.clone(),
            None => "-".to_string(),
        };
        let line = format!(
            "{:<40}  {:<10}  {:<8}  {:<12}  {:<8}  {:<6}  {:<8}",
            m.source_filename(),
            m.plant_id(),
            m.ambient_preset(),
            m.treatment(),
            m.period(),
            m.replicate(),
            kind
        );
        if identity.is_fallback() {
            fallbacks += 1;
            println!("{}", fallback.apply_to(line));
        } else {
            println!("{line}");
        }
    }

    if fallbacks > 0 {
        println!(
            "\n{}",
            fallback.apply_to(format!(
                "{fallbacks} filename(s) did not match Plant_Ambient_Treatment_Period_Replicate"
            ))
        );
    }

    Ok(())
}
