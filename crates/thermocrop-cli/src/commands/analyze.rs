use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use thermocrop_core::extract::format_matrix;
use thermocrop_core::io::{load_image, CropRect};
use thermocrop_core::reconstruct::{analyze_sample_reported, Region, SampleInput};

use super::AnalysisOptions;
use crate::progress::BarReporter;
use crate::summary::{print_config_summary, print_sample_result};

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Image the region refers to: the palette image, or the visual frame
    /// for the radiometric strategy
    pub image: PathBuf,

    /// Region of interest as x,y,width,height
    #[arg(long, conflicts_with = "crop", required_unless_present = "crop")]
    pub roi: Option<CropRect>,

    /// Already cropped image of the region of interest
    #[arg(long)]
    pub crop: Option<PathBuf>,

    /// Thermal image read by the radiometric extractor (defaults to IMAGE)
    #[arg(long)]
    pub thermal: Option<PathBuf>,

    /// Name to parse the sample identity from (defaults to the thermal
    /// image's filename)
    #[arg(long)]
    pub identifier: Option<String>,

    /// Write the registered temperature patch as a `;`-separated matrix
    #[arg(long)]
    pub patch_out: Option<PathBuf>,

    #[command(flatten)]
    pub options: AnalysisOptions,
}

pub fn run(args: &AnalyzeArgs) -> Result<()> {
    let config = args.options.load_config()?;
    print_config_summary(&config);

    let frame = load_image(&args.image)
        .with_context(|| format!("Failed to load image {}", args.image.display()))?;
    let region = match (&args.roi, &args.crop) {
        (Some(rect), _) => Region::Rect(*rect),
        (None, Some(path)) => Region::Image(
            load_image(path).with_context(|| format!("Failed to load crop {}", path.display()))?,
        ),
        (None, None) => anyhow::bail!("Either --roi or --crop is required"),
    };

    let thermal_path = args.thermal.clone().unwrap_or_else(|| args.image.clone());
    let identifier = args.identifier.clone().unwrap_or_else(|| {
        thermal_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    let input = SampleInput {
        identifier,
        frame,
        region,
        thermal_path,
    };

    let extractor = args.options.extractor();
    let reporter = BarReporter::new();
    let result = analyze_sample_reported(&input, &config, Some(extractor.as_ref()), &reporter)?;
    reporter.finish("Done");
    println!();

    print_sample_result(&result);

    if let Some(path) = &args.patch_out {
        match &result.patch {
            Some(patch) => {
                std::fs::write(path, format_matrix(&patch.data))
                    .with_context(|| format!("Failed to write patch to {}", path.display()))?;
                println!("Patch saved to {}", path.display());
            }
            None => println!("No patch to save: the palette strategy does not produce one"),
        }
    }

    Ok(())
}
