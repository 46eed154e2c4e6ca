use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use thermocrop_core::error::Result as CoreResult;
use thermocrop_core::io::{load_image, CropRect};
use thermocrop_core::metadata::{pair_files, parse_identifier, MetadataConfig, SamplePair};
use thermocrop_core::pipeline::Strategy;
use thermocrop_core::reconstruct::{Region, SampleInput};
use thermocrop_core::session::{analyze_batch, AnalysisSession, SampleSource};
use tracing::debug;

use super::AnalysisOptions;
use crate::progress::BarReporter;
use crate::summary::{print_config_summary, print_results_table};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tif", "tiff", "bmp"];

#[derive(Args)]
pub struct BatchArgs {
    /// Directory of thermal (and optionally visual) images
    pub dir: PathBuf,

    /// Region of interest applied to every sample, as x,y,width,height
    #[arg(long)]
    pub roi: CropRect,

    #[command(flatten)]
    pub options: AnalysisOptions,
}

/// A thermal/visual pair whose images are decoded on a worker thread.
struct PairSource {
    pair: SamplePair,
    roi: CropRect,
    strategy: Strategy,
}

impl SampleSource for PairSource {
    fn identifier(&self) -> String {
        self.pair.identity.metadata().source_filename().to_string()
    }

    fn load(&self) -> CoreResult<SampleInput> {
        let frame_path = match self.strategy {
            Strategy::Palette => &self.pair.thermal,
            Strategy::Radiometric => self.pair.visual.as_ref().unwrap_or(&self.pair.thermal),
        };
        Ok(SampleInput {
            identifier: self.identifier(),
            frame: load_image(frame_path)?,
            region: Region::Rect(self.roi),
            thermal_path: self.pair.thermal.clone(),
        })
    }
}

fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?
    {
        let path = entry?.path();
        let is_image = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
        if is_image {
            files.push(path);
        } else {
            debug!(path = %path.display(), "Skipping non-image file");
        }
    }
    files.sort();
    Ok(files)
}

/// Pair files by kind token; without any kind tokens every image is its own
/// thermal sample.
fn collect_pairs(files: &[PathBuf], metadata: &MetadataConfig) -> Vec<SamplePair> {
    let pairs = pair_files(files, metadata);
    if !pairs.is_empty() {
        return pairs;
    }
    files
        .iter()
        .map(|path| {
            let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
            let identity = parse_identifier(&name.unwrap_or_default(), metadata);
            SamplePair {
                key: identity.pairing_key(metadata),
                identity,
                thermal: path.clone(),
                visual: None,
            }
        })
        .collect()
}

pub fn run(args: &BatchArgs) -> Result<()> {
    let config = args.options.load_config()?;
    print_config_summary(&config);

    let files = list_images(&args.dir)?;
    let sources: Vec<PairSource> = collect_pairs(&files, &config.metadata)
        .into_iter()
        .map(|pair| PairSource {
            pair,
            roi: args.roi,
            strategy: config.strategy,
        })
        .collect();
    if sources.is_empty() {
        anyhow::bail!("No images found in {}", args.dir.display());
    }
    println!("  {} sample(s) in {}", sources.len(), args.dir.display());

    let extractor = args.options.extractor();
    let reporter = Arc::new(BarReporter::new());
    let outcome = analyze_batch(&sources, &config, Some(extractor.as_ref()), reporter.clone());
    reporter.finish("Done");

    let mut session = AnalysisSession::new();
    session.extend(outcome.results);
    print_results_table(session.results(), &outcome.failures);

    Ok(())
}
