//! Per-sample temperature reconstruction.
//!
//! Both strategies end in the same place: a temperature grid the size of the
//! crop, a mask over it, and masked statistics.
//!
//! - Palette: crop -> segmentation -> pixel model -> statistics.
//! - Radiometric: extractor -> registration onto the crop -> statistics,
//!   optionally restricted to the crop's foreground.

use std::path::PathBuf;

use ndarray::Array2;
use tracing::info;

use crate::calibration::{hue_to_temp, intensity_to_temp, PixelModel, ResolvedScale};
use crate::error::{Result, ThermoError};
use crate::extract::RadiometricExtractor;
use crate::frame::{AlignedThermalPatch, PixelGrid};
use crate::io::{crop_grid, CropRect};
use crate::metadata::{parse_identifier, SampleIdentity};
use crate::pipeline::{AnalysisConfig, NoOpReporter, PipelineStage, ProgressReporter, Strategy};
use crate::registration::register;
use crate::segmentation::{segment_region, SegmentationOutcome};
use crate::stats::{aggregate, aggregate_masked, Population, StatsRecord};

/// Where the region of interest comes from.
#[derive(Clone, Debug)]
pub enum Region {
    /// A rectangle in the frame's pixel space.
    Rect(CropRect),
    /// An already cropped image, located by matching when needed.
    Image(PixelGrid),
}

/// Everything needed to analyze one sample.
#[derive(Clone, Debug)]
pub struct SampleInput {
    /// Filename the sample identity is parsed from.
    pub identifier: String,
    /// Image the region refers to: the palette image for the palette
    /// strategy, the visual frame for the radiometric one.
    pub frame: PixelGrid,
    pub region: Region,
    /// Thermal image handed to the radiometric extractor.
    pub thermal_path: PathBuf,
}

impl SampleInput {
    /// The cropped region as an image.
    pub fn crop(&self) -> Result<PixelGrid> {
        match &self.region {
            Region::Rect(rect) => crop_grid(&self.frame, rect),
            Region::Image(grid) => Ok(grid.clone()),
        }
    }
}

/// Outcome of analyzing one sample.
#[derive(Clone, Debug)]
pub struct SampleResult {
    pub identity: SampleIdentity,
    pub strategy: Strategy,
    pub stats: StatsRecord,
    pub population: Population,
    /// `None` when no segmentation ran (radiometric without `segment_patch`).
    pub segmentation: Option<SegmentationOutcome>,
    /// Palette strategy only.
    pub pixel_model: Option<PixelModel>,
    /// Palette strategy only.
    pub scale: Option<ResolvedScale>,
    /// Radiometric strategy only.
    pub patch: Option<AlignedThermalPatch>,
}

/// Analyze one sample with the configured strategy.
///
/// `extractor` is only consulted by the radiometric strategy, which fails
/// with [`ThermoError::Extraction`] when none is given.
pub fn analyze_sample(
    input: &SampleInput,
    config: &AnalysisConfig,
    extractor: Option<&dyn RadiometricExtractor>,
) -> Result<SampleResult> {
    analyze_sample_reported(input, config, extractor, &NoOpReporter)
}

/// Like [`analyze_sample`], reporting each stage.
pub fn analyze_sample_reported(
    input: &SampleInput,
    config: &AnalysisConfig,
    extractor: Option<&dyn RadiometricExtractor>,
    reporter: &dyn ProgressReporter,
) -> Result<SampleResult> {
    let identity = parse_identifier(&input.identifier, &config.metadata);
    let result = match config.strategy {
        Strategy::Palette => palette_sample(input, identity, config, reporter)?,
        Strategy::Radiometric => {
            let extractor = extractor.ok_or_else(|| {
                ThermoError::Extraction("no radiometric extractor configured".into())
            })?;
            radiometric_sample(input, identity, config, extractor, reporter)?
        }
    };

    info!(
        sample = %input.identifier,
        strategy = %result.strategy,
        mean = result.stats.mean,
        max = result.stats.max,
        min = result.stats.min,
        pixels = result.stats.pixel_count,
        "Sample analyzed"
    );
    Ok(result)
}

fn palette_sample(
    input: &SampleInput,
    identity: SampleIdentity,
    config: &AnalysisConfig,
    reporter: &dyn ProgressReporter,
) -> Result<SampleResult> {
    let crop = input.crop()?;

    reporter.begin_stage(PipelineStage::Segmentation, None);
    let segmentation = segment_region(&crop, &config.segmentation)?;
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::Calibration, None);
    let model = config.palette.model.resolve(crop.is_color());
    let resolved = config
        .calibration
        .table_for(config.palette.table, model)
        .resolve(identity.metadata().ambient_preset());
    let temps = palette_temperatures(&crop, model, &resolved);
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::Aggregation, None);
    let (stats, population) = aggregate_masked(
        &temps,
        &segmentation.mask,
        config.segmentation.min_foreground,
    )?;
    reporter.finish_stage();

    Ok(SampleResult {
        identity,
        strategy: Strategy::Palette,
        stats,
        population,
        segmentation: Some(segmentation.outcome),
        pixel_model: Some(model),
        scale: Some(resolved),
        patch: None,
    })
}

fn palette_temperatures(
    crop: &PixelGrid,
    model: PixelModel,
    resolved: &ResolvedScale,
) -> Array2<f64> {
    let scale = &resolved.scale;
    match (model, crop) {
        (PixelModel::HueInversion, PixelGrid::Color(color)) => {
            color.hue().mapv(|h| hue_to_temp(h, scale))
        }
        _ => crop
            .to_intensity()
            .data
            .mapv(|v| intensity_to_temp(v, scale)),
    }
}

fn radiometric_sample(
    input: &SampleInput,
    identity: SampleIdentity,
    config: &AnalysisConfig,
    extractor: &dyn RadiometricExtractor,
    reporter: &dyn ProgressReporter,
) -> Result<SampleResult> {
    let crop = input.crop()?;

    reporter.begin_stage(PipelineStage::Extraction, None);
    let raw = extractor.extract(&input.thermal_path)?;
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::Registration, None);
    let patch = register(&raw, &input.frame, &crop, &config.registration)?;
    reporter.finish_stage();

    let segmentation = if config.radiometric.segment_patch {
        reporter.begin_stage(PipelineStage::Segmentation, None);
        let seg = segment_region(&crop, &config.segmentation)?;
        reporter.finish_stage();
        Some(seg)
    } else {
        None
    };

    reporter.begin_stage(PipelineStage::Aggregation, None);
    let (stats, population) = match &segmentation {
        Some(seg) => aggregate_masked(&patch.data, &seg.mask, config.segmentation.min_foreground)?,
        None => (aggregate(patch.data.iter().copied())?, Population::FullRegion),
    };
    reporter.finish_stage();

    Ok(SampleResult {
        identity,
        strategy: Strategy::Radiometric,
        stats,
        population,
        segmentation: segmentation.map(|s| s.outcome),
        pixel_model: None,
        scale: None,
        patch: Some(patch),
    })
}
