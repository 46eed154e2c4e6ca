mod common;

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use approx::assert_abs_diff_eq;
use ndarray::s;

use thermocrop_core::calibration::PixelModel;
use thermocrop_core::error::ThermoError;
use thermocrop_core::extract::InMemoryExtractor;
use thermocrop_core::filters::ClaheConfig;
use thermocrop_core::frame::PixelGrid;
use thermocrop_core::io::{crop_frame, CropRect};
use thermocrop_core::pipeline::{
    AnalysisConfig, NoOpReporter, PaletteModel, PipelineStage, ProgressReporter, Strategy,
};
use thermocrop_core::reconstruct::{analyze_sample, analyze_sample_reported, Region, SampleInput};
use thermocrop_core::segmentation::{SegmentationConfig, SegmentationOutcome};
use thermocrop_core::session::{analyze_batch, AnalysisSession};
use thermocrop_core::stats::{aggregate, Population};

use common::{gray, patterned_frame, square_frame, thermal_field, uniform_color, uniform_frame};

const THERMAL_21: &str = "P01_21_Controle_Dia_R1_thermal.jpg";
const THERMAL_27: &str = "P01_27_Controle_Dia_R1_thermal.jpg";

fn palette_input(identifier: &str, frame: PixelGrid, rect: CropRect) -> SampleInput {
    SampleInput {
        identifier: identifier.into(),
        frame,
        region: Region::Rect(rect),
        thermal_path: PathBuf::from(identifier),
    }
}

fn palette_config() -> AnalysisConfig {
    AnalysisConfig {
        segmentation: SegmentationConfig {
            contrast: ClaheConfig::disabled(),
            ..SegmentationConfig::default()
        },
        ..AnalysisConfig::default()
    }
}

fn radiometric_config() -> AnalysisConfig {
    AnalysisConfig {
        strategy: Strategy::Radiometric,
        ..AnalysisConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Palette strategy
// ---------------------------------------------------------------------------

#[test]
fn test_palette_gray_uses_manual_table() {
    let frame = gray(square_frame(40, 10, 20, 30, 200));
    let input = palette_input(THERMAL_21, frame, CropRect::new(0, 0, 40, 40));

    let result = analyze_sample(&input, &palette_config(), None).unwrap();

    assert_eq!(result.strategy, Strategy::Palette);
    assert_eq!(result.pixel_model, Some(PixelModel::LinearIntensity));
    let scale = result.scale.unwrap();
    assert!(scale.matched);
    assert_eq!((scale.scale.min_temp(), scale.scale.max_temp()), (15.0, 25.0));

    assert_eq!(result.population, Population::Masked);
    assert!(matches!(
        result.segmentation,
        Some(SegmentationOutcome::Thresholded { .. })
    ));

    let hot = 15.0 + 200.0 / 255.0 * 10.0;
    let cold = 15.0 + 30.0 / 255.0 * 10.0;
    assert_abs_diff_eq!(result.stats.max, hot, epsilon = 1e-9);
    assert!(result.stats.min >= cold - 1e-9);
    assert!(result.stats.mean > (hot + cold) / 2.0);
    assert!((300..=500).contains(&result.stats.pixel_count));
    assert!(result.patch.is_none());
}

#[test]
fn test_palette_uniform_region_uses_whole_region() {
    let frame = gray(uniform_frame(30, 30, 128));
    let input = palette_input(THERMAL_21, frame, CropRect::new(5, 5, 20, 20));

    let result = analyze_sample(&input, &AnalysisConfig::default(), None).unwrap();

    assert_eq!(
        result.segmentation,
        Some(SegmentationOutcome::FullRegionFallback)
    );
    assert_eq!(result.stats.pixel_count, 400);
    let expected = aggregate(std::iter::repeat(15.0 + 128.0 / 255.0 * 10.0).take(400)).unwrap();
    assert_abs_diff_eq!(result.stats.mean, expected.mean, epsilon = 1e-9);
    assert_eq!(result.stats.std_dev, 0.0);
}

#[test]
fn test_palette_hue_inversion_on_color() {
    let red = PixelGrid::Color(uniform_color(20, 20, [255, 0, 0]));
    let blue = PixelGrid::Color(uniform_color(20, 20, [0, 0, 255]));
    let rect = CropRect::new(0, 0, 20, 20);
    let config = AnalysisConfig::default();

    let hot = analyze_sample(&palette_input(THERMAL_27, red, rect), &config, None).unwrap();
    let cold = analyze_sample(&palette_input(THERMAL_27, blue, rect), &config, None).unwrap();

    assert_eq!(hot.pixel_model, Some(PixelModel::HueInversion));
    assert_abs_diff_eq!(hot.stats.mean, 31.8, epsilon = 1e-9);
    assert_abs_diff_eq!(cold.stats.mean, 25.7, epsilon = 1e-9);
}

#[test]
fn test_palette_forced_linear_on_color() {
    let white = PixelGrid::Color(uniform_color(10, 10, [255, 255, 255]));
    let mut config = AnalysisConfig::default();
    config.palette.model = PaletteModel::LinearIntensity;

    let input = palette_input(THERMAL_27, white, CropRect::new(0, 0, 10, 10));
    let result = analyze_sample(&input, &config, None).unwrap();

    assert_eq!(result.pixel_model, Some(PixelModel::LinearIntensity));
    // Linear intensity reads the manual table: preset 27 spans 20..35.
    assert_abs_diff_eq!(result.stats.mean, 35.0, epsilon = 1e-9);
}

#[test]
fn test_palette_unknown_preset_uses_default_scale() {
    let frame = gray(uniform_frame(10, 10, 255));
    let input = palette_input("odd-name.jpg", frame, CropRect::new(0, 0, 10, 10));
    let result = analyze_sample(&input, &AnalysisConfig::default(), None).unwrap();

    assert!(result.identity.is_fallback());
    // Fallback preset "27" is known to the manual table.
    assert_abs_diff_eq!(result.stats.max, 35.0, epsilon = 1e-9);
}

#[test]
fn test_palette_crop_out_of_bounds() {
    let frame = gray(uniform_frame(40, 40, 10));
    let input = palette_input(THERMAL_27, frame, CropRect::new(0, 0, 50, 50));
    assert!(matches!(
        analyze_sample(&input, &AnalysisConfig::default(), None),
        Err(ThermoError::InputShape(_))
    ));
}

// ---------------------------------------------------------------------------
// Radiometric strategy
// ---------------------------------------------------------------------------

fn radiometric_input(rect: CropRect) -> (SampleInput, InMemoryExtractor) {
    let raw = thermal_field(40, 50);
    let extractor = InMemoryExtractor::new().with(THERMAL_27, raw);
    let input = SampleInput {
        identifier: THERMAL_27.into(),
        frame: gray(patterned_frame(40, 50)),
        region: Region::Rect(rect),
        thermal_path: PathBuf::from(THERMAL_27),
    };
    (input, extractor)
}

#[test]
fn test_radiometric_stats_match_sensor_subgrid() {
    let (input, extractor) = radiometric_input(CropRect::new(12, 8, 15, 10));
    let result = analyze_sample(&input, &radiometric_config(), Some(&extractor)).unwrap();

    let patch = result.patch.as_ref().unwrap();
    assert_eq!((patch.location.x, patch.location.y), (12, 8));

    let raw = thermal_field(40, 50);
    let expected = aggregate(raw.data.slice(s![8..18, 12..27]).iter().copied()).unwrap();
    assert_abs_diff_eq!(result.stats.mean, expected.mean, epsilon = 1e-9);
    assert_abs_diff_eq!(result.stats.max, expected.max, epsilon = 1e-9);
    assert_abs_diff_eq!(result.stats.min, expected.min, epsilon = 1e-9);
    assert_abs_diff_eq!(result.stats.std_dev, expected.std_dev, epsilon = 1e-9);
    assert_eq!(result.stats.pixel_count, 150);
    assert_eq!(result.population, Population::FullRegion);
    assert!(result.segmentation.is_none());
}

#[test]
fn test_radiometric_with_cropped_image_region() {
    let (mut input, extractor) = radiometric_input(CropRect::new(0, 0, 1, 1));
    let frame = patterned_frame(40, 50);
    let crop = crop_frame(&frame, &CropRect::new(20, 25, 18, 12)).unwrap();
    input.region = Region::Image(gray(crop));

    let result = analyze_sample(&input, &radiometric_config(), Some(&extractor)).unwrap();
    let patch = result.patch.unwrap();
    assert_eq!((patch.location.x, patch.location.y), (20, 25));
    assert_eq!(patch.data.dim(), (12, 18));
}

#[test]
fn test_radiometric_segment_patch() {
    let (input, extractor) = radiometric_input(CropRect::new(12, 8, 15, 10));
    let mut config = radiometric_config();
    config.radiometric.segment_patch = true;

    let result = analyze_sample(&input, &config, Some(&extractor)).unwrap();
    assert!(result.segmentation.is_some());
    assert!(result.stats.pixel_count <= 150);
}

#[test]
fn test_radiometric_requires_extractor() {
    let (input, _) = radiometric_input(CropRect::new(12, 8, 15, 10));
    assert!(matches!(
        analyze_sample(&input, &radiometric_config(), None),
        Err(ThermoError::Extraction(_))
    ));
}

#[test]
fn test_radiometric_extraction_failure() {
    let (input, _) = radiometric_input(CropRect::new(12, 8, 15, 10));
    let empty = InMemoryExtractor::new();
    assert!(matches!(
        analyze_sample(&input, &radiometric_config(), Some(&empty)),
        Err(ThermoError::Extraction(_))
    ));
}

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

#[derive(Default)]
struct RecordingReporter {
    stages: Mutex<Vec<(PipelineStage, Option<usize>)>>,
    advanced: AtomicUsize,
    positions: Mutex<Vec<usize>>,
    finished: AtomicUsize,
}

impl ProgressReporter for RecordingReporter {
    fn begin_stage(&self, stage: PipelineStage, total_items: Option<usize>) {
        self.stages.lock().unwrap().push((stage, total_items));
    }

    fn advance(&self, items_done: usize) {
        self.advanced.fetch_add(1, Ordering::Relaxed);
        self.positions.lock().unwrap().push(items_done);
    }

    fn finish_stage(&self) {
        self.finished.fetch_add(1, Ordering::Relaxed);
    }
}

#[test]
fn test_single_sample_reports_stages() {
    let (input, extractor) = radiometric_input(CropRect::new(12, 8, 15, 10));
    let reporter = RecordingReporter::default();
    analyze_sample_reported(&input, &radiometric_config(), Some(&extractor), &reporter).unwrap();

    let stages: Vec<PipelineStage> = reporter.stages.lock().unwrap().iter().map(|s| s.0).collect();
    assert_eq!(
        stages,
        vec![
            PipelineStage::Extraction,
            PipelineStage::Registration,
            PipelineStage::Aggregation
        ]
    );
    assert_eq!(reporter.finished.load(Ordering::Relaxed), 3);
}

// ---------------------------------------------------------------------------
// Session and batch
// ---------------------------------------------------------------------------

#[test]
fn test_session_append_and_reset() {
    let frame = gray(uniform_frame(10, 10, 100));
    let input = palette_input(THERMAL_27, frame, CropRect::new(0, 0, 10, 10));
    let result = analyze_sample(&input, &AnalysisConfig::default(), None).unwrap();

    let mut session = AnalysisSession::new();
    assert!(session.is_empty());
    session.append(result.clone());
    session.append(result);
    assert_eq!(session.len(), 2);
    assert_eq!(
        session.results()[0].identity.metadata().plant_id(),
        "P01"
    );

    session.reset();
    assert!(session.is_empty());
}

#[test]
fn test_batch_continues_past_failures() {
    let good = |id: &str| {
        palette_input(id, gray(uniform_frame(20, 20, 90)), CropRect::new(0, 0, 10, 10))
    };
    let inputs = vec![
        good("P01_27_Controle_Dia_R1_thermal.jpg"),
        palette_input(
            "P02_27_Controle_Dia_R1_thermal.jpg",
            gray(uniform_frame(5, 5, 90)),
            CropRect::new(0, 0, 10, 10),
        ),
        good("P03_27_Controle_Dia_R1_thermal.jpg"),
    ];

    let reporter = Arc::new(RecordingReporter::default());
    let outcome = analyze_batch(&inputs, &AnalysisConfig::default(), None, reporter.clone());

    assert_eq!(outcome.results.len(), 2);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(
        outcome.failures[0].identifier,
        "P02_27_Controle_Dia_R1_thermal.jpg"
    );
    assert!(matches!(
        outcome.failures[0].error,
        ThermoError::InputShape(_)
    ));
    let plants: Vec<&str> = outcome
        .results
        .iter()
        .map(|r| r.identity.metadata().plant_id())
        .collect();
    assert_eq!(plants, vec!["P01", "P03"]);

    assert_eq!(
        reporter.stages.lock().unwrap().as_slice(),
        &[(PipelineStage::Batch, Some(3))]
    );
    assert_eq!(reporter.advanced.load(Ordering::Relaxed), 3);
}

#[test]
fn test_batch_radiometric_with_shared_extractor() {
    let (input, extractor) = radiometric_input(CropRect::new(12, 8, 15, 10));
    let inputs = vec![input.clone(), input];
    let outcome = analyze_batch(
        &inputs,
        &radiometric_config(),
        Some(&extractor),
        Arc::new(NoOpReporter),
    );
    assert_eq!(outcome.results.len(), 2);
    assert!(outcome.failures.is_empty());
}

#[test]
fn test_batch_progress_never_goes_backwards() {
    let inputs: Vec<SampleInput> = (0..24)
        .map(|i| {
            palette_input(
                &format!("P{i:02}_27_Controle_Dia_R1_thermal.jpg"),
                gray(square_frame(40, 10, 20, 30, 200)),
                CropRect::new(0, 0, 40, 40),
            )
        })
        .collect();

    let reporter = Arc::new(RecordingReporter::default());
    let outcome = analyze_batch(&inputs, &palette_config(), None, reporter.clone());

    assert_eq!(outcome.results.len(), 24);
    let positions = reporter.positions.lock().unwrap().clone();
    assert_eq!(positions, (1..=24).collect::<Vec<_>>());
}
