use thermocrop_core::calibration::{PixelModel, TableChoice};
use thermocrop_core::filters::ClaheConfig;
use thermocrop_core::pipeline::{AnalysisConfig, PaletteModel, PipelineStage, Strategy};
use thermocrop_core::registration::RegistrationConfig;

#[test]
fn test_default_config_survives_toml() {
    let config = AnalysisConfig::default();
    let text = toml::to_string_pretty(&config).unwrap();
    let back: AnalysisConfig = toml::from_str(&text).unwrap();
    assert_eq!(back, config);
}

#[test]
fn test_disabled_settings_survive_toml() {
    let mut config = AnalysisConfig::default();
    config.segmentation.contrast = ClaheConfig::disabled();
    config.registration = RegistrationConfig::unchecked();

    let text = toml::to_string_pretty(&config).unwrap();
    let back: AnalysisConfig = toml::from_str(&text).unwrap();

    assert!(!back.segmentation.contrast.enabled);
    assert_eq!(back.registration.min_match_score, -1.0);
    assert_eq!(back, config);
}

#[test]
fn test_switches_written_by_hand() {
    let text = r#"
[segmentation.contrast]
enabled = false

[registration]
min_match_score = -1.0
"#;
    let config: AnalysisConfig = toml::from_str(text).unwrap();
    assert_eq!(config.segmentation.contrast, ClaheConfig::disabled());
    assert_eq!(config.registration, RegistrationConfig::unchecked());
}

#[test]
fn test_empty_toml_is_default() {
    let config: AnalysisConfig = toml::from_str("").unwrap();
    assert_eq!(config, AnalysisConfig::default());
}

#[test]
fn test_partial_toml_keeps_other_defaults() {
    let text = r#"
strategy = "Radiometric"

[registration]
min_match_score = 0.8

[segmentation]
min_foreground = 50

[calibration.manual]
default = { min_temp = 10.0, max_temp = 30.0 }

[calibration.manual.presets]
"21" = { min_temp = 18.0, max_temp = 24.0 }
"#;
    let config: AnalysisConfig = toml::from_str(text).unwrap();
    let defaults = AnalysisConfig::default();

    assert_eq!(config.strategy, Strategy::Radiometric);
    assert_eq!(config.registration.min_match_score, 0.8);
    assert_eq!(config.segmentation.min_foreground, 50);
    assert_eq!(config.segmentation.blur_kernel_size, defaults.segmentation.blur_kernel_size);
    assert_eq!(config.calibration.palette, defaults.calibration.palette);
    assert_eq!(config.metadata, defaults.metadata);

    let manual = &config.calibration.manual;
    assert_eq!(manual.presets.len(), 1);
    let scale = manual.resolve("21").scale;
    assert_eq!((scale.min_temp(), scale.max_temp()), (18.0, 24.0));
    assert!(!manual.resolve("27").matched);
}

#[test]
fn test_inverted_scale_in_config_is_rejected() {
    let text = r#"
[calibration.palette]
default = { min_temp = 40.0, max_temp = 20.0 }
"#;
    assert!(toml::from_str::<AnalysisConfig>(text).is_err());
}

#[test]
fn test_palette_section() {
    let text = r#"
[palette]
model = "LinearIntensity"
table = "Palette"
"#;
    let config: AnalysisConfig = toml::from_str(text).unwrap();
    assert_eq!(config.palette.model, PaletteModel::LinearIntensity);
    assert_eq!(config.palette.table, TableChoice::Palette);
}

#[test]
fn test_palette_model_resolution() {
    assert_eq!(PaletteModel::Auto.resolve(true), PixelModel::HueInversion);
    assert_eq!(PaletteModel::Auto.resolve(false), PixelModel::LinearIntensity);
    assert_eq!(PaletteModel::HueInversion.resolve(false), PixelModel::LinearIntensity);
    assert_eq!(PaletteModel::LinearIntensity.resolve(true), PixelModel::LinearIntensity);
}

#[test]
fn test_display_names() {
    assert_eq!(Strategy::Palette.to_string(), "Palette");
    assert_eq!(Strategy::Radiometric.to_string(), "Radiometric");
    assert_eq!(PipelineStage::Registration.to_string(), "Registering thermal matrix");
    assert_eq!(PipelineStage::Batch.to_string(), "Analyzing samples");
}
