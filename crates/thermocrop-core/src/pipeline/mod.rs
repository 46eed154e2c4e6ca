pub mod config;
mod types;

pub use config::{AnalysisConfig, PaletteConfig, PaletteModel, RadiometricConfig, Strategy};
pub use types::{NoOpReporter, PipelineStage, ProgressReporter};
