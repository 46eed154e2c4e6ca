pub mod analyze;
pub mod batch;
pub mod config;
pub mod parse;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use thermocrop_core::extract::{CommandExtractor, MatrixFileExtractor, RadiometricExtractor};
use thermocrop_core::pipeline::{AnalysisConfig, Strategy};

#[derive(Clone, Copy, ValueEnum)]
pub enum StrategyArg {
    Palette,
    Radiometric,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Palette => Strategy::Palette,
            StrategyArg::Radiometric => Strategy::Radiometric,
        }
    }
}

/// Options shared by the analysis commands.
#[derive(Args)]
pub struct AnalysisOptions {
    /// Analysis config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Reconstruction strategy (overrides the config file)
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// External program that prints the radiometric matrix of an image.
    /// Without it, a `.csv` matrix next to the thermal image is read.
    #[arg(long)]
    pub extractor: Option<PathBuf>,

    /// Extra argument passed to the extractor program (repeatable)
    #[arg(long = "extractor-arg", requires = "extractor")]
    pub extractor_args: Vec<String>,
}

impl AnalysisOptions {
    pub fn load_config(&self) -> Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => load_config_file(path)?,
            None => AnalysisConfig::default(),
        };
        if let Some(strategy) = self.strategy {
            config.strategy = strategy.into();
        }
        Ok(config)
    }

    pub fn extractor(&self) -> Box<dyn RadiometricExtractor> {
        match &self.extractor {
            Some(program) => Box::new(
                self.extractor_args
                    .iter()
                    .fold(CommandExtractor::new(program), |e, a| e.arg(a)),
            ),
            None => Box::new(MatrixFileExtractor::default()),
        }
    }
}

pub fn load_config_file(path: &Path) -> Result<AnalysisConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&contents).context("Invalid analysis config")
}
