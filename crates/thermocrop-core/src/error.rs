use thiserror::Error;

#[derive(Error, Debug)]
pub enum ThermoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    /// Crop larger than its frame, or an empty image/region/sample set.
    #[error("Invalid input shape: {0}")]
    InputShape(String),

    #[error("Invalid calibration scale: min {min} must be below max {max}")]
    InvalidCalibration { min: f64, max: f64 },

    /// The radiometric extractor could not produce a matrix.
    #[error("Radiometric extraction failed: {0}")]
    Extraction(String),

    /// Best correlation score fell below the configured floor.
    #[error("Registration ambiguous: best match score {score:.3} below threshold {threshold:.3}")]
    RegistrationAmbiguous { score: f64, threshold: f64 },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ThermoError>;
