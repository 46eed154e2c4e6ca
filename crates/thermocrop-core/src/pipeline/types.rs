/// Analysis stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Segmentation,
    Calibration,
    Extraction,
    Registration,
    Aggregation,
    /// Many samples at once; one work item per sample.
    Batch,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Segmentation => write!(f, "Segmenting foreground"),
            Self::Calibration => write!(f, "Converting pixels to temperature"),
            Self::Extraction => write!(f, "Extracting radiometric data"),
            Self::Registration => write!(f, "Registering thermal matrix"),
            Self::Aggregation => write!(f, "Computing statistics"),
            Self::Batch => write!(f, "Analyzing samples"),
        }
    }
}

/// Thread-safe progress reporting for analysis runs.
///
/// Implementors can use this to drive progress bars, logging, or any other
/// UI feedback. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new stage has started. `total_items` is the number of work items in
    /// this stage (e.g. sample count), if known.
    fn begin_stage(&self, _stage: PipelineStage, _total_items: Option<usize>) {}

    /// `items_done` work items within the current stage have completed.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

/// Progress reporter that ignores every event.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}
