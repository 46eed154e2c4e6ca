//! Result collection and batch analysis.

use std::sync::{Arc, Mutex, PoisonError};

use rayon::prelude::*;
use tracing::{info, warn};

use crate::error::{Result, ThermoError};
use crate::extract::RadiometricExtractor;
use crate::pipeline::{AnalysisConfig, PipelineStage, ProgressReporter};
use crate::reconstruct::{analyze_sample, SampleInput, SampleResult};

/// Results accumulated by a caller over several analyses.
#[derive(Clone, Debug, Default)]
pub struct AnalysisSession {
    results: Vec<SampleResult>,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, result: SampleResult) {
        self.results.push(result);
    }

    /// Drop every collected result.
    pub fn reset(&mut self) {
        self.results.clear();
    }

    pub fn results(&self) -> &[SampleResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn into_results(self) -> Vec<SampleResult> {
        self.results
    }
}

impl Extend<SampleResult> for AnalysisSession {
    fn extend<I: IntoIterator<Item = SampleResult>>(&mut self, iter: I) {
        self.results.extend(iter);
    }
}

/// Something a batch can turn into a [`SampleInput`], e.g. a pair of files
/// that still have to be decoded.
pub trait SampleSource: Sync {
    /// Name used in logs and failure reports.
    fn identifier(&self) -> String;

    fn load(&self) -> Result<SampleInput>;
}

impl SampleSource for SampleInput {
    fn identifier(&self) -> String {
        self.identifier.clone()
    }

    fn load(&self) -> Result<SampleInput> {
        Ok(self.clone())
    }
}

/// A sample that could not be analyzed.
#[derive(Debug)]
pub struct BatchFailure {
    pub identifier: String,
    pub error: ThermoError,
}

/// Successful results and failures of a batch, each in input order.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub results: Vec<SampleResult>,
    pub failures: Vec<BatchFailure>,
}

/// Analyze every source in parallel.
///
/// A failing sample is recorded in [`BatchOutcome::failures`] and does not
/// stop the others. `reporter.advance` receives 1, 2, ... in order, whatever
/// order the samples finish in.
pub fn analyze_batch<S: SampleSource>(
    sources: &[S],
    config: &AnalysisConfig,
    extractor: Option<&dyn RadiometricExtractor>,
    reporter: Arc<dyn ProgressReporter>,
) -> BatchOutcome {
    let total = sources.len();
    info!(samples = total, strategy = %config.strategy, "Starting batch");
    reporter.begin_stage(PipelineStage::Batch, Some(total));

    // Counted under a lock so reporters see a non-decreasing position.
    let done = Mutex::new(0usize);
    let outcomes: Vec<(String, Result<SampleResult>)> = sources
        .par_iter()
        .map(|source| {
            let identifier = source.identifier();
            let result = source
                .load()
                .and_then(|input| analyze_sample(&input, config, extractor));
            {
                let mut done = done.lock().unwrap_or_else(PoisonError::into_inner);
                *done += 1;
                reporter.advance(*done);
            }
            (identifier, result)
        })
        .collect();

    reporter.finish_stage();

    let mut outcome = BatchOutcome::default();
    for (identifier, result) in outcomes {
        match result {
            Ok(r) => outcome.results.push(r),
            Err(error) => {
                warn!(sample = %identifier, error = %error, "Sample failed");
                outcome.failures.push(BatchFailure { identifier, error });
            }
        }
    }

    info!(
        succeeded = outcome.results.len(),
        failed = outcome.failures.len(),
        "Batch complete"
    );
    outcome
}
