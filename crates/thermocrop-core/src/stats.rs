//! Summary statistics over temperature samples.

use std::ops::AddAssign;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ThermoError};
use crate::frame::Mask;

/// Mean, extremes and population standard deviation of a sample set.
///
/// Always built from at least one sample, so `min <= mean <= max` and
/// `std_dev >= 0` hold.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatsRecord {
    pub mean: f64,
    pub max: f64,
    pub min: f64,
    pub std_dev: f64,
    pub pixel_count: usize,
}

/// Running statistics using Welford's update.
#[derive(Clone, Debug)]
pub struct StatsAccumulator {
    count: usize,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl Default for StatsAccumulator {
    fn default() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl StatsAccumulator {
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Finish accumulation. Fails on an empty set, where mean is undefined.
    pub fn finish(&self) -> Result<StatsRecord> {
        if self.count == 0 {
            return Err(ThermoError::InputShape(
                "Cannot compute statistics over an empty sample set".into(),
            ));
        }
        let variance = (self.m2 / self.count as f64).max(0.0);
        Ok(StatsRecord {
            // Rounding in the running mean must not push it past an extreme.
            mean: self.mean.clamp(self.min, self.max),
            max: self.max,
            min: self.min,
            std_dev: variance.sqrt(),
            pixel_count: self.count,
        })
    }
}

impl AddAssign<f64> for StatsAccumulator {
    fn add_assign(&mut self, value: f64) {
        self.push(value);
    }
}

impl FromIterator<f64> for StatsAccumulator {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut acc = StatsAccumulator::default();
        for v in iter {
            acc += v;
        }
        acc
    }
}

/// Statistics over every value.
pub fn aggregate<I>(values: I) -> Result<StatsRecord>
where
    I: IntoIterator<Item = f64>,
{
    values.into_iter().collect::<StatsAccumulator>().finish()
}

/// Which population a masked aggregation ended up using.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Population {
    /// Only pixels selected by the mask.
    Masked,
    /// The mask selected fewer than the minimum, so every pixel was used.
    FullRegion,
}

/// Statistics over the masked cells of `values`, or over all of them if the
/// mask selects fewer than `min_count` cells.
pub fn aggregate_masked(
    values: &Array2<f64>,
    mask: &Mask,
    min_count: usize,
) -> Result<(StatsRecord, Population)> {
    if values.dim() != mask.dim() {
        return Err(ThermoError::InputShape(format!(
            "Mask shape {:?} does not match value shape {:?}",
            mask.dim(),
            values.dim()
        )));
    }

    let selected: StatsAccumulator = values
        .iter()
        .zip(mask.iter())
        .filter(|(_, &m)| m)
        .map(|(&v, _)| v)
        .collect();

    if selected.count() >= min_count && selected.count() > 0 {
        return Ok((selected.finish()?, Population::Masked));
    }

    debug!(
        selected = selected.count(),
        min_count, "Masked population too small, aggregating full region"
    );
    let record = aggregate(values.iter().copied())?;
    Ok((record, Population::FullRegion))
}
