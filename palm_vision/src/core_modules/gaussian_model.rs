// THEORY:
// A `GaussianModel` learns what "normal" looks like for one scalar channel (hue,
// saturation or value) and then scores new observations against it. The score is
// the cumulative distribution function of the fitted normal distribution, so it
// reads as "how much of the calibration population sits at or below this value".
//
// Key architectural principles:
// 1.  **Accumulate, then Fit**: Samples are appended without touching statistics.
//     Fitting is an explicit step that produces a separate `FittedGaussian`. The
//     type split makes a probability query before fitting unrepresentable, and a
//     fitted model can never go stale because it is immutable.
// 2.  **Unbiased Spread**: Variance uses the (n-1) estimator. A population of one
//     sample (or none) has no defined spread, so fitting it is an error rather than
//     a silent NaN.
// 3.  **Cheap Scoring**: `erf` is the Abramowitz-Stegun 7.1.26 rational
//     approximation. Its absolute error (about 1.5e-7) is far below the resolution
//     of an 8-bit color channel, and it needs a single `exp` per call.
// 4.  **Shareable**: `FittedGaussian` is `Copy`. Any number of readers can hold one
//     while the owner swaps in a recalibrated model.

use crate::error::{Error, Result};
use serde::Serialize;

// Abramowitz & Stegun, formula 7.1.26.
const A1: f64 = 0.254829592;
const A2: f64 = -0.284496736;
const A3: f64 = 1.421413741;
const A4: f64 = -1.453152027;
const A5: f64 = 1.061405429;
const P: f64 = 0.3275911;

/// Approximates the Gauss error function.
pub fn erf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

/// An unfitted population of samples for a single channel.
#[derive(Debug, Clone, Default)]
pub struct GaussianModel {
    population: Vec<f64>,
}

impl GaussianModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sample(&mut self, sample: f64) {
        self.population.push(sample);
    }

    pub fn add_samples<I: IntoIterator<Item = f64>>(&mut self, samples: I) {
        self.population.extend(samples);
    }

    pub fn len(&self) -> usize {
        self.population.len()
    }

    pub fn is_empty(&self) -> bool {
        self.population.is_empty()
    }

    /// Computes mean, unbiased variance and standard deviation of the population.
    pub fn fit(&self) -> Result<FittedGaussian> {
        let size = self.population.len();
        if size <= 1 {
            return Err(Error::DegeneratePopulation { size });
        }

        let count = size as f64;
        // Shifted by the first sample so a constant population fits exactly.
        let pivot = self.population[0];
        let mean = pivot + self.population.iter().map(|v| v - pivot).sum::<f64>() / count;
        let variance = self
            .population
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f64>()
            / (count - 1.0);

        Ok(FittedGaussian {
            mean,
            variance,
            std_dev: variance.sqrt(),
        })
    }
}

/// The fitted normal distribution of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FittedGaussian {
    mean: f64,
    variance: f64,
    std_dev: f64,
}

impl FittedGaussian {
    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn variance(&self) -> f64 {
        self.variance
    }

    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    /// The normal CDF at `x`. Exactly 0.5 at the mean; with zero variance this
    /// degenerates into a step at the mean.
    pub fn probability(&self, x: f64) -> f64 {
        let deviation = x - self.mean;
        if deviation == 0.0 {
            return 0.5;
        }
        // Zero variance yields +/-inf here, which erf saturates to +/-1.
        let z = deviation / (2.0 * self.variance).sqrt();
        0.5 * (1.0 + erf(z))
    }

    pub fn within_threshold(&self, x: f64, threshold: f64) -> bool {
        self.probability(x) >= threshold
    }
}
