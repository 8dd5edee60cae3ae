// 📈 Regression Engine - Angle-grid curve fitting
// Candidate slopes are tangents of evenly spaced angles in (-pi/2, pi/2),
// every candidate line is forced through the mean point, and the candidate
// with the smallest residual sum of squares wins. The brute-force sweep is
// what keeps near-vertical fits reachable; resolution is bounded by the
// angle divisor.

use std::f64::consts::PI;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

// ============================================================================
// LINEAR MODEL
// ============================================================================

/// Best line found by the angle-grid search. Immutable once fitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionModel {
    /// Training data; duplicate points are permitted.
    pub coordinates: Vec<(f64, f64)>,

    /// Search granularity: angles are sampled every pi / angle_divisor.
    pub angle_divisor: usize,

    pub slope: f64,
    pub intercept: f64,
    pub residual_sum_of_squares: f64,
}

impl RegressionModel {
    /// Fits a line y = slope * x + intercept over the coordinates.
    ///
    /// Sweeps 2 * angle_divisor candidate angles (the positive angle before
    /// its negative counterpart, increasing multiple). On a residual tie the
    /// first-enumerated candidate is kept. Errors on an empty point set and
    /// on a zero divisor; the mean point is undefined without data.
    pub fn fit(coordinates: Vec<(f64, f64)>, angle_divisor: usize) -> Result<Self> {
        if coordinates.is_empty() {
            bail!("cannot fit a regression over an empty point set");
        }
        if angle_divisor == 0 {
            bail!("angle divisor must be at least 1");
        }

        let (mean_x, mean_y) = mean_coordinate(&coordinates);
        let step = PI / angle_divisor as f64;

        let mut best_slope = 0.0;
        let mut best_intercept = 0.0;
        let mut best_rss = f64::INFINITY;

        for multiple in 0..angle_divisor {
            let angle = multiple as f64 * step;
            for candidate in [angle, -angle] {
                let slope = candidate.tan();
                let intercept = mean_y - slope * mean_x;
                let rss = sum_residuals_squared(&coordinates, slope, intercept);
                if rss < best_rss {
                    best_slope = slope;
                    best_intercept = intercept;
                    best_rss = rss;
                }
            }
        }

        Ok(RegressionModel {
            coordinates,
            angle_divisor,
            slope: best_slope,
            intercept: best_intercept,
            residual_sum_of_squares: best_rss,
        })
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Mean point of the training data. Callers guarantee a non-empty slice.
fn mean_coordinate(coordinates: &[(f64, f64)]) -> (f64, f64) {
    let n = coordinates.len() as f64;
    let sum_x: f64 = coordinates.iter().map(|coord| coord.0).sum();
    let sum_y: f64 = coordinates.iter().map(|coord| coord.1).sum();
    (sum_x / n, sum_y / n)
}

/// Sum of squared residuals of the coordinates against y = slope * x + intercept.
fn sum_residuals_squared(coordinates: &[(f64, f64)], slope: f64, intercept: f64) -> f64 {
    coordinates
        .iter()
        .map(|&(x, y)| {
            let residual = (slope * x + intercept - y).abs();
            residual * residual
        })
        .sum()
}

// ============================================================================
// EXPONENTIAL MODEL
// ============================================================================

/// Exponential fit y = a * b^x derived by log-linearization.
///
/// The raw points are fitted linearly first and that fit is kept as
/// reference metadata. The model's own slope, intercept and residual sum
/// live in log space: they come from a second angle-grid fit over
/// (x, ln y), with non-positive y points dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExponentialRegressionModel {
    /// Angle-grid fit over the raw points, kept for reference output.
    pub linear: RegressionModel,

    /// (x, ln y) for every training point with positive y.
    pub log_coordinates: Vec<(f64, f64)>,

    /// Log-space fit: ln y = slope * x + intercept.
    pub slope: f64,
    pub intercept: f64,
    pub residual_sum_of_squares: f64,

    /// Curve constants: a = e^intercept, b = e^slope.
    pub a: f64,
    pub b: f64,
}

impl ExponentialRegressionModel {
    /// Fits the curve y = a * b^x over the coordinates.
    ///
    /// Errors when the point set is empty, and when no point has a positive
    /// y value (the log fit would have nothing to work with).
    pub fn fit(coordinates: Vec<(f64, f64)>, angle_divisor: usize) -> Result<Self> {
        let linear = RegressionModel::fit(coordinates, angle_divisor)?;

        let log_coordinates = log_coordinates(&linear.coordinates);
        let log_fit = RegressionModel::fit(log_coordinates.clone(), angle_divisor)
            .context("exponential fit needs at least one point with positive y")?;

        Ok(ExponentialRegressionModel {
            linear,
            log_coordinates,
            slope: log_fit.slope,
            intercept: log_fit.intercept,
            residual_sum_of_squares: log_fit.residual_sum_of_squares,
            a: log_fit.intercept.exp(),
            b: log_fit.slope.exp(),
        })
    }

    /// The raw training data.
    pub fn coordinates(&self) -> &[(f64, f64)] {
        &self.linear.coordinates
    }

    pub fn angle_divisor(&self) -> usize {
        self.linear.angle_divisor
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.a * self.b.powf(x)
    }
}

/// (x, ln y) pairs. Points with a non-positive y are dropped rather than
/// raising a logarithm domain error.
fn log_coordinates(coordinates: &[(f64, f64)]) -> Vec<(f64, f64)> {
    coordinates
        .iter()
        .filter(|&&(_, y)| y > 0.0)
        .map(|&(x, y)| (x, y.ln()))
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
