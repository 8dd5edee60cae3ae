// 📏 Index Scaler - Min-max scaling onto a fixed range
// Maps a raw metric (income, case rate) onto a [0, 10] index across all
// sub regions of one super region.

use serde::{Deserialize, Serialize};

/// Upper end of every scaled index range.
pub const INDEX_RANGE: f64 = 10.0;

/// Bounds and multiplier of one scaling pass.
///
/// With two or more distinct values the multiplier spreads the observed
/// range over [0, 10]. With one distinct value, or none, the multiplier is
/// zero and every index scales to 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScaleBounds {
    pub min: f64,
    pub max: f64,
    pub multiplier: f64,
}

impl ScaleBounds {
    /// Computes bounds from the raw values of one pass. Duplicate values
    /// collapse before the distinct count is taken.
    pub fn from_values(values: &[f64]) -> Self {
        let mut distinct = values.to_vec();
        distinct.sort_by(f64::total_cmp);
        distinct.dedup();

        match distinct.len() {
            0 => ScaleBounds::default(),
            1 => ScaleBounds {
                min: distinct[0],
                max: distinct[0],
                multiplier: 0.0,
            },
            n => {
                let min = distinct[0];
                let max = distinct[n - 1];
                ScaleBounds {
                    min,
                    max,
                    multiplier: INDEX_RANGE / (max - min),
                }
            }
        }
    }

    /// Scales one raw value into its index. Values drawn from the same set
    /// the bounds were computed from land in [0, 10].
    pub fn index(&self, value: f64) -> f64 {
        (value - self.min) * self.multiplier
    }
}

// ============================================================================
// TESTS
// ============================================================================
