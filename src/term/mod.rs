//! Linguistic Term - piecewise-linear membership function
//!
//! A term ("word") is one fuzzy set of a partition:
//! - LeftShoulder: μ = 1 below the peak, falling ramp to 0 at `max`
//! - Triangle: rising ramp from `min`, peak at `middle`, falling ramp to `max`
//! - RightShoulder: rising ramp from `min`, μ = 1 from the peak onward
//!
//! Ramps use precomputed reciprocal slopes:
//! - rising: μ = k_left * (x - min)
//! - falling: μ = 1 + k_right * (x - middle), k_right < 0

use serde::{Deserialize, Serialize};

use crate::error::{FuzzyError, FuzzyResult};
use crate::types::TermShape;

/// One linguistic word of a partition
///
/// Built only by [`crate::partition::build_partition`] or restored from a
/// validated [`crate::partition::PartitionState`]; immutable afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Term {
    pub(crate) min: f64,
    pub(crate) max: f64,
    pub(crate) middle: f64,
    pub(crate) slope_left: f64,
    pub(crate) slope_right: f64,
    /// Center of mass, used only by aggregation
    pub(crate) centroid: f64,
    pub(crate) shape: TermShape,
}

impl Term {
    /// Tentative term before neighbours are linked: slopes zero, centroid at the peak
    pub(crate) fn tentative(min: f64, middle: f64, max: f64) -> Self {
        Self {
            min,
            max,
            middle,
            slope_left: 0.0,
            slope_right: 0.0,
            centroid: middle,
            shape: TermShape::Triangle,
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn middle(&self) -> f64 {
        self.middle
    }

    pub fn slope_left(&self) -> f64 {
        self.slope_left
    }

    pub fn slope_right(&self) -> f64 {
        self.slope_right
    }

    pub fn centroid(&self) -> f64 {
        self.centroid
    }

    pub fn shape(&self) -> TermShape {
        self.shape
    }

    pub fn is_left_open(&self) -> bool {
        self.shape.is_left_open()
    }

    pub fn is_right_open(&self) -> bool {
        self.shape.is_right_open()
    }

    /// Region with nonzero membership; shoulders extend to infinity on their open side
    pub fn support(&self) -> (f64, f64) {
        let lower = if self.is_left_open() {
            f64::NEG_INFINITY
        } else {
            self.min
        };
        let upper = if self.is_right_open() {
            f64::INFINITY
        } else {
            self.max
        };
        (lower, upper)
    }

    /// Membership degree of `value` in this term
    ///
    /// Fails with [`FuzzyError::ComputationError`] when the term's parameters
    /// yield a non-finite degree (only possible for a corrupted term).
    pub fn membership(&self, value: f64) -> FuzzyResult<f64> {
        if (value < self.min && !self.is_left_open()) || (value > self.max && !self.is_right_open())
        {
            return Ok(0.0);
        }

        let degree = match self.shape {
            TermShape::LeftShoulder => {
                if value < self.middle {
                    1.0
                } else {
                    self.falling(value)
                }
            }
            TermShape::RightShoulder => {
                if value >= self.middle {
                    1.0
                } else {
                    self.rising(value)
                }
            }
            TermShape::Triangle => {
                if value < self.middle {
                    self.rising(value)
                } else if value > self.middle {
                    self.falling(value)
                } else {
                    1.0
                }
            }
        };

        if !degree.is_finite() {
            return Err(FuzzyError::ComputationError {
                term: format!("{self:?}"),
                value,
            });
        }

        Ok(degree)
    }

    #[inline]
    fn rising(&self, value: f64) -> f64 {
        self.slope_left * (value - self.min)
    }

    #[inline]
    fn falling(&self, value: f64) -> f64 {
        1.0 + self.slope_right * (value - self.middle)
    }
}
