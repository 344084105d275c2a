//! Fuzzy Partition - evenly spaced Ruspini partition with centroid defuzzification
//!
//! Construction (word count n, sample range [low, high]):
//! - width w = (high - low) / n, peaks at low + (i + 0.5) * w
//! - every term's support runs from the previous peak to the next peak, so at
//!   most two terms are active at any point and their degrees sum to 1
//! - first term is a LeftShoulder, last a RightShoulder, interior terms Triangles
//!
//! Centroids:
//! - Triangle: the peak (exact for the symmetric interior triangles)
//! - Shoulders: trapezoid center of mass over [min, max]
//!   - first: c = (b * min + a * max) / (a + b), a = middle - min, b = max - min
//!   - last:  c = (b * max + a * min) / (a + b), a = max - middle, b = max - min
//!
//! Aggregation is the discrete centroid: Σ c_i * w_i / Σ w_i.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::config::PartitionConfig;
use crate::error::{FuzzyError, FuzzyResult};
use crate::sanitize::{validate_weights, value_range};
use crate::term::Term;
use crate::types::{TermShape, MIN_WORD_COUNT, STATE_VERSION};

// ==================== Data Structures ====================

/// Ordered term sequence spanning an observed value range
#[derive(Clone, Debug, PartialEq)]
pub struct Partition {
    terms: Vec<Term>,
    low: f64,
    high: f64,
}

/// Serializable state for persistence
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionState {
    /// Version number (for migration)
    pub version: String,
    pub low: f64,
    pub high: f64,
    pub terms: Vec<Term>,
}

// ==================== Construction ====================

/// Build an evenly spaced partition of `word_count` terms over the range of `data`
///
/// `data` is only used for its minimum and maximum. Requires at least
/// [`MIN_WORD_COUNT`] terms and a range wide enough that every peak is a
/// distinct finite float; otherwise fails with [`FuzzyError::InvalidRange`].
pub fn build_partition(data: &[f64], word_count: usize) -> FuzzyResult<Partition> {
    if word_count < MIN_WORD_COUNT {
        warn!(word_count, "rejected fuzzy partition: too few terms");
        return Err(FuzzyError::InvalidWordCount(word_count));
    }

    let (low, high) = value_range(data).map_err(|err| {
        warn!(error = %err, samples = data.len(), "rejected fuzzy partition: bad sample data");
        err
    })?;

    let Some(terms) = linked_terms(low, high, word_count) else {
        warn!(word_count, low, high, "rejected fuzzy partition: peaks not representable");
        return Err(FuzzyError::InvalidRange { low, high });
    };

    debug!(word_count, low, high, "fuzzy partition built");

    Ok(Partition { terms, low, high })
}

/// Terms of the partition of [low, high]; `None` when the peaks collapse or
/// any parameter overflows
fn linked_terms(low: f64, high: f64, word_count: usize) -> Option<Vec<Term>> {
    let width = (high - low) / word_count as f64;
    let half_width = width / 2.0;
    if !width.is_finite() || half_width <= 0.0 {
        return None;
    }

    let mut terms: Vec<Term> = (0..word_count)
        .map(|i| {
            let min = low + i as f64 * width;
            Term::tentative(min, min + half_width, min + width)
        })
        .collect();

    if terms.windows(2).any(|pair| pair[0].middle >= pair[1].middle) {
        return None;
    }

    let last = word_count - 1;
    terms[0].shape = TermShape::LeftShoulder;
    terms[last].shape = TermShape::RightShoulder;

    // Link neighbours: each support spans from the previous peak to the next peak
    for i in 0..word_count {
        if i > 0 {
            let prev_middle = terms[i - 1].middle;
            let term = &mut terms[i];
            term.min = prev_middle;
            term.slope_left = 1.0 / (term.middle - term.min);
        }
        if i < last {
            let next_middle = terms[i + 1].middle;
            let term = &mut terms[i];
            term.max = next_middle;
            term.slope_right = -1.0 / (term.max - term.middle);
        }
    }

    let first = &mut terms[0];
    let a = first.middle - first.min;
    let b = first.max - first.min;
    first.centroid = (b * first.min + a * first.max) / (a + b);

    let tail = &mut terms[last];
    let a = tail.max - tail.middle;
    let b = tail.max - tail.min;
    tail.centroid = (b * tail.max + a * tail.min) / (a + b);

    let finite = terms.iter().all(|t| {
        [t.min, t.max, t.middle, t.slope_left, t.slope_right, t.centroid]
            .iter()
            .all(|p| p.is_finite())
    });
    finite.then_some(terms)
}

// ==================== Main Implementation ====================

impl Partition {
    /// Build with the word count from `config`
    pub fn from_config(data: &[f64], config: &PartitionConfig) -> FuzzyResult<Self> {
        build_partition(data, config.word_count)
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Lowest sample value seen at construction
    pub fn low(&self) -> f64 {
        self.low
    }

    /// Highest sample value seen at construction
    pub fn high(&self) -> f64 {
        self.high
    }

    /// Weighted centroid of all terms (defuzzification)
    ///
    /// `weights[i]` scales `terms[i].centroid`; the weights need not be
    /// membership degrees. Fails on a length mismatch or a zero weight sum.
    pub fn aggregate(&self, weights: &[f64]) -> FuzzyResult<f64> {
        validate_weights(weights, self.terms.len())?;

        let weighted: f64 = self
            .terms
            .iter()
            .zip(weights)
            .map(|(term, &w)| term.centroid * w)
            .sum();
        let sum: f64 = weights.iter().sum();

        if sum == 0.0 {
            return Err(FuzzyError::UndefinedAggregate);
        }

        let value = weighted / sum;
        trace!(weight_sum = sum, value, "aggregated partition weights");
        Ok(value)
    }

    /// Membership degree of `value` in every term, in term order
    pub fn fuzzify(&self, value: f64) -> FuzzyResult<Vec<f64>> {
        self.terms.iter().map(|term| term.membership(value)).collect()
    }

    /// Crisp value -> degrees -> crisp value
    pub fn defuzzify(&self, value: f64) -> FuzzyResult<f64> {
        let weights = self.fuzzify(value)?;
        self.aggregate(&weights)
    }

    /// Index of the term with the highest degree at `value` (first one on ties)
    pub fn dominant_term(&self, value: f64) -> FuzzyResult<usize> {
        let degrees = self.fuzzify(value)?;
        let mut best = 0;
        for (i, &degree) in degrees.iter().enumerate().skip(1) {
            if degree > degrees[best] {
                best = i;
            }
        }
        Ok(best)
    }

    // ==================== Batch Operations ====================

    /// Fuzzify many values; parallel once `values.len() >= parallel_threshold`
    pub fn fuzzify_batch(
        &self,
        values: &[f64],
        parallel_threshold: usize,
    ) -> FuzzyResult<Vec<Vec<f64>>> {
        if values.len() >= parallel_threshold {
            values.par_iter().map(|&v| self.fuzzify(v)).collect()
        } else {
            values.iter().map(|&v| self.fuzzify(v)).collect()
        }
    }

    /// Aggregate many weight vectors; parallel once `rows.len() >= parallel_threshold`
    pub fn aggregate_batch(
        &self,
        rows: &[Vec<f64>],
        parallel_threshold: usize,
    ) -> FuzzyResult<Vec<f64>> {
        if rows.len() >= parallel_threshold {
            rows.par_iter().map(|w| self.aggregate(w)).collect()
        } else {
            rows.iter().map(|w| self.aggregate(w)).collect()
        }
    }

    // ==================== Persistence ====================

    pub fn to_state(&self) -> PartitionState {
        PartitionState {
            version: STATE_VERSION.to_string(),
            low: self.low,
            high: self.high,
            terms: self.terms.clone(),
        }
    }

    /// Restore a partition
    ///
    /// The state is accepted only if it is bit-identical to the partition
    /// [`build_partition`] produces for its stored `low`, `high` and term count.
    pub fn from_state(state: PartitionState) -> FuzzyResult<Self> {
        if let Err(reason) = validate_state(&state) {
            warn!(%reason, "rejected fuzzy partition state");
            return Err(FuzzyError::InvalidState(reason));
        }

        Ok(Self {
            terms: state.terms,
            low: state.low,
            high: state.high,
        })
    }

    pub fn to_json(&self) -> FuzzyResult<String> {
        Ok(serde_json::to_string(&self.to_state())?)
    }

    pub fn from_json(json: &str) -> FuzzyResult<Self> {
        let state: PartitionState = serde_json::from_str(json)?;
        Self::from_state(state)
    }
}

fn validate_state(state: &PartitionState) -> Result<(), String> {
    if state.version != STATE_VERSION {
        return Err(format!(
            "unsupported version {} (expected {})",
            state.version, STATE_VERSION
        ));
    }
    if !(state.low.is_finite() && state.high.is_finite() && state.low < state.high) {
        return Err(format!("bad range [{}, {}]", state.low, state.high));
    }

    let n = state.terms.len();
    if n < MIN_WORD_COUNT {
        return Err(format!("{n} terms, at least {MIN_WORD_COUNT} required"));
    }

    let expected = linked_terms(state.low, state.high, n).ok_or_else(|| {
        format!(
            "range [{}, {}] cannot hold {n} terms",
            state.low, state.high
        )
    })?;

    match state
        .terms
        .iter()
        .zip(&expected)
        .position(|(stored, built)| stored != built)
    {
        Some(i) => Err(format!(
            "term {i} does not match the partition of [{}, {}]",
            state.low, state.high
        )),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-10;

    fn two_terms() -> Partition {
        build_partition(&[0.0, 10.0], 2).unwrap()
    }

    fn three_terms() -> Partition {
        build_partition(&[12.0, 0.0, 5.0], 3).unwrap()
    }

    // ==================== Construction Tests ====================

    #[test]
    fn test_two_term_partition_exact() {
        let p = two_terms();
        assert_eq!(p.len(), 2);
        assert_eq!(p.low(), 0.0);
        assert_eq!(p.high(), 10.0);

        let t0 = &p.terms()[0];
        assert_eq!(t0.shape(), TermShape::LeftShoulder);
        assert_eq!(t0.min(), 0.0);
        assert_eq!(t0.middle(), 2.5);
        assert_eq!(t0.max(), 7.5);
        assert_eq!(t0.slope_left(), 0.0);
        assert_eq!(t0.slope_right(), -0.2);
        assert_eq!(t0.centroid(), 1.875);

        let t1 = &p.terms()[1];
        assert_eq!(t1.shape(), TermShape::RightShoulder);
        assert_eq!(t1.min(), 2.5);
        assert_eq!(t1.middle(), 7.5);
        assert_eq!(t1.max(), 10.0);
        assert_eq!(t1.slope_left(), 0.2);
        assert_eq!(t1.slope_right(), 0.0);
        assert_eq!(t1.centroid(), 8.125);
    }

    #[test]
    fn test_three_term_partition_exact() {
        let p = three_terms();
        let t: Vec<(f64, f64, f64, f64)> = p
            .terms()
            .iter()
            .map(|t| (t.min(), t.middle(), t.max(), t.centroid()))
            .collect();

        assert_eq!(t[0], (0.0, 2.0, 6.0, 1.5));
        assert_eq!(t[1], (2.0, 6.0, 10.0, 6.0));
        assert_eq!(t[2], (6.0, 10.0, 12.0, 10.5));
        assert_eq!(p.terms()[1].shape(), TermShape::Triangle);
        assert_eq!(p.terms()[1].slope_left(), 0.25);
        assert_eq!(p.terms()[1].slope_right(), -0.25);
    }

    #[test]
    fn test_interior_terms_linked_to_neighbours() {
        let p = build_partition(&[-3.0, 17.0], 6).unwrap();
        let terms = p.terms();
        for i in 1..terms.len() - 1 {
            assert_eq!(terms[i].min(), terms[i - 1].middle());
            assert_eq!(terms[i].max(), terms[i + 1].middle());
            assert_eq!(terms[i].centroid(), terms[i].middle());
        }
    }

    #[test]
    fn test_single_word_rejected() {
        assert!(matches!(
            build_partition(&[0.0, 1.0], 1),
            Err(FuzzyError::InvalidWordCount(1))
        ));
        assert!(matches!(
            build_partition(&[0.0, 1.0], 0),
            Err(FuzzyError::InvalidWordCount(0))
        ));
    }

    #[test]
    fn test_zero_width_range_rejected() {
        assert!(matches!(
            build_partition(&[2.0, 2.0], 3),
            Err(FuzzyError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_empty_data_rejected() {
        assert!(matches!(
            build_partition(&[], 3),
            Err(FuzzyError::EmptyData)
        ));
    }

    #[test]
    fn test_from_config() {
        let config = PartitionConfig {
            word_count: 4,
            ..PartitionConfig::default()
        };
        let p = Partition::from_config(&[0.0, 8.0], &config).unwrap();
        assert_eq!(p.len(), 4);
        assert!(!p.is_empty());
    }

    #[test]
    fn test_unrepresentable_ranges_rejected() {
        // width overflows
        assert!(matches!(
            build_partition(&[-f64::MAX, f64::MAX], 8),
            Err(FuzzyError::InvalidRange { .. })
        ));
        // width underflows to zero
        assert!(matches!(
            build_partition(&[0.0, 5e-324], 8),
            Err(FuzzyError::InvalidRange { .. })
        ));
        // peaks collapse onto the same float at a large offset
        assert!(matches!(
            build_partition(&[1e15, 1e15 + 1.0], 8),
            Err(FuzzyError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_large_offset_range_keeps_distinct_peaks() {
        let p = build_partition(&[1e15, 1e15 + 64.0], 8).unwrap();
        for pair in p.terms().windows(2) {
            assert!(pair[0].middle() < pair[1].middle());
        }
        let sum: f64 = p.fuzzify(1e15 + 20.0).unwrap().iter().sum();
        assert!((sum - 1.0).abs() < EPSILON);
    }

    // ==================== Aggregation Tests ====================

    #[test]
    fn test_aggregate_one_hot_returns_centroid() {
        let p = three_terms();
        assert_eq!(p.aggregate(&[1.0, 0.0, 0.0]).unwrap(), 1.5);
        assert_eq!(p.aggregate(&[0.0, 0.0, 1.0]).unwrap(), 10.5);
    }

    #[test]
    fn test_aggregate_weighted() {
        let p = three_terms();
        let weights = p.fuzzify(5.0).unwrap();
        assert_eq!(weights, vec![0.25, 0.75, 0.0]);
        assert_eq!(p.aggregate(&weights).unwrap(), 4.875);
    }

    #[test]
    fn test_aggregate_unnormalized_weights() {
        let p = three_terms();
        // scaling all weights leaves the result unchanged
        assert_eq!(p.aggregate(&[2.0, 6.0, 0.0]).unwrap(), 4.875);
    }

    #[test]
    fn test_aggregate_zero_weights() {
        let p = three_terms();
        assert!(matches!(
            p.aggregate(&[0.0, 0.0, 0.0]),
            Err(FuzzyError::UndefinedAggregate)
        ));
    }

    #[test]
    fn test_aggregate_dimension_mismatch() {
        let p = three_terms();
        assert!(matches!(
            p.aggregate(&[1.0, 0.0]),
            Err(FuzzyError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_defuzzify_at_peak_returns_centroid() {
        let p = three_terms();
        assert!((p.defuzzify(6.0).unwrap() - 6.0).abs() < EPSILON);
        // shoulders saturate: everything beyond the last peak maps to its centroid
        assert!((p.defuzzify(50.0).unwrap() - 10.5).abs() < EPSILON);
    }

    #[test]
    fn test_dominant_term() {
        let p = three_terms();
        assert_eq!(p.dominant_term(-5.0).unwrap(), 0);
        assert_eq!(p.dominant_term(5.0).unwrap(), 1);
        assert_eq!(p.dominant_term(11.0).unwrap(), 2);
        // 4.0 sits halfway between the first two peaks
        assert_eq!(p.dominant_term(4.0).unwrap(), 0);
    }

    // ==================== Batch Tests ====================

    #[test]
    fn test_batch_parallel_matches_sequential() {
        let p = build_partition(&[0.0, 100.0], 5).unwrap();
        let values: Vec<f64> = (0..500).map(|i| i as f64 * 0.2).collect();

        let sequential = p.fuzzify_batch(&values, usize::MAX).unwrap();
        let parallel = p.fuzzify_batch(&values, 1).unwrap();
        assert_eq!(sequential, parallel);

        let seq_values = p.aggregate_batch(&sequential, usize::MAX).unwrap();
        let par_values = p.aggregate_batch(&parallel, 1).unwrap();
        assert_eq!(seq_values, par_values);
        assert_eq!(seq_values.len(), 500);
    }

    #[test]
    fn test_aggregate_batch_propagates_error() {
        let p = two_terms();
        let rows = vec![vec![1.0, 0.0], vec![0.0, 0.0]];
        assert!(matches!(
            p.aggregate_batch(&rows, 1),
            Err(FuzzyError::UndefinedAggregate)
        ));
    }

    // ==================== Persistence Tests ====================

    #[test]
    fn test_state_json_round_trip() {
        let p = build_partition(&[1.0, 9.0, 4.0], 4).unwrap();
        let json = p.to_json().unwrap();
        let restored = Partition::from_json(&json).unwrap();
        assert_eq!(p, restored);
    }

    #[test]
    fn test_from_state_rejects_wrong_version() {
        let mut state = two_terms().to_state();
        state.version = "0.0.1".to_string();
        assert!(matches!(
            Partition::from_state(state),
            Err(FuzzyError::InvalidState(_))
        ));
    }

    #[test]
    fn test_from_state_rejects_bad_shape_order() {
        let mut state = three_terms().to_state();
        state.terms.swap(0, 2);
        assert!(matches!(
            Partition::from_state(state),
            Err(FuzzyError::InvalidState(_))
        ));
    }

    #[test]
    fn test_from_state_rejects_broken_slope() {
        let mut state = three_terms().to_state();
        state.terms[1].slope_left = 3.0;
        assert!(matches!(
            Partition::from_state(state),
            Err(FuzzyError::InvalidState(_))
        ));
    }

    #[test]
    fn test_from_state_rejects_shifted_interior_term() {
        let mut state = three_terms().to_state();
        // slopes stay consistent with the shifted peak, but a gap opens at 6.0
        let term = &mut state.terms[1];
        term.min = 3.0;
        term.middle = 7.0;
        term.max = 11.0;

        assert!(matches!(
            Partition::from_state(state),
            Err(FuzzyError::InvalidState(_))
        ));
    }

    #[test]
    fn test_from_state_rejects_tampered_centroid() {
        let mut state = three_terms().to_state();
        state.terms[0].centroid = 2.0;
        assert!(matches!(
            Partition::from_state(state),
            Err(FuzzyError::InvalidState(_))
        ));
    }

    #[test]
    fn test_from_state_rejects_range_mismatch() {
        let mut state = three_terms().to_state();
        state.high = 13.0;
        assert!(matches!(
            Partition::from_state(state),
            Err(FuzzyError::InvalidState(_))
        ));
    }

    #[test]
    fn test_from_json_rejects_unknown_shape() {
        let json = two_terms()
            .to_json()
            .unwrap()
            .replace("\"rightShoulder\"", "\"gaussian\"");
        assert!(matches!(
            Partition::from_json(&json),
            Err(FuzzyError::Serialization(_))
        ));
    }
}
