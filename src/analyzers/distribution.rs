//! Distribution of per-passenger disappointment rates.
//!
//! Rates are binned to whole numbers and overlaid with a normal curve, which
//! is used to pick vote thresholds for the simulation.

use crate::analyzers::utility::{mean, normal_pdf, stddev};
use indexmap::IndexMap;

/// Largest value accepted for binning; one bin is allocated per unit.
pub const MAX_VALUE: f64 = 100_000.0;

/// Occurrences of each distinct value, in first-seen order.
///
/// Only finite values in `0.0..=MAX_VALUE` are recorded.
#[derive(Debug, Default, Clone)]
pub struct ValueCounts {
    // keyed by f64 bit pattern; -0.0 is folded into 0.0 on insert
    counts: IndexMap<u64, u64>,
}

impl ValueCounts {
    /// Records one occurrence of `value`. Returns `false`, leaving the counts
    /// untouched, when the value is negative, non-finite or above [`MAX_VALUE`].
    pub fn add(&mut self, value: f64) -> bool {
        if !value.is_finite() || !(0.0..=MAX_VALUE).contains(&value) {
            return false;
        }
        let value = if value == 0.0 { 0.0 } else { value };
        *self.counts.entry(value.to_bits()).or_insert(0) += 1;
        true
    }

    pub fn get(&self, value: f64) -> u64 {
        self.counts.get(&value.to_bits()).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, u64)> + '_ {
        self.counts.iter().map(|(bits, n)| (f64::from_bits(*bits), *n))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn max_value(&self) -> Option<f64> {
        self.iter().map(|(v, _)| v).reduce(f64::max)
    }
}

/// Unit-width bins from 0 up to the rounded maximum value.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub(crate) bins: Vec<u64>,
}

impl Histogram {
    /// Exact zeros are left out of the bins.
    pub fn from_counts(counts: &ValueCounts) -> Self {
        let Some(max) = counts.max_value() else {
            return Self { bins: Vec::new() };
        };

        let mut bins = vec![0; max.round_ties_even() as usize + 1];
        for (value, n) in counts.iter() {
            if value == 0.0 {
                continue;
            }
            bins[value.round_ties_even() as usize] += n;
        }

        Self { bins }
    }

    pub fn bins(&self) -> &[u64] {
        &self.bins
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }
}

/// Normal distribution fitted to the per-value occurrence counts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianFit {
    pub mu: f64,
    pub sigma: f64,
}

impl GaussianFit {
    pub fn from_counts(counts: &ValueCounts) -> Self {
        let occurrences: Vec<f64> = counts.iter().map(|(_, n)| n as f64).collect();
        let mu = mean(&occurrences);
        let sigma = stddev(&occurrences, mu);
        Self { mu, sigma }
    }

    /// Density at every bin position `0..len`, or `None` for a degenerate fit.
    pub fn curve(&self, len: usize) -> Option<Vec<f64>> {
        if self.sigma.is_nan() || self.sigma <= 0.0 {
            return None;
        }
        Some(
            (0..len)
                .map(|x| normal_pdf(x as f64, self.mu, self.sigma))
                .collect(),
        )
    }
}
