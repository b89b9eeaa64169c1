//! Data types used by the aggregation pipeline.

use crate::stations::Station;
use indexmap::IndexMap;
use serde::Serialize;
use std::hash::Hash;

/// One parsed row of a passenger file: riders leaving `origin` at `time`,
/// counted per destination.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RideRecord {
    time: String,
    origin: Station,
    destinations: IndexMap<Station, u64>,
    line: u64,
}

impl RideRecord {
    pub fn new(
        time: impl Into<String>,
        origin: Station,
        destinations: IndexMap<Station, u64>,
    ) -> Self {
        Self {
            time: time.into(),
            origin,
            destinations,
            line: 0,
        }
    }

    /// Tags the record with the input line it was parsed from.
    pub fn at_line(mut self, line: u64) -> Self {
        self.line = line;
        self
    }

    /// Source line, 0 when the record was not read from a file.
    pub fn line(&self) -> u64 {
        self.line
    }

    pub fn time(&self) -> &str {
        &self.time
    }

    pub fn origin(&self) -> &Station {
        &self.origin
    }

    pub fn destinations(&self) -> &IndexMap<Station, u64> {
        &self.destinations
    }

    /// Sum of every destination count in the row, `None` on overflow.
    pub fn total(&self) -> Option<u64> {
        self.destinations
            .values()
            .try_fold(0u64, |acc, n| acc.checked_add(*n))
    }
}

/// Key → count accumulator. Absent keys read as zero and keys keep the order
/// they were first seen in.
///
/// Equality compares contents only, so two tallies built from the same rows in
/// a different order are equal.
#[derive(Clone, Debug, Serialize)]
#[serde(transparent)]
pub struct Tally<K: Hash + Eq> {
    counts: IndexMap<K, u64>,
}

impl<K: Hash + Eq> Default for Tally<K> {
    fn default() -> Self {
        Self {
            counts: IndexMap::new(),
        }
    }
}

impl<K: Hash + Eq> PartialEq for Tally<K> {
    fn eq(&self, other: &Self) -> bool {
        self.counts == other.counts
    }
}

impl<K: Hash + Eq> Eq for Tally<K> {}

impl<K: Hash + Eq> Tally<K> {
    /// Adds `count` to `key`, saturating at `u64::MAX`.
    pub fn add(&mut self, key: K, count: u64) {
        let slot = self.counts.entry(key).or_insert(0);
        *slot = slot.saturating_add(count);
    }

    pub fn get(&self, key: &K) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.counts.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.counts
            .values()
            .fold(0u64, |acc, n| acc.saturating_add(*n))
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, u64)> {
        self.counts.iter().map(|(k, v)| (k, *v))
    }

    /// The `n` largest entries, descending. Ties keep first-seen order.
    pub fn top(&self, n: usize) -> Vec<(&K, u64)> {
        let mut entries: Vec<_> = self.iter().collect();
        // sort_by is stable
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries.truncate(n);
        entries
    }
}

/// The four mappings built by one aggregation pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AggregateResult {
    pub(crate) pair_counts: Tally<(Station, Station)>,
    pub(crate) origin_totals: Tally<Station>,
    pub(crate) destination_totals: Tally<Station>,
    pub(crate) time_totals: Tally<String>,
    pub(crate) records: usize,
    pub(crate) riders: u64,
}

impl AggregateResult {
    pub fn pair_counts(&self) -> &Tally<(Station, Station)> {
        &self.pair_counts
    }

    pub fn origin_totals(&self) -> &Tally<Station> {
        &self.origin_totals
    }

    pub fn destination_totals(&self) -> &Tally<Station> {
        &self.destination_totals
    }

    pub fn time_totals(&self) -> &Tally<String> {
        &self.time_totals
    }

    /// Number of records folded into the result.
    pub fn records(&self) -> usize {
        self.records
    }

    /// Riders across all records; equal to the total of every mapping.
    pub fn riders(&self) -> u64 {
        self.riders
    }
}

/// A single `origin -> destination` entry of the JSON dump.
#[derive(Serialize)]
pub struct PairEntry<'a> {
    pub(crate) origin: &'a Station,
    pub(crate) destination: &'a Station,
    pub(crate) riders: u64,
}

/// JSON shape of an [`AggregateResult`]; pair keys cannot be object keys.
#[derive(Serialize)]
pub struct AggregateSummary<'a> {
    pub(crate) records: usize,
    pub(crate) pair_counts: Vec<PairEntry<'a>>,
    pub(crate) origin_totals: &'a Tally<Station>,
    pub(crate) destination_totals: &'a Tally<Station>,
    pub(crate) time_totals: &'a Tally<String>,
}

impl<'a> From<&'a AggregateResult> for AggregateSummary<'a> {
    fn from(result: &'a AggregateResult) -> Self {
        AggregateSummary {
            records: result.records,
            pair_counts: result
                .pair_counts
                .iter()
                .map(|((origin, destination), riders)| PairEntry {
                    origin,
                    destination,
                    riders,
                })
                .collect(),
            origin_totals: &result.origin_totals,
            destination_totals: &result.destination_totals,
            time_totals: &result.time_totals,
        }
    }
}
