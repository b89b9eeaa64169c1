//! Ride aggregation and run analysis.
//!
//! This module folds parsed ride records into pair, origin, destination and
//! time totals, summarizes simulation metric series, and fits the
//! distribution of disappointment rates.

pub mod aggregate;
pub mod distribution;
pub mod evaluation;
pub mod types;
pub mod utility;
