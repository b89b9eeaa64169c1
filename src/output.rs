//! Output formatting and persistence for aggregates and run summaries.
//!
//! Supports ranked text listings, JSON serialization, and result files.

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::analyzers::types::{AggregateResult, AggregateSummary, Tally};
use crate::stations::Station;
use std::fmt::Display;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Writes a ranked top-`n` listing of `tally`: highest count first, ties in
/// first-seen order.
pub fn write_ranking<W, K>(out: &mut W, title: &str, tally: &Tally<K>, n: usize) -> Result<()>
where
    W: Write,
    K: std::hash::Hash + Eq + Display,
{
    writeln!(out, "{title}")?;
    let top = tally.top(n);
    if top.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for (rank, (key, count)) in top.into_iter().enumerate() {
        writeln!(out, "{:>4}. {:<24} {:>8}", rank + 1, key.to_string(), count)?;
    }
    Ok(())
}

/// Writes the origin, destination and pair rankings of an aggregate.
pub fn write_report<W: Write>(out: &mut W, result: &AggregateResult, n: usize) -> Result<()> {
    write_ranking(out, "Busiest origins", result.origin_totals(), n)?;
    writeln!(out)?;
    write_ranking(out, "Busiest destinations", result.destination_totals(), n)?;
    writeln!(out)?;

    let mut pairs: Tally<String> = Tally::default();
    for ((origin, destination), riders) in result.pair_counts().iter() {
        pairs.add(pair_label(origin, destination), riders);
    }
    write_ranking(out, "Busiest rides", &pairs, n)?;
    Ok(())
}

fn pair_label(origin: &Station, destination: &Station) -> String {
    format!("{origin} -> {destination}")
}

/// Logs an aggregate as pretty-printed JSON.
pub fn print_json(result: &AggregateResult) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(&AggregateSummary::from(result))?);
    Ok(())
}

/// Writes an aggregate as pretty-printed JSON to `path`, creating parent
/// directories as needed.
pub fn write_json(path: &str, result: &AggregateResult) -> Result<()> {
    ensure_parent(path)?;
    let body = serde_json::to_string_pretty(&AggregateSummary::from(result))?;
    fs::write(path, body).with_context(|| format!("Failed to write JSON to '{path}'"))?;
    debug!(path, "Aggregate JSON written");
    Ok(())
}

/// Formats a run summary line as `NAME: value` with three decimals.
pub fn format_metric(name: &str, value: f64) -> String {
    format!("{name}: {value:.3}")
}

/// Logs a run summary and writes it to `path`, one metric per line.
pub fn write_results(path: &str, results: &[(String, f64)]) -> Result<()> {
    ensure_parent(path)?;
    let mut file =
        fs::File::create(path).with_context(|| format!("Failed to create results file '{path}'"))?;

    let pad = "#".repeat(20);
    info!("{} RESULTS {}", pad, pad);
    for (name, value) in results {
        let line = format_metric(name, *value);
        info!("{}", line);
        writeln!(file, "{line}")?;
    }
    file.flush()?;

    debug!(path, metrics = results.len(), "Results written");
    Ok(())
}

pub(crate) fn ensure_parent(path: impl AsRef<Path>) -> Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory '{}'", parent.display()))?;
        }
    }
    Ok(())
}
