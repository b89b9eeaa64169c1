//! Readers for the delimited text logs.
//!
//! Passenger files are `;`-separated with a two line preamble, then one row
//! per origin and time: `TIME;FROM;<count per station>`. Simulation output is
//! whitespace-separated `time metric value` triples, and disappointment logs
//! hold one number per line.

use crate::analyzers::distribution::ValueCounts;
use crate::analyzers::evaluation::EvalData;
use crate::analyzers::types::RideRecord;
use crate::error::{EvalError, ParseError};
use crate::stations::{Station, StationLayout};
use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter, Trim};
use indexmap::IndexMap;
use std::io::{BufRead, BufReader, Read};
use tracing::debug;

/// Preamble lines before the first ride row in the passenger files.
pub const DEFAULT_SKIP_ROWS: u64 = 2;

/// Lazy, single-pass stream of [`RideRecord`]s.
pub struct RideReader<R> {
    rows: StringRecordsIntoIter<R>,
    layout: StationLayout,
    skip_rows: u64,
}

impl<R: Read> RideReader<R> {
    pub fn new(reader: R, layout: StationLayout, skip_rows: u64) -> Self {
        let rows = ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader)
            .into_records();
        Self {
            rows,
            layout,
            skip_rows,
        }
    }
}

impl<R: Read> Iterator for RideReader<R> {
    type Item = Result<RideRecord, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let row = match self.rows.next()? {
                Ok(row) => row,
                Err(e) => return Some(Err(e.into())),
            };
            let line = row.position().map(|p| p.line()).unwrap_or(0);
            if line <= self.skip_rows {
                continue;
            }
            return Some(parse_ride(&row, line, &self.layout));
        }
    }
}

/// Reads ride records with the default station layout and preamble.
pub fn read_rides<R: Read>(reader: R) -> RideReader<R> {
    RideReader::new(reader, StationLayout::default(), DEFAULT_SKIP_ROWS)
}

fn required<'r>(
    row: &'r StringRecord,
    idx: usize,
    column: &str,
    line: u64,
) -> Result<&'r str, ParseError> {
    let field = row.get(idx).ok_or_else(|| ParseError::MissingColumn {
        line,
        column: column.to_string(),
    })?;
    if field.is_empty() {
        return Err(ParseError::EmptyField {
            line,
            column: column.to_string(),
        });
    }
    Ok(field)
}

/// Decomposes one row into time, origin and per-station counts.
pub fn parse_ride(
    row: &StringRecord,
    line: u64,
    layout: &StationLayout,
) -> Result<RideRecord, ParseError> {
    let time = required(row, 0, "TIME", line)?;
    let origin = required(row, 1, "FROM", line)?;

    let expected = layout.len() + 2;
    // a trailing delimiter leaves empty fields behind, which are harmless
    if row.iter().skip(expected).any(|f| !f.is_empty()) {
        return Err(ParseError::ExtraColumns {
            line,
            expected,
            found: row.len(),
        });
    }

    let mut destinations = IndexMap::with_capacity(layout.len());
    for (i, station) in layout.columns().iter().enumerate() {
        let field = row.get(i + 2).ok_or_else(|| ParseError::MissingColumn {
            line,
            column: station.to_string(),
        })?;
        let count: u64 = field.parse().map_err(|_| ParseError::InvalidCount {
            line,
            column: station.to_string(),
            value: field.to_string(),
        })?;
        destinations.insert(station.clone(), count);
    }

    Ok(RideRecord::new(time, Station::new(origin), destinations).at_line(line))
}

/// Reads `time metric value` lines from a simulation run.
///
/// Double quotes are stripped before splitting; blank lines are skipped.
#[tracing::instrument(skip_all)]
pub fn read_eval_data<R: Read>(reader: R) -> Result<EvalData, EvalError> {
    let mut data = EvalData::default();

    for (idx, line) in BufReader::new(reader).lines().enumerate() {
        let line_no = idx as u64 + 1;
        let line = line?;
        let line = line.trim().replace('"', "");
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        let [time, metric, value] = fields[..] else {
            return Err(EvalError::Parse {
                line: line_no,
                reason: format!("expected `time metric value`, found {} fields", fields.len()),
            });
        };
        let value: f64 = value.parse().map_err(|_| EvalError::Parse {
            line: line_no,
            reason: format!("`{value}` is not a number"),
        })?;

        data.insert(time, metric, value);
    }

    debug!(
        times = data.time_count(),
        metrics = data.series().len(),
        "Evaluation data loaded"
    );
    Ok(data)
}

/// Counts the values of a one-number-per-line log.
///
/// Values must be finite and within `0.0..=MAX_VALUE`.
#[tracing::instrument(skip_all)]
pub fn read_values<R: Read>(reader: R) -> Result<ValueCounts, ParseError> {
    let mut counts = ValueCounts::default();

    for (idx, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        let raw = line.trim();
        if raw.is_empty() {
            continue;
        }

        let invalid = || ParseError::InvalidValue {
            line: idx as u64 + 1,
            value: raw.to_string(),
        };
        let value: f64 = raw.parse().map_err(|_| invalid())?;
        if !counts.add(value) {
            return Err(invalid());
        }
    }

    debug!(distinct = counts.len(), "Values loaded");
    Ok(counts)
}
