use crate::analyzers::types::{AggregateResult, RideRecord};
use crate::error::ParseError;
use tracing::{debug, warn};

impl AggregateResult {
    /// Folds one record into the four mappings.
    ///
    /// Origin and time totals are touched even when the row sums to zero;
    /// zero counts never create pair or destination entries. Every mapping
    /// entry is bounded by the running rider total, so checking that total
    /// first leaves the result unchanged when a record would overflow.
    pub fn add(&mut self, record: &RideRecord) -> Result<(), ParseError> {
        let overflow = || ParseError::CountOverflow {
            line: record.line(),
        };
        let row_total = record.total().ok_or_else(overflow)?;
        let riders = self.riders.checked_add(row_total).ok_or_else(overflow)?;

        self.origin_totals.add(record.origin().clone(), row_total);
        self.time_totals.add(record.time().to_string(), row_total);

        for (destination, &count) in record.destinations() {
            if count == 0 {
                continue;
            }
            self.destination_totals.add(destination.clone(), count);
            self.pair_counts
                .add((record.origin().clone(), destination.clone()), count);
        }

        self.riders = riders;
        self.records += 1;
        Ok(())
    }
}

/// Aggregates ride records into pair, origin, destination and time totals.
///
/// Fails only when the rider counts overflow `u64`.
pub fn aggregate<I>(records: I) -> Result<AggregateResult, ParseError>
where
    I: IntoIterator<Item = RideRecord>,
{
    let mut result = AggregateResult::default();
    for record in records {
        result.add(&record)?;
    }
    Ok(result)
}

/// Aggregates a fallible record stream, aborting on the first [`ParseError`].
///
/// An empty stream is not an error: the result is four empty mappings and a
/// warning is logged.
#[tracing::instrument(skip_all)]
pub fn try_aggregate<I>(records: I) -> Result<AggregateResult, ParseError>
where
    I: IntoIterator<Item = Result<RideRecord, ParseError>>,
{
    let mut result = AggregateResult::default();
    for record in records {
        result.add(&record?)?;
    }

    if result.records() == 0 {
        warn!("No ride records processed, aggregate is empty");
    } else {
        debug!(
            records = result.records(),
            origins = result.origin_totals().len(),
            destinations = result.destination_totals().len(),
            time_buckets = result.time_totals().len(),
            riders = result.riders(),
            "Aggregation complete"
        );
    }

    Ok(result)
}
