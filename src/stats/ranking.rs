//! Ranking Module
//! Top-N selection with an explicit nulls-last, stable tie-break policy.

use crate::data::{DataProcessor, ProcessorError, LOCATION};
use polars::prelude::*;
use std::cmp::Ordering;

/// One row of a ranking table.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    pub location: String,
    pub value: Option<f64>,
}

/// Handles ranking calculations.
pub struct Ranking;

impl Ranking {
    /// The `n` locations with the largest `metric`, descending.
    ///
    /// Nulls and NaN rank below every number. Equal values keep their snapshot
    /// order. Fewer than `n` rows are returned when the snapshot is smaller.
    pub fn top_n(
        snapshot: &DataFrame,
        metric: &str,
        n: usize,
    ) -> Result<Vec<RankedEntry>, ProcessorError> {
        DataProcessor::require_columns(snapshot, &[LOCATION, metric])?;

        let locations = snapshot.column(LOCATION)?.cast(&DataType::String)?;
        let values = snapshot.column(metric)?.cast(&DataType::Float64)?;

        let mut entries: Vec<RankedEntry> = locations
            .str()?
            .iter()
            .zip(values.f64()?.iter())
            .map(|(location, value)| RankedEntry {
                location: location.unwrap_or_default().to_string(),
                value: value.filter(|v| !v.is_nan()),
            })
            .collect();

        // sort_by is stable, which gives the input-order tie-break.
        entries.sort_by(|a, b| Self::descending_nulls_last(a.value, b.value));
        entries.truncate(n);
        Ok(entries)
    }

    fn descending_nulls_last(a: Option<f64>, b: Option<f64>) -> Ordering {
        match (a, b) {
            (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}
