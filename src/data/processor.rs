//! Data Processor Module
//! Cleaning (continent filter, date normalization) and the latest-snapshot
//! aggregation.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use thiserror::Error;

pub const CONTINENT: &str = "continent";
pub const LOCATION: &str = "location";
pub const ISO_CODE: &str = "iso_code";
pub const DATE: &str = "date";
pub const TOTAL_CASES: &str = "total_cases";
pub const TOTAL_DEATHS: &str = "total_deaths";

/// Columns the pipeline reads. Everything else passes through untouched.
pub const REQUIRED_COLUMNS: [&str; 6] =
    [CONTINENT, LOCATION, ISO_CODE, DATE, TOTAL_CASES, TOTAL_DEATHS];

const ROW_INDEX: &str = "__row_index";

/// 1970-01-01 counted from 0001-01-01 (day 1).
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Missing column: {0}")]
    MissingColumn(String),
    #[error("Unparseable date {value:?} in row {row}")]
    DateParse { row: usize, value: String },
}

/// Convert a calendar date to the Polars `Date` physical value.
pub fn date_to_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

/// Inverse of [`date_to_days`].
pub fn days_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?)
}

/// Parse one textual date. Date-times keep only their date part.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Handles data cleaning and aggregation operations.
pub struct DataProcessor;

impl DataProcessor {
    /// Fail with `MissingColumn` on the first absent column.
    pub fn require_columns(df: &DataFrame, columns: &[&str]) -> Result<(), ProcessorError> {
        let schema = df.schema();
        match columns.iter().find(|name| !schema.contains(name)) {
            Some(missing) => Err(ProcessorError::MissingColumn(missing.to_string())),
            None => Ok(()),
        }
    }

    /// Full cleaning pass: column check, continent filter, date normalization.
    pub fn clean(df: DataFrame) -> Result<DataFrame, ProcessorError> {
        Self::require_columns(&df, &REQUIRED_COLUMNS)?;

        let before = df.height();
        let df = Self::filter_continent(df)?;
        tracing::debug!(
            kept = df.height(),
            dropped = before - df.height(),
            "Dropped aggregate rows without a continent"
        );

        Self::normalize_dates(df)
    }

    /// Keep only rows with a continent. Aggregates such as "World" or income
    /// groups have none.
    pub fn filter_continent(df: DataFrame) -> Result<DataFrame, ProcessorError> {
        Self::require_columns(&df, &[CONTINENT])?;
        let filtered = df.lazy().filter(col(CONTINENT).is_not_null()).collect()?;
        Ok(filtered)
    }

    /// Replace the textual date column with a Polars `Date` column.
    ///
    /// Nulls stay null; any other unparseable value is an error.
    pub fn normalize_dates(mut df: DataFrame) -> Result<DataFrame, ProcessorError> {
        Self::require_columns(&df, &[DATE])?;

        if df.column(DATE)?.dtype() == &DataType::Date {
            return Ok(df);
        }

        let days: Vec<Option<i32>> = {
            let text = df.column(DATE)?.cast(&DataType::String)?;
            text.str()?
                .iter()
                .enumerate()
                .map(|(row, value)| match value {
                    None => Ok(None),
                    Some(raw) => parse_date(raw).map(|d| Some(date_to_days(d))).ok_or_else(
                        || ProcessorError::DateParse {
                            row,
                            value: raw.to_string(),
                        },
                    ),
                })
                .collect::<Result<_, _>>()?
        };

        let dates = Series::new(DATE.into(), days).cast(&DataType::Date)?;
        df.with_column(dates)?;
        Ok(df)
    }

    /// One row per location: the last row after a stable ascending sort by
    /// date, so the latest date wins and duplicate latest dates resolve to the
    /// row that came last in the input. Null dates sort first.
    ///
    /// Column order of the input is preserved; groups keep first-appearance
    /// order. Rows without a location are dropped.
    pub fn latest_snapshot(df: &DataFrame) -> Result<DataFrame, ProcessorError> {
        Self::require_columns(df, &[LOCATION, DATE])?;

        let column_order: Vec<Expr> = df
            .get_column_names()
            .into_iter()
            .map(|name| col(name.clone()))
            .collect();

        let snapshot = df
            .clone()
            .lazy()
            .filter(col(LOCATION).is_not_null())
            .with_row_index(ROW_INDEX, None)
            .sort_by_exprs(
                [col(DATE), col(ROW_INDEX)],
                SortMultipleOptions::default()
                    .with_nulls_last(false)
                    .with_maintain_order(true),
            )
            .group_by_stable([col(LOCATION)])
            .agg([all().last()])
            .select(column_order)
            .collect()?;

        tracing::info!(locations = snapshot.height(), "Built latest snapshot");
        Ok(snapshot)
    }

    /// Rows of a single location, exact case-sensitive match, oldest first.
    pub fn country_rows(df: &DataFrame, entity: &str) -> Result<DataFrame, ProcessorError> {
        Self::require_columns(df, &[LOCATION, DATE])?;

        let rows = df
            .clone()
            .lazy()
            .filter(col(LOCATION).eq(lit(entity)))
            .sort_by_exprs(
                [col(DATE)],
                SortMultipleOptions::default()
                    .with_nulls_last(true)
                    .with_maintain_order(true),
            )
            .collect()?;
        Ok(rows)
    }
}
