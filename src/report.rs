//! Insights Report
//! Prints the top-N case and death rankings as plain text tables.

use crate::data::{LOCATION, TOTAL_CASES, TOTAL_DEATHS};
use crate::error::AnalysisError;
use crate::stats::{RankedEntry, Ranking};
use polars::prelude::DataFrame;
use std::io::Write;

/// Write both ranking tables for the snapshot.
pub fn write_insights(
    out: &mut impl Write,
    snapshot: &DataFrame,
    n: usize,
) -> Result<(), AnalysisError> {
    let top_cases = Ranking::top_n(snapshot, TOTAL_CASES, n)?;
    let top_deaths = Ranking::top_n(snapshot, TOTAL_DEATHS, n)?;

    writeln!(out, "📊 Top {n} Countries by Total Cases:")?;
    write!(out, "{}", format_table(&top_cases, TOTAL_CASES))?;
    writeln!(out)?;
    writeln!(out, "💀 Top {n} Countries by Total Deaths:")?;
    write!(out, "{}", format_table(&top_deaths, TOTAL_DEATHS))?;
    Ok(())
}

/// Two-column table: a header row, then "<location> <value>" per entry.
/// Locations are left aligned, values right aligned.
pub fn format_table(entries: &[RankedEntry], metric: &str) -> String {
    let values: Vec<String> = entries.iter().map(|e| format_value(e.value)).collect();

    let name_width = entries
        .iter()
        .map(|e| e.location.chars().count())
        .chain(std::iter::once(LOCATION.len()))
        .max()
        .unwrap_or_default();
    let value_width = values
        .iter()
        .map(String::len)
        .chain(std::iter::once(metric.len()))
        .max()
        .unwrap_or_default();

    let mut table = format!("{LOCATION:<name_width$} {metric:>value_width$}\n");
    for (entry, value) in entries.iter().zip(&values) {
        table.push_str(&format!(
            "{:<name_width$} {value:>value_width$}\n",
            entry.location
        ));
    }
    table
}

/// Whole numbers print without a fractional part; nulls print as `NaN`.
pub fn format_value(value: Option<f64>) -> String {
    match value {
        None => "NaN".to_string(),
        Some(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{v:.0}"),
        Some(v) => v.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(Some(103436829.0)), "103436829");
        assert_eq!(format_value(Some(0.0)), "0");
        assert_eq!(format_value(Some(12.5)), "12.5");
        assert_eq!(format_value(None), "NaN");
    }

    #[test]
    fn test_format_table_alignment() {
        let entries = vec![
            RankedEntry {
                location: "United States".to_string(),
                value: Some(1200.0),
            },
            RankedEntry {
                location: "India".to_string(),
                value: Some(75.0),
            },
        ];

        let table = format_table(&entries, "total_cases");
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(
            lines,
            vec![
                "location      total_cases",
                "United States        1200",
                "India                  75",
            ]
        );
    }

    #[test]
    fn test_write_insights_labels_and_rows() {
        let snapshot = df!(
            "location" => ["India", "Kenya"],
            "total_cases" => [150.0, 20.0],
            "total_deaths" => [Some(2.0), None]
        )
        .unwrap();

        let mut out = Vec::new();
        write_insights(&mut out, &snapshot, 5).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "📊 Top 5 Countries by Total Cases:");
        assert_eq!(lines[1].split_whitespace().collect::<Vec<_>>(), ["location", "total_cases"]);
        assert_eq!(lines[2].split_whitespace().collect::<Vec<_>>(), ["India", "150"]);
        assert_eq!(lines[3].split_whitespace().collect::<Vec<_>>(), ["Kenya", "20"]);
        assert_eq!(lines[4], "");
        assert_eq!(lines[5], "💀 Top 5 Countries by Total Deaths:");
        assert_eq!(lines[7].split_whitespace().collect::<Vec<_>>(), ["India", "2"]);
        assert_eq!(lines[8].split_whitespace().collect::<Vec<_>>(), ["Kenya", "NaN"]);
        assert_eq!(lines.len(), 9);
    }
}
