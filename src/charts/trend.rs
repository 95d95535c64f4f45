//! Trend Data Module
//! Builds the cumulative cases/deaths series for one location.

use crate::data::{
    date_to_days, days_to_date, DataProcessor, ProcessorError, DATE, TOTAL_CASES, TOTAL_DEATHS,
};
use chrono::{Datelike, Months, NaiveDate};
use polars::prelude::*;

pub const CASES_LABEL: &str = "Total Cases";
pub const DEATHS_LABEL: &str = "Total Deaths";

/// Series colors (matplotlib's first two defaults).
pub const CASES_RGB: (u8, u8, u8) = (31, 119, 180);
pub const DEATHS_RGB: (u8, u8, u8) = (255, 127, 14);

/// Candidate tick spacings in days; the monthly ones are aligned to month starts.
const DAY_STEPS: [i32; 4] = [1, 2, 7, 14];
const MONTH_STEPS: [u32; 6] = [1, 2, 3, 6, 12, 24];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl TrendPoint {
    /// Plot coordinates: x is the day number used by the date axis.
    pub fn xy(&self) -> [f64; 2] {
        [date_to_days(self.date) as f64, self.value]
    }
}

/// Cases and deaths over time for one location.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendChart {
    pub entity: String,
    pub total_cases: Vec<TrendPoint>,
    pub total_deaths: Vec<TrendPoint>,
}

impl TrendChart {
    /// Select the location's rows from the cleaned observations. An unknown
    /// location yields an empty chart.
    pub fn from_observations(cleaned: &DataFrame, entity: &str) -> Result<Self, ProcessorError> {
        DataProcessor::require_columns(cleaned, &[DATE, TOTAL_CASES, TOTAL_DEATHS])?;
        let rows = DataProcessor::country_rows(cleaned, entity)?;

        if rows.height() == 0 {
            tracing::warn!(entity, "No rows match the selected location, chart will be empty");
        }

        let days = rows.column(DATE)?.cast(&DataType::Int32)?;
        let dates: Vec<Option<NaiveDate>> = days
            .i32()?
            .iter()
            .map(|d| d.and_then(days_to_date))
            .collect();

        let cases = rows.column(TOTAL_CASES)?.cast(&DataType::Float64)?;
        let deaths = rows.column(TOTAL_DEATHS)?.cast(&DataType::Float64)?;

        let chart = Self {
            entity: entity.to_string(),
            total_cases: Self::series(&dates, cases.f64()?),
            total_deaths: Self::series(&dates, deaths.f64()?),
        };
        tracing::debug!(
            entity,
            cases = chart.total_cases.len(),
            deaths = chart.total_deaths.len(),
            "Built trend series"
        );
        Ok(chart)
    }

    /// Pair dates with values, dropping nulls. Rows are date ordered; repeated
    /// dates collapse to their mean.
    fn series(dates: &[Option<NaiveDate>], values: &Float64Chunked) -> Vec<TrendPoint> {
        let mut points: Vec<TrendPoint> = Vec::new();
        let mut repeats = 1.0;

        for (date, value) in dates.iter().zip(values.iter()) {
            let (Some(date), Some(value)) = (*date, value) else {
                continue;
            };
            if value.is_nan() {
                continue;
            }
            match points.last_mut() {
                Some(last) if last.date == date => {
                    repeats += 1.0;
                    last.value += (value - last.value) / repeats;
                }
                _ => {
                    repeats = 1.0;
                    points.push(TrendPoint { date, value });
                }
            }
        }
        points
    }

    pub fn title(&self) -> String {
        format!("COVID-19 Trend in {}", self.entity)
    }

    pub fn is_empty(&self) -> bool {
        self.total_cases.is_empty() && self.total_deaths.is_empty()
    }

    /// Day-number range covered by either series.
    pub fn x_range(&self) -> Option<(f64, f64)> {
        self.points()
            .map(|p| p.xy()[0])
            .fold(None, |acc, x| match acc {
                None => Some((x, x)),
                Some((lo, hi)) => Some((lo.min(x), hi.max(x))),
            })
    }

    pub fn y_max(&self) -> f64 {
        self.points().map(|p| p.value).fold(0.0, f64::max)
    }

    fn points(&self) -> impl Iterator<Item = &TrendPoint> {
        self.total_cases.iter().chain(self.total_deaths.iter())
    }
}

/// Tick positions and labels for a day-number axis, at most `max_ticks` of
/// them. Short spans get daily or weekly ticks, longer ones month starts.
pub fn date_ticks(min_day: f64, max_day: f64, max_ticks: usize) -> Vec<(f64, String)> {
    if !min_day.is_finite() || !max_day.is_finite() || max_day < min_day || max_ticks == 0 {
        return Vec::new();
    }
    let span = max_day - min_day;
    let first = min_day.ceil() as i32;
    let last = max_day.floor() as i32;

    if let Some(step) = DAY_STEPS
        .iter()
        .copied()
        .find(|step| span / (*step as f64) <= max_ticks as f64)
    {
        let start = first.div_euclid(step) * step + if first.rem_euclid(step) == 0 { 0 } else { step };
        return (start..=last)
            .step_by(step as usize)
            .filter_map(|day| Some((day as f64, days_to_date(day)?.format("%Y-%m-%d").to_string())))
            .collect();
    }

    let months = span / 30.44;
    let step = MONTH_STEPS
        .iter()
        .copied()
        .find(|step| months / (*step as f64) <= max_ticks as f64)
        .unwrap_or_else(|| ((months / max_ticks as f64).ceil() as u32).max(1));

    let (Some(first_date), Some(last_date)) = (days_to_date(first), days_to_date(last)) else {
        return Vec::new();
    };
    let Some(mut tick) = first_month_start(first_date, step) else {
        return Vec::new();
    };

    let mut ticks = Vec::new();
    while tick <= last_date {
        ticks.push((date_to_days(tick) as f64, tick.format("%Y-%m").to_string()));
        match tick.checked_add_months(Months::new(step)) {
            Some(next) => tick = next,
            None => break,
        }
    }
    ticks
}

/// First month start on or after `date` whose month index is a multiple of
/// `step` (so 3-month ticks land on quarters).
fn first_month_start(date: NaiveDate, step: u32) -> Option<NaiveDate> {
    let mut index = date.year() * 12 + date.month0() as i32;
    if date.day() != 1 {
        index += 1;
    }
    let step = step as i32;
    let rem = index.rem_euclid(step);
    if rem != 0 {
        index += step - rem;
    }
    NaiveDate::from_ymd_opt(index.div_euclid(12), index.rem_euclid(12) as u32 + 1, 1)
}

/// Short axis labels: 1.2M, 350k.
pub fn format_compact(value: f64) -> String {
    let abs = value.abs();
    let (scaled, suffix) = if abs >= 1e9 {
        (value / 1e9, "B")
    } else if abs >= 1e6 {
        (value / 1e6, "M")
    } else if abs >= 1e3 {
        (value / 1e3, "k")
    } else {
        (value, "")
    };
    let text = format!("{scaled:.1}");
    let text = text.strip_suffix(".0").unwrap_or(&text);
    format!("{text}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn cleaned() -> DataFrame {
        let df = df!(
            "continent" => ["Asia", "Asia", "Asia", "Africa"],
            "location" => ["India", "India", "India", "Kenya"],
            "iso_code" => ["IND", "IND", "IND", "KEN"],
            "date" => ["2021-01-02", "2021-01-01", "2021-01-03", "2021-01-01"],
            "total_cases" => [Some(150.0), Some(100.0), None, Some(5.0)],
            "total_deaths" => [Some(2.0), Some(1.0), Some(4.0), Some(0.0)]
        )
        .unwrap();
        DataProcessor::clean(df).unwrap()
    }

    #[test]
    fn test_series_in_chronological_order() {
        let chart = TrendChart::from_observations(&cleaned(), "India").unwrap();
        assert_eq!(
            chart.total_cases,
            vec![
                TrendPoint { date: ymd(2021, 1, 1), value: 100.0 },
                TrendPoint { date: ymd(2021, 1, 2), value: 150.0 },
            ]
        );
        assert_eq!(chart.total_deaths.len(), 3);
        assert_eq!(chart.total_deaths[2].value, 4.0);
        assert_eq!(chart.title(), "COVID-19 Trend in India");
    }

    #[test]
    fn test_unknown_entity_gives_empty_chart() {
        let chart = TrendChart::from_observations(&cleaned(), "Narnia").unwrap();
        assert!(chart.is_empty());
        assert!(chart.x_range().is_none());
        assert_eq!(chart.y_max(), 0.0);
    }

    #[test]
    fn test_duplicate_dates_are_averaged() {
        let df = df!(
            "continent" => ["Asia", "Asia", "Asia"],
            "location" => ["India", "India", "India"],
            "iso_code" => ["IND", "IND", "IND"],
            "date" => ["2021-01-01", "2021-01-01", "2021-01-01"],
            "total_cases" => [10.0, 20.0, 60.0],
            "total_deaths" => [1.0, 1.0, 1.0]
        )
        .unwrap();
        let chart = TrendChart::from_observations(&DataProcessor::clean(df).unwrap(), "India").unwrap();
        assert_eq!(chart.total_cases.len(), 1);
        assert!((chart.total_cases[0].value - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_ranges() {
        let chart = TrendChart::from_observations(&cleaned(), "India").unwrap();
        let start = date_to_days(ymd(2021, 1, 1)) as f64;
        assert_eq!(chart.x_range(), Some((start, start + 2.0)));
        assert_eq!(chart.y_max(), 150.0);
    }

    #[test]
    fn test_daily_ticks_for_short_span() {
        let start = date_to_days(ymd(2021, 1, 1)) as f64;
        let ticks = date_ticks(start, start + 3.0, 8);
        let labels: Vec<&str> = ticks.iter().map(|(_, l)| l.as_str()).collect();
        assert_eq!(labels, ["2021-01-01", "2021-01-02", "2021-01-03", "2021-01-04"]);
    }

    #[test]
    fn test_monthly_ticks_for_long_span() {
        let start = date_to_days(ymd(2020, 1, 22)) as f64;
        let end = date_to_days(ymd(2022, 1, 10)) as f64;
        let ticks = date_ticks(start, end, 8);

        assert!(!ticks.is_empty() && ticks.len() <= 9);
        assert!(ticks.windows(2).all(|w| w[0].0 < w[1].0));
        assert!(ticks.iter().all(|(_, l)| l.len() == 7));
        assert_eq!(ticks[0].1, "2020-04");
    }

    #[test]
    fn test_format_compact() {
        assert_eq!(format_compact(0.0), "0");
        assert_eq!(format_compact(950.0), "950");
        assert_eq!(format_compact(350_000.0), "350k");
        assert_eq!(format_compact(1_240_000.0), "1.2M");
        assert_eq!(format_compact(103_000_000.0), "103M");
        assert_eq!(format_compact(2e9), "2B");
    }
}
