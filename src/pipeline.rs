//! Analysis Pipeline
//! Loader -> cleaner -> {report, trend chart, world map}. Every intermediate
//! table is passed along explicitly.

use crate::charts::{ChoroplethMap, TrendChart, WorldGeometry};
use crate::config::AnalysisConfig;
use crate::data::{DataLoader, DataProcessor};
use crate::error::AnalysisError;
use crate::gui::ChartDisplay;
use crate::report;
use polars::prelude::DataFrame;
use std::io::{BufRead, Write};
use std::path::Path;

pub const BANNER: &str = "COVID-19 Data Analysis";
pub const ENTITY_PROMPT: &str = "Enter a country to view trend (e.g., India, Kenya, USA): ";
pub const MAP_NOTICE: &str = "Generating world map of total cases...";

/// Cleaned observations and the per-location snapshot derived from them.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub observations: DataFrame,
    pub snapshot: DataFrame,
}

/// Load and clean the CSV, then build the latest snapshot.
pub fn analyze(path: &Path) -> Result<Analysis, AnalysisError> {
    let raw = DataLoader::load_csv(path)?;
    let observations = DataProcessor::clean(raw)?;
    let snapshot = DataProcessor::latest_snapshot(&observations)?;
    Ok(Analysis {
        observations,
        snapshot,
    })
}

/// One full interactive run. The entity name is read from `input` after the
/// report has been written to `out`.
pub fn run(
    config: &AnalysisConfig,
    input: &mut impl BufRead,
    out: &mut impl Write,
    display: &mut impl ChartDisplay,
) -> Result<(), AnalysisError> {
    let analysis = analyze(&config.data_path)?;

    writeln!(out, "{BANNER}")?;
    report::write_insights(out, &analysis.snapshot, config.top_n)?;

    write!(out, "{ENTITY_PROMPT}")?;
    out.flush()?;
    let entity = read_entity(input)?;

    let trend = TrendChart::from_observations(&analysis.observations, &entity)?;
    display.show_trend(&trend)?;

    writeln!(out, "{MAP_NOTICE}")?;
    out.flush()?;
    let world = WorldGeometry::load(&config.geometry_path)?;
    let map = ChoroplethMap::build(&analysis.snapshot, &world)?;
    display.show_map(&map)?;

    tracing::info!("Analysis complete");
    Ok(())
}

/// One line without its line terminator. End of input reads as empty.
fn read_entity(input: &mut impl BufRead) -> Result<String, AnalysisError> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::geo::tests::WORLD;
    use crate::charts::RenderError;
    use crate::data::LoaderError;
    use std::fs;
    use std::io::Cursor;
    use std::path::PathBuf;

    #[derive(Default)]
    struct RecordingDisplay {
        trends: Vec<TrendChart>,
        maps: Vec<ChoroplethMap>,
    }

    impl ChartDisplay for RecordingDisplay {
        fn show_trend(&mut self, chart: &TrendChart) -> Result<(), RenderError> {
            self.trends.push(chart.clone());
            Ok(())
        }

        fn show_map(&mut self, map: &ChoroplethMap) -> Result<(), RenderError> {
            self.maps.push(map.clone());
            Ok(())
        }
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        config: AnalysisConfig,
    }

    fn fixture(csv: &str) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let data_path = dir.path().join("owid-covid-data.csv");
        let geometry_path = dir.path().join("countries.geojson");
        fs::write(&data_path, csv).unwrap();
        fs::write(&geometry_path, WORLD).unwrap();
        Fixture {
            config: AnalysisConfig {
                data_path,
                geometry_path,
                ..AnalysisConfig::default()
            },
            _dir: dir,
        }
    }

    const THREE_ROWS: &str = "iso_code,continent,location,date,total_cases,total_deaths,new_cases\n\
        IND,Asia,India,2021-01-01,100,3,100\n\
        OWID_WRL,,World,2021-01-01,1000,30,1000\n\
        KEN,Africa,Kenya,2021-01-01,40,1,40\n";

    fn run_with(fixture: &Fixture, entity: &str) -> (String, RecordingDisplay) {
        let mut input = Cursor::new(format!("{entity}\n"));
        let mut out = Vec::new();
        let mut display = RecordingDisplay::default();
        run(&fixture.config, &mut input, &mut out, &mut display).unwrap();
        (String::from_utf8(out).unwrap(), display)
    }

    #[test]
    fn test_aggregate_rows_are_excluded_from_snapshot_and_report() {
        let fixture = fixture(THREE_ROWS);
        let analysis = analyze(&fixture.config.data_path).unwrap();
        assert_eq!(analysis.snapshot.height(), 2);

        let (stdout, _) = run_with(&fixture, "India");
        let lines: Vec<&str> = stdout.lines().collect();
        assert_eq!(lines[0], BANNER);
        assert_eq!(lines[1], "📊 Top 5 Countries by Total Cases:");
        assert_eq!(lines[3].split_whitespace().collect::<Vec<_>>(), ["India", "100"]);
        assert_eq!(lines[4].split_whitespace().collect::<Vec<_>>(), ["Kenya", "40"]);
        assert_eq!(lines[6], "💀 Top 5 Countries by Total Deaths:");
        assert!(!stdout.contains("World"));
    }

    #[test]
    fn test_run_prints_prompt_and_map_notice_in_order() {
        let fixture = fixture(THREE_ROWS);
        let (stdout, display) = run_with(&fixture, "Kenya");

        let prompt = stdout.find(ENTITY_PROMPT).unwrap();
        let notice = stdout.find(MAP_NOTICE).unwrap();
        assert!(prompt < notice);
        assert_eq!(display.trends.len(), 1);
        assert_eq!(display.maps.len(), 1);
        assert_eq!(display.trends[0].entity, "Kenya");
    }

    #[test]
    fn test_trend_for_india_has_both_points_in_order() {
        let fixture = fixture(
            "continent,location,iso_code,date,total_cases,total_deaths\n\
             Asia,India,IND,2021-01-02,150,4\n\
             Asia,India,IND,2021-01-01,100,2\n",
        );
        let (_, display) = run_with(&fixture, "India");

        let values: Vec<f64> = display.trends[0].total_cases.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![100.0, 150.0]);
        assert!(display.trends[0].total_cases[0].date < display.trends[0].total_cases[1].date);
    }

    #[test]
    fn test_unknown_entity_renders_empty_chart() {
        let fixture = fixture(THREE_ROWS);
        let (_, display) = run_with(&fixture, "Atlantis");
        assert!(display.trends[0].is_empty());
        assert_eq!(display.maps.len(), 1);
    }

    #[test]
    fn test_entity_keeps_inner_whitespace_and_drops_crlf() {
        let mut input = Cursor::new("United States\r\n");
        assert_eq!(read_entity(&mut input).unwrap(), "United States");
        let mut empty = Cursor::new("");
        assert_eq!(read_entity(&mut empty).unwrap(), "");
    }

    #[test]
    fn test_map_only_shades_countries_with_shapes() {
        let fixture = fixture(THREE_ROWS);
        let (_, display) = run_with(&fixture, "India");
        let codes: Vec<&str> = display.maps[0].regions.iter().map(|r| r.iso_code.as_str()).collect();
        assert_eq!(codes.len(), 2);
        assert!(codes.contains(&"IND") && codes.contains(&"KEN"));
    }

    #[test]
    fn test_missing_input_file_aborts_before_output() {
        let config = AnalysisConfig {
            data_path: PathBuf::from("/nonexistent/owid-covid-data.csv"),
            ..AnalysisConfig::default()
        };
        let mut out = Vec::new();
        let err = run(
            &config,
            &mut Cursor::new("India\n"),
            &mut out,
            &mut RecordingDisplay::default(),
        )
        .unwrap_err();

        assert!(matches!(err, AnalysisError::Loader(LoaderError::FileAccess { .. })));
        assert!(out.is_empty());
    }

    #[test]
    fn test_missing_column_aborts_run() {
        let fixture = fixture("continent,location,date\nAsia,India,2021-01-01\n");
        let mut out = Vec::new();
        let err = run(
            &fixture.config,
            &mut Cursor::new("India\n"),
            &mut out,
            &mut RecordingDisplay::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AnalysisError::Processor(_)));
        assert!(out.is_empty());
    }
}
