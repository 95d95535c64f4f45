//! CSV Data Loader Module
//! Reads the observation CSV into a Polars DataFrame.

use polars::prelude::*;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Cannot read {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse CSV: {0}")]
    Parse(#[from] PolarsError),
}

/// Handles CSV file loading with Polars.
pub struct DataLoader;

impl DataLoader {
    /// Load a comma-separated file with a header row.
    ///
    /// The whole file is scanned for schema inference so that a numeric column
    /// whose first rows are empty is still typed as numeric. Dates stay text;
    /// they are normalized by the processor.
    pub fn load_csv(file_path: &Path) -> Result<DataFrame, LoaderError> {
        Self::check_readable(file_path)?;

        let df = LazyCsvReader::new(file_path)
            .with_has_header(true)
            .with_infer_schema_length(None)
            .finish()?
            .collect()?;

        tracing::info!(
            path = %file_path.display(),
            rows = df.height(),
            columns = df.width(),
            "Loaded CSV"
        );
        Ok(df)
    }

    fn check_readable(file_path: &Path) -> Result<(), LoaderError> {
        let access = |source| LoaderError::FileAccess {
            path: file_path.to_path_buf(),
            source,
        };

        let metadata = std::fs::metadata(file_path).map_err(access)?;
        if metadata.is_dir() {
            return Err(access(io::Error::new(
                io::ErrorKind::InvalidInput,
                "path is a directory",
            )));
        }
        File::open(file_path).map_err(access)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_csv_infers_columns() {
        let file = write_csv(
            "continent,location,iso_code,date,total_cases,total_deaths\n\
             Asia,India,IND,2021-01-01,100,1\n\
             Asia,India,IND,2021-01-02,150,\n",
        );

        let df = DataLoader::load_csv(file.path()).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 6);
        assert_eq!(df.column("date").unwrap().dtype(), &DataType::String);
        assert!(matches!(
            df.column("total_cases").unwrap().dtype(),
            DataType::Int64 | DataType::Float64
        ));
        assert_eq!(df.column("total_deaths").unwrap().null_count(), 1);
    }

    #[test]
    fn test_missing_file_is_file_access_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("owid-covid-data.csv");

        let err = DataLoader::load_csv(&missing).unwrap_err();
        assert!(matches!(err, LoaderError::FileAccess { .. }));
    }

    #[test]
    fn test_directory_is_file_access_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = DataLoader::load_csv(dir.path()).unwrap_err();
        assert!(matches!(err, LoaderError::FileAccess { .. }));
    }

    #[test]
    fn test_ragged_rows_are_parse_error() {
        let file = write_csv("location,date\nIndia,2021-01-01,extra,fields\n");
        let err = DataLoader::load_csv(file.path()).unwrap_err();
        assert!(matches!(err, LoaderError::Parse(_)));
    }
}
