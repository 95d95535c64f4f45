//! Data module - CSV loading, cleaning and aggregation

mod loader;
mod processor;

pub use loader::{DataLoader, LoaderError};
pub use processor::{
    date_to_days, days_to_date, DataProcessor, ProcessorError, DATE, ISO_CODE, LOCATION,
    TOTAL_CASES, TOTAL_DEATHS,
};
