//! GUI module - Native chart windows

mod app;
mod chart_viewer;
mod map_viewer;

use crate::charts::{ChoroplethMap, RenderError, TrendChart};

pub use app::NativeDisplay;
pub use chart_viewer::TrendViewer;
pub use map_viewer::MapViewer;

/// Where the pipeline sends its charts. Each call returns once the chart has
/// been dismissed.
pub trait ChartDisplay {
    fn show_trend(&mut self, chart: &TrendChart) -> Result<(), RenderError>;
    fn show_map(&mut self, map: &ChoroplethMap) -> Result<(), RenderError>;
}
