//! Charts module - Trend and choropleth data, plotting and rendering

pub mod choropleth;
pub mod geo;
mod plotter;
mod renderer;
pub mod trend;

pub use choropleth::ChoroplethMap;
pub use geo::{GeometryError, WorldGeometry};
pub use plotter::ChartPlotter;
pub use renderer::{RenderError, RenderedMap, StaticChartRenderer};
pub use trend::TrendChart;
