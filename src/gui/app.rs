//! Native Display
//! Opens each chart in its own eframe window, one after the other.

use crate::charts::{ChoroplethMap, RenderError, StaticChartRenderer, TrendChart};
use crate::config::AnalysisConfig;
use crate::gui::{ChartDisplay, MapViewer, TrendViewer};
use eframe::egui;
use std::path::{Path, PathBuf};

/// Space above the map image for the header bar.
const MAP_HEADER_HEIGHT: f32 = 48.0;

/// Shows charts in blocking native windows.
pub struct NativeDisplay {
    trend_window: [f32; 2],
    map_size: (u32, u32),
}

impl NativeDisplay {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            trend_window: config.trend_window,
            map_size: config.map_size,
        }
    }

    fn native_options(title: &str, size: [f32; 2]) -> eframe::NativeOptions {
        eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size(size)
                .with_min_inner_size([600.0, 400.0])
                .with_title(title),
            // Return from run_native when the window closes so the next
            // chart can open.
            run_and_return: true,
            ..Default::default()
        }
    }
}

impl ChartDisplay for NativeDisplay {
    fn show_trend(&mut self, chart: &TrendChart) -> Result<(), RenderError> {
        let title = chart.title();
        let options = Self::native_options(&title, self.trend_window);
        let viewer = TrendViewer::new(chart.clone());

        tracing::info!(entity = %chart.entity, "Opening trend window");
        eframe::run_native(&title, options, Box::new(move |_cc| Ok(Box::new(viewer))))
            .map_err(|e| RenderError::Window(e.to_string()))
    }

    fn show_map(&mut self, map: &ChoroplethMap) -> Result<(), RenderError> {
        let rendered = StaticChartRenderer::render_map(map, self.map_size)?;
        let (width, height) = self.map_size;
        let options = Self::native_options(
            &map.title,
            [width as f32, height as f32 + MAP_HEADER_HEIGHT],
        );
        let viewer = MapViewer::new(map.clone(), rendered);

        tracing::info!(regions = map.regions.len(), "Opening map window");
        eframe::run_native(&map.title, options, Box::new(move |_cc| Ok(Box::new(viewer))))
            .map_err(|e| RenderError::Window(e.to_string()))
    }
}

/// Ask for a PNG destination, write it, and open it with the system viewer.
/// Returns the status line to show; `None` when the dialog was cancelled.
pub(crate) fn export_png(
    default_name: &str,
    write: impl FnOnce(&Path) -> Result<(), RenderError>,
) -> Option<String> {
    let path: PathBuf = rfd::FileDialog::new()
        .add_filter("PNG Image", &["png"])
        .set_file_name(default_name)
        .save_file()?;

    let status = match write(&path) {
        Ok(()) => {
            if let Err(e) = open::that(&path) {
                tracing::warn!(path = %path.display(), error = %e, "Could not open exported image");
            }
            format!("Saved {}", path.display())
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "PNG export failed");
            format!("Export error: {e}")
        }
    };
    Some(status)
}
