//! Static Chart Renderer
//! Draws the choropleth into an in-memory RGB buffer and exports the trend
//! chart as PNG, both with plotters.
//!
//! Map layout:
//! 1. Title centered on top
//! 2. Equirectangular world map: grey land, shaded countries, outlines
//! 3. Vertical color bar for total_cases on the right

use crate::charts::choropleth::{ChoroplethMap, ColorScale};
use crate::charts::trend::{
    date_ticks, format_compact, TrendChart, TrendPoint, CASES_LABEL, CASES_RGB, DEATHS_LABEL,
    DEATHS_RGB,
};
use crate::data::{days_to_date, TOTAL_CASES};
use geo::LineString;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::ReverseCoordTranslate;
use plotters::prelude::*;
use std::path::Path;
use thiserror::Error;

const LAND: RGBColor = RGBColor(229, 229, 229);
const BORDER: RGBColor = RGBColor(255, 255, 255);
const COLOR_BAR_WIDTH: u32 = 120;
const COLOR_BAR_STEPS: usize = 100;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Drawing failed: {0}")]
    Draw(String),
    #[error("Window error: {0}")]
    Window(String),
    #[error("Image export failed: {0}")]
    Image(#[from] image::ImageError),
}

fn draw_err<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Draw(e.to_string())
}

fn rgb((r, g, b): (u8, u8, u8)) -> RGBColor {
    RGBColor(r, g, b)
}

/// A rasterized map plus the pixel to lon/lat mapping used for hovering.
pub struct RenderedMap {
    pub width: u32,
    pub height: u32,
    /// Row-major RGB8.
    pub pixels: Vec<u8>,
    coord: Cartesian2d<RangedCoordf64, RangedCoordf64>,
}

impl RenderedMap {
    /// Lon/lat under an image pixel, if the pixel is inside the map frame.
    pub fn lon_lat_at(&self, x: f32, y: f32) -> Option<(f64, f64)> {
        let (lon, lat) = self.coord.reverse_translate((x.round() as i32, y.round() as i32))?;
        ((-180.0..=180.0).contains(&lon) && (-90.0..=90.0).contains(&lat)).then_some((lon, lat))
    }

    pub fn save_png(&self, path: &Path) -> Result<(), RenderError> {
        image::save_buffer(
            path,
            &self.pixels,
            self.width,
            self.height,
            image::ExtendedColorType::Rgb8,
        )?;
        Ok(())
    }
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Rasterize the choropleth at `width` x `height` pixels.
    pub fn render_map(
        map: &ChoroplethMap,
        (width, height): (u32, u32),
    ) -> Result<RenderedMap, RenderError> {
        let mut pixels = vec![255u8; width as usize * height as usize * 3];

        let coord = {
            let root = BitMapBackend::with_buffer(&mut pixels, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(draw_err)?;

            let (map_area, bar_area) =
                root.split_horizontally(width.saturating_sub(COLOR_BAR_WIDTH) as i32);

            let mut chart = ChartBuilder::on(&map_area)
                .caption(&map.title, ("sans-serif", 24))
                .margin(10)
                .build_cartesian_2d(-180f64..180f64, -90f64..90f64)
                .map_err(draw_err)?;

            Self::draw_countries(&mut chart, map)?;
            Self::draw_color_bar(&bar_area, &map.scale)?;

            let coord = chart.as_coord_spec().clone();
            root.present().map_err(draw_err)?;
            coord
        };

        tracing::debug!(width, height, regions = map.regions.len(), "Rendered map");
        Ok(RenderedMap {
            width,
            height,
            pixels,
            coord,
        })
    }

    /// Unshaded land first, then data countries largest first so enclaves
    /// end up on top of the country around them, then the outlines.
    fn draw_countries<DB: DrawingBackend>(
        chart: &mut ChartContext<'_, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
        map: &ChoroplethMap,
    ) -> Result<(), RenderError> {
        for shape in &map.land {
            chart
                .draw_series(
                    shape
                        .geometry
                        .iter()
                        .map(|p| Polygon::new(Self::ring(p.exterior()), LAND.filled())),
                )
                .map_err(draw_err)?;
        }
        for region in &map.regions {
            let fill = rgb(map.region_color(region));
            chart
                .draw_series(
                    region
                        .shape
                        .geometry
                        .iter()
                        .map(|p| Polygon::new(Self::ring(p.exterior()), fill.filled())),
                )
                .map_err(draw_err)?;
        }
        for shape in &map.land {
            chart
                .draw_series(shape.geometry.iter().map(|p| {
                    PathElement::new(Self::ring(p.exterior()), BORDER.stroke_width(1))
                }))
                .map_err(draw_err)?;
        }
        Ok(())
    }

    /// GeoJSON rings are closed, so the outline needs no extra point.
    fn ring(ring: &LineString<f64>) -> Vec<(f64, f64)> {
        ring.coords().map(|c| (c.x, c.y)).collect()
    }

    fn draw_color_bar<DB: DrawingBackend>(
        area: &DrawingArea<DB, plotters::coord::Shift>,
        scale: &ColorScale,
    ) -> Result<(), RenderError> {
        let (lo, hi) = if scale.max > scale.min {
            (scale.min, scale.max)
        } else {
            (scale.min, scale.min + 1.0)
        };

        let mut bar = ChartBuilder::on(area)
            .caption(TOTAL_CASES, ("sans-serif", 14))
            .margin_top(50)
            .margin_bottom(40)
            .margin_right(30)
            .y_label_area_size(60)
            .build_cartesian_2d(0f64..1f64, lo..hi)
            .map_err(draw_err)?;

        bar.configure_mesh()
            .disable_x_mesh()
            .disable_y_mesh()
            .disable_x_axis()
            .y_labels(6)
            .y_label_formatter(&|v| format_compact(*v))
            .draw()
            .map_err(draw_err)?;

        let step = (hi - lo) / COLOR_BAR_STEPS as f64;
        bar.draw_series((0..COLOR_BAR_STEPS).map(|i| {
            let v0 = lo + step * i as f64;
            let color = rgb(ColorScale::color_at(i as f64 / (COLOR_BAR_STEPS - 1) as f64));
            Rectangle::new([(0.0, v0), (1.0, v0 + step)], color.filled())
        }))
        .map_err(draw_err)?;
        Ok(())
    }

    /// Write the trend chart to a PNG file.
    pub fn render_trend_png(
        chart: &TrendChart,
        path: &Path,
        (width, height): (u32, u32),
    ) -> Result<(), RenderError> {
        let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let (x0, x1) = match chart.x_range() {
            Some((lo, hi)) if hi > lo => (lo, hi),
            Some((lo, _)) => (lo - 1.0, lo + 1.0),
            None => (0.0, 1.0),
        };
        let y_max = if chart.y_max() > 0.0 { chart.y_max() * 1.05 } else { 1.0 };

        let mut plot = ChartBuilder::on(&root)
            .caption(chart.title(), ("sans-serif", 22))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(80)
            .build_cartesian_2d(x0..x1, 0f64..y_max)
            .map_err(draw_err)?;

        let tick_count = date_ticks(x0, x1, 8).len().max(2);
        plot.configure_mesh()
            .x_desc("Date")
            .y_desc("Count")
            .x_labels(tick_count)
            .x_label_formatter(&|day| {
                days_to_date(day.round() as i32)
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default()
            })
            .y_label_formatter(&|v| format_compact(*v))
            .draw()
            .map_err(draw_err)?;

        for (points, label, color) in [
            (&chart.total_cases, CASES_LABEL, rgb(CASES_RGB)),
            (&chart.total_deaths, DEATHS_LABEL, rgb(DEATHS_RGB)),
        ] {
            plot.draw_series(LineSeries::new(
                points.iter().map(TrendPoint::xy).map(|[x, y]| (x, y)),
                color.stroke_width(2),
            ))
            .map_err(draw_err)?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        }

        plot.configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(draw_err)?;

        root.present().map_err(draw_err)?;
        tracing::info!(path = %path.display(), "Saved trend chart");
        Ok(())
    }
}
