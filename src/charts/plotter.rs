//! Chart Plotter Module
//! Draws the interactive trend chart with egui_plot.

use crate::charts::trend::{
    date_ticks, format_compact, TrendChart, TrendPoint, CASES_LABEL, CASES_RGB, DEATHS_LABEL,
    DEATHS_RGB,
};
use crate::data::days_to_date;
use egui::epaint::TextShape;
use egui::{pos2, vec2, Align2, Color32, FontId, Sense, Stroke};
use egui_plot::{Legend, Line, Plot, PlotPoint, PlotPoints};
use std::f32::consts::FRAC_PI_4;

/// Height reserved under the plot for the rotated date labels and axis title.
const DATE_LABEL_STRIP: f32 = 90.0;
const MAX_DATE_TICKS: usize = 10;

pub const CASES_COLOR: Color32 = Color32::from_rgb(CASES_RGB.0, CASES_RGB.1, CASES_RGB.2);
pub const DEATHS_COLOR: Color32 = Color32::from_rgb(DEATHS_RGB.0, DEATHS_RGB.1, DEATHS_RGB.2);

/// Creates the trend visualization using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    fn plot_points(points: &[TrendPoint]) -> PlotPoints {
        points.iter().map(TrendPoint::xy).collect()
    }

    /// Line chart of both series sharing one plot area, with a legend and
    /// date tick labels rotated 45 degrees under the x axis.
    pub fn draw_trend_chart(ui: &mut egui::Ui, chart: &TrendChart) {
        let plot_height = (ui.available_height() - DATE_LABEL_STRIP).max(120.0);

        let response = Plot::new(format!("trend_{}", chart.entity))
            .height(plot_height)
            .legend(Legend::default())
            .show_axes([false, true])
            .y_axis_label("Count")
            .y_axis_formatter(|mark, _range| format_compact(mark.value))
            .include_y(0.0)
            .label_formatter(|name, value| {
                let date = days_to_date(value.x.round() as i32)
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default();
                if name.is_empty() {
                    date
                } else {
                    format!("{name}\n{date}\n{:.0}", value.y)
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(Self::plot_points(&chart.total_cases))
                        .color(CASES_COLOR)
                        .width(2.0)
                        .name(CASES_LABEL),
                );
                plot_ui.line(
                    Line::new(Self::plot_points(&chart.total_deaths))
                        .color(DEATHS_COLOR)
                        .width(2.0)
                        .name(DEATHS_LABEL),
                );
            });

        let transform = response.transform;
        let frame = *transform.frame();
        let bounds = transform.bounds();

        let (strip, _) =
            ui.allocate_exact_size(vec2(ui.available_width(), DATE_LABEL_STRIP), Sense::hover());
        let painter = ui.painter();
        let text_color = ui.visuals().text_color();
        let axis_stroke = Stroke::new(1.0, ui.visuals().weak_text_color());

        painter.line_segment([frame.left_bottom(), frame.right_bottom()], axis_stroke);

        let (sin, cos) = (-FRAC_PI_4).sin_cos();
        for (day, label) in date_ticks(bounds.min()[0], bounds.max()[0], MAX_DATE_TICKS) {
            let x = transform.position_from_point(&PlotPoint::new(day, bounds.min()[1])).x;
            if x < frame.left() || x > frame.right() {
                continue;
            }
            painter.line_segment(
                [pos2(x, frame.bottom()), pos2(x, frame.bottom() + 5.0)],
                axis_stroke,
            );

            // The label ends at the tick and rises to the right.
            let galley = painter.layout_no_wrap(label, FontId::proportional(11.0), text_color);
            let width = galley.size().x;
            let anchor = pos2(x, frame.bottom() + 8.0);
            let pos = anchor - vec2(width * cos, width * sin);
            painter.add(TextShape::new(pos, galley, text_color).with_angle(-FRAC_PI_4));
        }

        painter.text(
            pos2(frame.center().x, strip.bottom() - 2.0),
            Align2::CENTER_BOTTOM,
            "Date",
            FontId::proportional(13.0),
            text_color,
        );
    }
}
