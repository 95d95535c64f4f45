//! Trend Chart Viewer
//! Window showing the cases/deaths line chart for the selected location.

use crate::charts::{ChartPlotter, StaticChartRenderer, TrendChart};
use crate::gui::app::export_png;
use egui::{RichText, TopBottomPanel};

const EXPORT_SIZE: (u32, u32) = (1400, 800);

pub struct TrendViewer {
    chart: TrendChart,
    status: String,
}

impl TrendViewer {
    pub fn new(chart: TrendChart) -> Self {
        let status = if chart.is_empty() {
            format!("No data for \"{}\"", chart.entity)
        } else {
            String::new()
        };
        Self { chart, status }
    }

    fn handle_save_png(&mut self) {
        let chart = &self.chart;
        if let Some(status) = export_png("covid_trend.png", |path| {
            StaticChartRenderer::render_trend_png(chart, path, EXPORT_SIZE)
        }) {
            self.status = status;
        }
    }
}

impl eframe::App for TrendViewer {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut save_clicked = false;

        TopBottomPanel::top("trend_header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(RichText::new(self.chart.title()).strong());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    save_clicked = ui.button("💾 Save PNG").clicked();
                    ui.label(RichText::new(&self.status).weak());
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ChartPlotter::draw_trend_chart(ui, &self.chart);
        });

        if save_clicked {
            self.handle_save_png();
        }
    }
}
