//! Choropleth Map Viewer
//! Window showing the rendered world map with per-country hover details.

use crate::charts::{ChoroplethMap, RenderedMap};
use crate::gui::app::export_png;
use crate::report::format_value;
use egui::{ColorImage, RichText, Sense, TextureHandle, TextureOptions, TopBottomPanel};

pub struct MapViewer {
    map: ChoroplethMap,
    rendered: RenderedMap,
    texture: Option<TextureHandle>,
    status: String,
}

impl MapViewer {
    pub fn new(map: ChoroplethMap, rendered: RenderedMap) -> Self {
        Self {
            map,
            rendered,
            texture: None,
            status: String::new(),
        }
    }

    fn handle_save_png(&mut self) {
        let rendered = &self.rendered;
        if let Some(status) = export_png("covid_map.png", |path| rendered.save_png(path)) {
            self.status = status;
        }
    }
}

impl eframe::App for MapViewer {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut save_clicked = false;

        TopBottomPanel::top("map_header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(RichText::new(&self.map.title).strong());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    save_clicked = ui.button("💾 Save PNG").clicked();
                    ui.label(RichText::new(&self.status).weak());
                });
            });
        });

        let (width, height) = (self.rendered.width, self.rendered.height);
        let texture_id = self
            .texture
            .get_or_insert_with(|| {
                let image = ColorImage::from_rgb(
                    [width as usize, height as usize],
                    &self.rendered.pixels,
                );
                ctx.load_texture("choropleth", image, TextureOptions::LINEAR)
            })
            .id();

        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.add(
                egui::Image::new((texture_id, egui::vec2(width as f32, height as f32)))
                    .shrink_to_fit()
                    .sense(Sense::hover()),
            );

            let Some(pointer) = response.hover_pos() else {
                return;
            };
            let rect = response.rect;
            let x = (pointer.x - rect.left()) / rect.width() * width as f32;
            let y = (pointer.y - rect.top()) / rect.height() * height as f32;

            let hovered = self
                .rendered
                .lon_lat_at(x, y)
                .and_then(|(lon, lat)| self.map.region_at(lon, lat));
            if let Some(region) = hovered {
                response.on_hover_ui_at_pointer(|ui| {
                    ui.label(RichText::new(&region.location).strong());
                    ui.label(format!("iso_code={}", region.iso_code));
                    ui.label(format!("total_cases={}", format_value(Some(region.total_cases))));
                });
            }
        });

        if save_clicked {
            self.handle_save_png();
        }
    }
}
