use client_core::highlight_segments;
use eframe::egui;
use egui::{
    text::{LayoutJob, TextFormat},
    Color32, FontId,
};

use crate::controller::events::{category_label, UiError, UiErrorCategory};

pub const HIGHLIGHT_FILL: Color32 = Color32::from_rgb(250, 214, 92);

/// Lays out `text` with every case-insensitive match of `query` on a marker background.
pub fn highlight_job(text: &str, query: &str, text_color: Color32, font_id: FontId) -> LayoutJob {
    let mut job = LayoutJob::default();
    for segment in highlight_segments(text, query) {
        let format = if segment.highlighted {
            TextFormat {
                font_id: font_id.clone(),
                color: Color32::BLACK,
                background: HIGHLIGHT_FILL,
                ..Default::default()
            }
        } else {
            TextFormat::simple(font_id.clone(), text_color)
        };
        job.append(segment.text, 0.0, format);
    }
    job
}

pub fn highlighted_label(ui: &mut egui::Ui, text: &str, query: &str) -> egui::Response {
    let font_id = egui::TextStyle::Body.resolve(ui.style());
    let job = highlight_job(text, query, ui.visuals().text_color(), font_id);
    ui.add(egui::Label::new(job).wrap())
}

/// Renders one chip per tag; returns the tag whose chip was clicked.
pub fn tag_chips(ui: &mut egui::Ui, tags: &[String], active_tag: Option<&str>) -> Option<String> {
    let mut clicked = None;
    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing.x = 4.0;
        for tag in tags {
            let chip = egui::Button::new(egui::RichText::new(tag).small())
                .selected(active_tag == Some(tag.as_str()))
                .corner_radius(8.0)
                .small();
            if ui.add(chip).on_hover_text("Filter by this tag").clicked() {
                clicked = Some(tag.clone());
            }
        }
    });
    clicked
}

/// Non-blocking error banner; returns true when dismissed.
pub fn status_banner(ui: &mut egui::Ui, banner: &UiError) -> bool {
    let (fill, stroke) = match banner.category() {
        UiErrorCategory::Validation => (
            Color32::from_rgb(112, 88, 40),
            egui::Stroke::new(1.0, Color32::from_rgb(180, 146, 80)),
        ),
        _ => (
            Color32::from_rgb(111, 53, 53),
            egui::Stroke::new(1.0, Color32::from_rgb(175, 96, 96)),
        ),
    };

    let mut dismissed = false;
    egui::Frame::NONE
        .fill(fill)
        .stroke(stroke)
        .corner_radius(8.0)
        .inner_margin(egui::Margin::symmetric(10, 8))
        .show(ui, |ui| {
            ui.horizontal_wrapped(|ui| {
                ui.label(
                    egui::RichText::new(category_label(banner.category()))
                        .strong()
                        .color(Color32::WHITE),
                );
                ui.label(egui::RichText::new(banner.banner_text()).color(Color32::WHITE));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Dismiss").clicked() {
                        dismissed = true;
                    }
                });
            });
        });
    dismissed
}
