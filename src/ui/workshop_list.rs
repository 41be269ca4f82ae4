//! Workshop list panel

use std::path::{Path, PathBuf};

use eframe::egui::{self, Color32, RichText, Ui};

use crate::core::config::ConfigError;
use crate::core::document::Document;

/// Request raised by the workshop list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListAction {
    Open(String),
    Refresh,
    ChangeFolder(PathBuf),
}

/// Card list of the available workshops
pub struct WorkshopListPanel;

impl WorkshopListPanel {
    pub fn show(
        ui: &mut Ui,
        root: &Path,
        workshops: &[Document],
        config_error: Option<&ConfigError>,
    ) -> Option<ListAction> {
        let mut action = None;

        ui.horizontal(|ui| {
            ui.heading("Workshops");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("\u{21BB}").on_hover_text("Refresh").clicked() {
                    action = Some(ListAction::Refresh);
                }
                if ui.button("Choose Folder...").clicked() {
                    if let Some(path) = rfd::FileDialog::new().set_directory(root).pick_folder() {
                        action = Some(ListAction::ChangeFolder(path));
                    }
                }
            });
        });
        ui.label(
            RichText::new(root.display().to_string())
                .small()
                .weak(),
        );
        if let Some(e) = config_error {
            ui.add_space(4.0);
            egui::Frame::new()
                .stroke(egui::Stroke::new(1.0, Color32::from_rgb(239, 108, 0)))
                .inner_margin(egui::Margin::same(8))
                .corner_radius(4.0)
                .show(ui, |ui| {
                    ui.set_min_width(ui.available_width());
                    ui.colored_label(
                        Color32::from_rgb(239, 108, 0),
                        format!("Responses cannot be saved yet. {e}"),
                    );
                });
        }
        ui.separator();

        egui::ScrollArea::vertical()
            .id_salt("workshop_list_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                if workshops.is_empty() {
                    ui.label("No workshops found in this folder.");
                    return;
                }

                for doc in workshops {
                    if Self::show_card(ui, doc) {
                        action = Some(ListAction::Open(doc.id.clone()));
                    }
                    ui.add_space(6.0);
                }
            });

        action
    }

    /// One card; returns whether "Start Workshop" was clicked
    fn show_card(ui: &mut Ui, doc: &Document) -> bool {
        let mut start = false;

        egui::Frame::group(ui.style())
            .inner_margin(egui::Margin::same(10))
            .corner_radius(6.0)
            .show(ui, |ui| {
                ui.set_min_width(ui.available_width());
                ui.label(RichText::new(doc.title()).strong().size(16.0));

                let fields = doc.fields.len();
                let mut details = format!(
                    "{} \u{00B7} {} field{}",
                    doc.slug(),
                    fields,
                    if fields == 1 { "" } else { "s" }
                );
                if !doc.metadata.tags.is_empty() {
                    details.push_str(" \u{00B7} ");
                    details.push_str(&doc.metadata.tags.join(", "));
                }
                ui.label(RichText::new(details).small().weak());

                ui.add_space(6.0);
                start = ui.button("Start Workshop").clicked();
            });

        start
    }
}
