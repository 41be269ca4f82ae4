//! Workshop view: the document rendered as a form
//!
//! Static segments are shown as formatted content and field slots as labelled
//! text inputs, in document order. The save control and its notices sit at
//! the bottom.

use eframe::egui::{self, Color32, RichText, ScrollArea, TextEdit, Ui};

use super::block_renderer::render_block;
use super::markup_blocks::{parse_markup, MarkupBlock};
use crate::form::{RenderSegment, WorkshopForm};
use crate::session::WorkshopSession;
use crate::submit::{SubmitError, SubmitOutcome, SubmitPhase};

const WARNING: Color32 = Color32::from_rgb(239, 108, 0);

/// Navigation requested from the workshop view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewAction {
    Back,
}

/// Display state for one open workshop
pub struct WorkshopView {
    /// Parsed blocks per segment; empty for field slots
    blocks: Vec<Vec<MarkupBlock>>,
}

impl WorkshopView {
    pub fn new(form: &WorkshopForm) -> Self {
        let blocks = form
            .segments()
            .iter()
            .map(|segment| match segment {
                RenderSegment::StaticMarkup { html, .. } => parse_markup(html),
                RenderSegment::FieldSlot { .. } => Vec::new(),
            })
            .collect();
        Self { blocks }
    }

    /// Show the workshop. `identity` is the participant name used on submit.
    pub fn show(
        &self,
        ui: &mut Ui,
        session: &mut WorkshopSession,
        identity: &str,
        field_rows: usize,
    ) -> Option<ViewAction> {
        let mut action = None;

        ui.horizontal(|ui| {
            // Leaving drops the session, so not while a save is in flight
            let back = ui.add_enabled(
                session.can_leave(),
                egui::Button::new("\u{2190} Back to workshops"),
            );
            let back = if session.state.has_input() {
                back.on_hover_text("Unsaved answers will be lost")
            } else {
                back
            };
            if back.clicked() {
                action = Some(ViewAction::Back);
            }
        });
        ui.separator();

        ScrollArea::vertical()
            .id_salt("workshop_view_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.set_max_width(ui.available_width().min(820.0));

                ui.heading(session.document.title());
                if let Some(first) = session.document.malformed.first() {
                    ui.label(
                        RichText::new(format!(
                            "An unterminated \"{}\" marker at byte {} was left as text; \
                             no fields after it were recognised.",
                            first.syntax.opener(),
                            first.offset
                        ))
                        .small()
                        .color(WARNING),
                    );
                }
                if let Some(e) = session.coordinator().config_error() {
                    ui.add_space(8.0);
                    notice(ui, WARNING, |ui| {
                        ui.label(format!("Responses cannot be saved yet. {e}"));
                    });
                }
                ui.add_space(12.0);

                let submitting = session.coordinator().is_submitting();
                let mut appended_heading = false;
                for (idx, segment) in session.form.segments().iter().enumerate() {
                    // Fields without a placeholder in the document come last, with an empty range
                    if segment.field().is_some() && segment.range().is_empty() && !appended_heading {
                        appended_heading = true;
                        ui.separator();
                        ui.label(RichText::new("Additional questions").strong());
                        ui.add_space(8.0);
                    }

                    ui.push_id(idx, |ui| match segment {
                        RenderSegment::StaticMarkup { .. } => {
                            let blocks = self.blocks.get(idx).into_iter().flatten();
                            for (block_idx, block) in blocks.enumerate() {
                                ui.push_id(block_idx, |ui| render_block(ui, block));
                            }
                        }
                        RenderSegment::FieldSlot { field, .. } => {
                            let marker = session.form.registry.get(field);
                            let label = ui.label(RichText::new(field).strong());
                            if let Some(marker) = marker {
                                label.on_hover_text(format!("{} input", marker.declared_type));
                            }
                            ui.add_space(4.0);
                            let salt = marker.map_or(idx, |m| m.ordinal);
                            ui.add_enabled(
                                !submitting,
                                TextEdit::multiline(session.state.value_mut(field))
                                    .id_salt(("field", salt))
                                    .desired_rows(field_rows)
                                    .desired_width(f32::INFINITY),
                            );
                            ui.add_space(12.0);
                        }
                    });
                }

                ui.add_space(8.0);
                Self::show_save(ui, session, identity);
                ui.add_space(24.0);
            });

        action
    }

    fn show_save(ui: &mut Ui, session: &mut WorkshopSession, identity: &str) {
        let coordinator = session.coordinator();
        let label = match coordinator.phase() {
            SubmitPhase::Idle => "Save Response",
            SubmitPhase::Submitting => "Saving...",
            SubmitPhase::Acknowledged(_) => "Saved",
        };

        let clicked = ui
            .add_enabled(coordinator.can_submit(), egui::Button::new(label))
            .clicked();
        if clicked {
            if let Err(e) = session.submit(identity) {
                tracing::debug!("Submit rejected: {}", e);
            }
        }

        let Some(outcome) = session.last_outcome() else {
            return;
        };
        ui.add_space(8.0);
        match outcome {
            SubmitOutcome::Acknowledged(receipt) => {
                notice(ui, Color32::from_rgb(46, 125, 50), |ui| {
                    ui.label("Response saved successfully!");
                    if let Some(url) = &receipt.html_url {
                        ui.hyperlink_to("View on GitHub", url);
                    }
                });
            }
            SubmitOutcome::Failed(SubmitError::Config(e)) => {
                notice(ui, WARNING, |ui| {
                    ui.label(format!("Configuration error: {e}"));
                });
            }
            SubmitOutcome::Failed(e) => {
                notice(ui, Color32::from_rgb(198, 40, 40), |ui| {
                    ui.label(format!("Error: {e}"));
                });
            }
        }
    }
}

fn notice(ui: &mut Ui, accent: Color32, add_contents: impl FnOnce(&mut Ui)) {
    egui::Frame::new()
        .stroke(egui::Stroke::new(1.0, accent))
        .inner_margin(egui::Margin::same(8))
        .corner_radius(4.0)
        .show(ui, |ui| {
            ui.visuals_mut().override_text_color = Some(accent);
            ui.set_min_width(ui.available_width());
            add_contents(ui);
        });
}
