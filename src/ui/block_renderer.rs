//! Block rendering for static workshop content

use eframe::egui::{self, Color32, FontId, RichText, Ui};

use super::markup_blocks::{InlineSpan, ListItem, MarkupBlock};

/// Render a parsed block to the UI
pub fn render_block(ui: &mut Ui, block: &MarkupBlock) {
    match block {
        MarkupBlock::Heading { level, spans } => render_heading(ui, *level, spans),
        MarkupBlock::Paragraph { spans } => render_paragraph(ui, spans),
        MarkupBlock::Quote { spans } => render_blockquote(ui, spans),
        MarkupBlock::CodeBlock { lang, code } => render_code_block(ui, lang.as_deref(), code),
        MarkupBlock::List { items } => render_list(ui, items),
        MarkupBlock::Table { headers, rows } => render_table(ui, headers, rows),
        MarkupBlock::HorizontalRule => render_horizontal_rule(ui),
    }
}

/// Render a heading
pub fn render_heading(ui: &mut Ui, level: u8, spans: &[InlineSpan]) {
    let font_size = match level {
        1 => 28.0,
        2 => 24.0,
        3 => 20.0,
        4 => 18.0,
        5 => 16.0,
        _ => 14.0,
    };

    ui.add_space(4.0);
    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing.x = 0.0;
        for span in spans {
            let text = match span {
                InlineSpan::LineBreak => {
                    ui.end_row();
                    continue;
                }
                InlineSpan::Link { text, .. } => text,
                InlineSpan::Text(t)
                | InlineSpan::Strong(t)
                | InlineSpan::Emphasis(t)
                | InlineSpan::Strikethrough(t)
                | InlineSpan::Code(t) => t,
            };
            ui.label(
                RichText::new(text)
                    .font(FontId::proportional(font_size))
                    .strong(),
            );
        }
    });

    ui.add_space(match level {
        1 => 12.0,
        2 => 10.0,
        _ => 6.0,
    });
}

/// Render a paragraph with inline formatting
pub fn render_paragraph(ui: &mut Ui, spans: &[InlineSpan]) {
    render_inline(ui, spans);
    ui.add_space(8.0);
}

/// Lay out inline spans, wrapping at the available width
pub fn render_inline(ui: &mut Ui, spans: &[InlineSpan]) {
    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing.x = 0.0;
        for span in spans {
            render_span(ui, span);
        }
    });
}

fn render_span(ui: &mut Ui, span: &InlineSpan) {
    match span {
        InlineSpan::Text(t) => {
            ui.label(t);
        }
        InlineSpan::Strong(t) => {
            ui.label(RichText::new(t).strong());
        }
        InlineSpan::Emphasis(t) => {
            ui.label(RichText::new(t).italics());
        }
        InlineSpan::Strikethrough(t) => {
            ui.label(RichText::new(t).strikethrough());
        }
        InlineSpan::Code(code) => {
            let bg = ui.visuals().code_bg_color;
            ui.label(
                RichText::new(code)
                    .font(FontId::monospace(14.0))
                    .background_color(bg),
            );
        }
        InlineSpan::Link { text, url } => {
            ui.hyperlink_to(text, url).on_hover_text(url);
        }
        InlineSpan::LineBreak => ui.end_row(),
    }
}

/// Render a code block
pub fn render_code_block(ui: &mut Ui, lang: Option<&str>, code: &str) {
    let visuals = ui.visuals();
    let bg_color = visuals.extreme_bg_color;
    let border_color = visuals.widgets.noninteractive.bg_stroke.color;

    egui::Frame::new()
        .fill(bg_color)
        .stroke(egui::Stroke::new(1.0, border_color))
        .inner_margin(egui::Margin::same(8))
        .outer_margin(egui::Margin::symmetric(0, 4))
        .corner_radius(4.0)
        .show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            if let Some(lang) = lang {
                ui.label(
                    RichText::new(lang)
                        .font(FontId::monospace(12.0))
                        .color(Color32::from_rgb(128, 128, 128)),
                );
                ui.add_space(4.0);
            }
            ui.label(RichText::new(code).font(FontId::monospace(14.0)));
        });

    ui.add_space(8.0);
}

/// Render a flattened list, indenting nested items by depth
pub fn render_list(ui: &mut Ui, items: &[ListItem]) {
    let marker_color = Color32::from_rgb(150, 150, 150);

    for item in items {
        ui.horizontal(|ui| {
            ui.add_space(16.0 * (item.depth + 1) as f32);

            if let Some(checked) = item.checkbox {
                let checkbox_text = if checked { "[x]" } else { "[ ]" };
                ui.label(
                    RichText::new(checkbox_text)
                        .font(FontId::monospace(14.0))
                        .color(marker_color),
                );
            } else {
                ui.label(RichText::new(&item.marker).color(marker_color));
            }

            ui.add_space(4.0);
            render_inline(ui, &item.spans);
        });
    }

    ui.add_space(8.0);
}

/// Render a quoted paragraph with a bar down its left edge
pub fn render_blockquote(ui: &mut Ui, spans: &[InlineSpan]) {
    let bar_color = Color32::from_rgb(100, 100, 120);

    let response = egui::Frame::new()
        .fill(ui.visuals().faint_bg_color)
        .inner_margin(egui::Margin {
            left: 12,
            right: 8,
            top: 8,
            bottom: 8,
        })
        .show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            render_inline(ui, spans);
        })
        .response;

    let rect = response.rect;
    ui.painter().rect_filled(
        egui::Rect::from_min_size(rect.min, egui::vec2(4.0, rect.height())),
        0.0,
        bar_color,
    );

    ui.add_space(8.0);
}

/// Render a horizontal rule
pub fn render_horizontal_rule(ui: &mut Ui) {
    ui.add_space(8.0);
    ui.separator();
    ui.add_space(8.0);
}

/// Render a table
pub fn render_table(ui: &mut Ui, headers: &[String], rows: &[Vec<String>]) {
    use egui_extras::{Column, TableBuilder};

    let num_cols = headers
        .len()
        .max(rows.iter().map(Vec::len).max().unwrap_or(0))
        .max(1);

    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .columns(Column::auto().at_least(60.0), num_cols)
        .header(20.0, |mut header| {
            for idx in 0..num_cols {
                header.col(|ui| {
                    ui.strong(headers.get(idx).map(String::as_str).unwrap_or_default());
                });
            }
        })
        .body(|mut body| {
            for row in rows {
                body.row(18.0, |mut row_ui| {
                    for idx in 0..num_cols {
                        row_ui.col(|ui| {
                            ui.label(row.get(idx).map(String::as_str).unwrap_or_default());
                        });
                    }
                });
            }
        });

    ui.add_space(8.0);
}
