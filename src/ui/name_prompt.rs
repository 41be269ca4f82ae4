//! First-run prompt for the participant name

use eframe::egui::{self, Key, RichText, Ui};

/// Name entry form shown until a name is set
pub struct NamePrompt;

impl NamePrompt {
    /// Show the prompt over `buffer`. Returns the trimmed name once confirmed.
    pub fn show(ui: &mut Ui, buffer: &mut String) -> Option<String> {
        let mut confirmed = false;

        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() * 0.25);
            ui.heading("Welcome to the workshop");
            ui.add_space(8.0);
            ui.label("Please enter your name. It is saved with every response you submit.");
            ui.add_space(12.0);

            let response = ui.add(
                egui::TextEdit::singleline(buffer)
                    .hint_text("Your name")
                    .desired_width(280.0),
            );
            if response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter)) {
                confirmed = true;
            }

            ui.add_space(8.0);
            let ready = !buffer.trim().is_empty();
            if ui.add_enabled(ready, egui::Button::new("Continue")).clicked() {
                confirmed = true;
            }
            if !ready {
                ui.label(RichText::new("A name is required to continue.").small().weak());
            }
        });

        let name = buffer.trim();
        (confirmed && !name.is_empty()).then(|| name.to_string())
    }
}
