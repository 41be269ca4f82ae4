//! Main application state and UI coordination

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use eframe::egui;
use tokio::runtime::Handle;

use crate::core::config::{AppConfig, ConfigError};
use crate::core::document::Document;
use crate::core::library::{DocumentSource, WorkshopLibrary};
use crate::session::WorkshopSession;
use crate::submit::{GitHubSink, PersistenceSink};
use crate::ui::name_prompt::NamePrompt;
use crate::ui::workshop_list::{ListAction, WorkshopListPanel};
use crate::ui::workshop_view::{ViewAction, WorkshopView};

/// Which screen is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    NamePrompt,
    List,
    Workshop,
}

/// Main application state
pub struct WorkshopApp {
    /// Application configuration
    pub config: AppConfig,
    /// Directory the workshops are read from
    pub library: WorkshopLibrary,
    /// Loaded workshops, sorted by id
    pub workshops: Vec<Document>,
    /// Sink built from the configuration, or why it could not be
    sink: Result<Arc<dyn PersistenceSink>, ConfigError>,
    runtime: Handle,
    screen: Screen,
    /// Workshop currently open, with its view state
    open: Option<(WorkshopSession, WorkshopView)>,
    name_buffer: String,
}

impl WorkshopApp {
    /// Create a new application instance
    pub fn new(cc: &eframe::CreationContext<'_>, runtime: Handle) -> Self {
        let config = AppConfig::load().unwrap_or_else(|e| {
            tracing::warn!("Using default config: {:#}", e);
            AppConfig::default()
        });
        Self::apply_theme(&cc.egui_ctx, &config.ui.theme);

        let sink = config.sink.resolve().map(|settings| {
            tracing::info!(
                "Responses go to {}/{} on {}",
                settings.owner,
                settings.repo,
                settings.branch
            );
            Arc::new(GitHubSink::new(settings)) as Arc<dyn PersistenceSink>
        });
        if let Err(e) = &sink {
            tracing::warn!("{}", e);
        }

        let library = WorkshopLibrary::new(config.workshops_dir());
        let workshops = library.load_all();
        tracing::info!(
            "Loaded {} workshops from {}",
            workshops.len(),
            library.root().display()
        );

        let screen = if config.user_name.is_some() {
            Screen::List
        } else {
            Screen::NamePrompt
        };
        let name_buffer = config.user_name.clone().unwrap_or_default();

        Self {
            config,
            library,
            workshops,
            sink,
            runtime,
            screen,
            open: None,
            name_buffer,
        }
    }

    fn apply_theme(ctx: &egui::Context, theme: &str) {
        match theme {
            "dark" => ctx.set_visuals(egui::Visuals::dark()),
            _ => ctx.set_visuals(egui::Visuals::light()),
        }
    }

    /// Re-read the workshop directory
    pub fn refresh_library(&mut self) {
        self.workshops = self.library.load_all();
    }

    /// Switch to another workshop directory and remember it
    pub fn change_library(&mut self, path: PathBuf) {
        self.library = WorkshopLibrary::new(&path);
        self.config.workshops_dir = Some(path);
        self.save_config();
        self.refresh_library();
    }

    /// Open a workshop by id, reloading it from disk
    pub fn open_workshop(&mut self, id: &str) {
        match self.library.load_document(id) {
            Ok(document) => {
                tracing::info!(
                    "Opening workshop {} ({} fields)",
                    document.slug(),
                    document.fields.len()
                );
                let session = WorkshopSession::open(document, self.sink.clone(), self.runtime.clone());
                let view = WorkshopView::new(&session.form);
                self.open = Some((session, view));
                self.screen = Screen::Workshop;
            }
            Err(e) => tracing::error!("Failed to open workshop: {}", e),
        }
    }

    /// Leave the open workshop. Refused while a submission is in flight.
    pub fn close_workshop(&mut self) {
        if let Some((session, _)) = &self.open {
            if !session.can_leave() {
                tracing::warn!("Not leaving {} while a response is saving", session.document.slug());
                return;
            }
        }
        self.open = None;
        self.screen = Screen::List;
    }

    fn set_user_name(&mut self, name: &str) {
        self.config.set_user_name(name);
        self.save_config();
        self.screen = if self.open.is_some() {
            Screen::Workshop
        } else {
            Screen::List
        };
    }

    fn save_config(&self) {
        if let Err(e) = self.config.save() {
            tracing::error!("Failed to save config: {:#}", e);
        }
    }

    /// Render the top bar
    fn render_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong("Workshop Forms");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if let Some(name) = self.config.user_name.clone() {
                        let in_flight = self
                            .open
                            .as_ref()
                            .is_some_and(|(session, _)| session.coordinator().is_submitting());
                        if ui
                            .add_enabled(!in_flight, egui::Button::new("Change name"))
                            .clicked()
                        {
                            self.name_buffer = name.clone();
                            self.screen = Screen::NamePrompt;
                        }
                        ui.label(format!("Signed in as {name}"));
                    }
                });
            });
        });
    }
}

impl eframe::App for WorkshopApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some((session, _)) = self.open.as_mut() {
            session.poll();
            if session.coordinator().is_submitting() {
                ctx.request_repaint_after(Duration::from_millis(100));
            }
        }

        self.render_top_bar(ctx);

        egui::CentralPanel::default().show(ctx, |ui| match self.screen {
            Screen::NamePrompt => {
                if let Some(name) = NamePrompt::show(ui, &mut self.name_buffer) {
                    self.set_user_name(&name);
                }
            }
            Screen::List => {
                let config_error = self.sink.as_ref().err();
                let action =
                    WorkshopListPanel::show(ui, self.library.root(), &self.workshops, config_error);
                match action {
                    Some(ListAction::Open(id)) => self.open_workshop(&id),
                    Some(ListAction::Refresh) => self.refresh_library(),
                    Some(ListAction::ChangeFolder(path)) => self.change_library(path),
                    None => {}
                }
            }
            Screen::Workshop => {
                let identity = self.config.user_name.clone().unwrap_or_default();
                let rows = self.config.ui.field_rows.max(1);
                let action = match self.open.as_mut() {
                    Some((session, view)) => view.show(ui, session, &identity, rows),
                    None => Some(ViewAction::Back),
                };
                if action == Some(ViewAction::Back) {
                    self.close_workshop();
                }
            }
        });
    }
}
