use std::path::PathBuf;
use std::time::Instant;

use chrono::{Duration, Months, NaiveDate};

use crate::error::Result;
use crate::io::{load_dataset, Dataset};
use crate::model::{Event, EventId, Resource, TimelineConfig};
use crate::settings::Settings;
use crate::timeline::Timeline;
use crate::ui;

/// Main application state.
pub struct TimelineApp {
    pub timeline: Timeline,
    pub settings: Settings,
    pub dataset_path: Option<PathBuf>,
    pub selected_event: Option<EventId>,

    // Toolbar date picker
    pub goto_date: NaiveDate,

    // Status message
    pub status_message: String,
}

impl TimelineApp {
    pub fn new(cc: &eframe::CreationContext<'_>, dataset_path: Option<PathBuf>) -> Result<Self> {
        // Register Phosphor icon font as a fallback so icons render inline with text
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);
        ui::theme::apply_theme(&cc.egui_ctx);

        let settings = Settings::load();
        let timeline = Timeline::new(settings.timeline)?;
        let today = timeline.today();

        let mut app = Self {
            timeline,
            dataset_path: dataset_path.or_else(|| settings.dataset.clone()),
            settings,
            selected_event: None,
            goto_date: today,
            status_message: "Ready".to_string(),
        };

        if app.dataset_path.is_some() {
            app.reload_dataset();
        } else {
            app.load_sample();
        }
        Ok(app)
    }

    fn replace_data(&mut self, dataset: Dataset) {
        self.timeline.clear();
        self.timeline.add_resources(dataset.resources);
        self.timeline.add_events(dataset.events);
        self.selected_event = None;
        self.timeline.go_to_today(false, Instant::now());
    }

    // --- Data ---

    pub fn reload_dataset(&mut self) {
        let Some(path) = self.dataset_path.clone() else {
            self.status_message = "No dataset file configured".to_string();
            return;
        };
        match load_dataset(&path) {
            Ok(dataset) => {
                self.status_message = format!(
                    "Loaded {} resources, {} events",
                    dataset.resources.len(),
                    dataset.events.len()
                );
                self.replace_data(dataset);
            }
            Err(e) => {
                log::error!("failed to load {}: {}", path.display(), e);
                self.status_message = format!("Error loading: {}", e);
            }
        }
    }

    pub fn load_sample(&mut self) {
        match sample_dataset(self.timeline.today()) {
            Ok(dataset) => {
                self.replace_data(dataset);
                self.status_message = "Sample data loaded".to_string();
            }
            Err(e) => self.status_message = format!("Error building sample: {}", e),
        }
    }

    // --- Navigation ---

    pub fn go_to_today(&mut self, smooth: bool) {
        self.timeline.go_to_today(smooth, Instant::now());
        self.goto_date = self.timeline.today();
    }

    pub fn go_to_date(&mut self, date: NaiveDate) {
        self.timeline.scroll_to_date(date, true, Instant::now());
        self.status_message = format!("Jumped to {}", date.format("%d %b %Y"));
    }

    /// Scroll one month forward or back from the first visible day.
    pub fn shift_window(&mut self, forward: bool) {
        let anchor = self
            .timeline
            .visible_range()
            .map_or(self.timeline.today(), |range| range.start);
        let target = if forward {
            anchor.checked_add_months(Months::new(1))
        } else {
            anchor.checked_sub_months(Months::new(1))
        };
        if let Some(target) = target {
            self.timeline.scroll_to_date(target, true, Instant::now());
        }
    }

    // --- Settings ---

    pub fn apply_config(&mut self, config: TimelineConfig) {
        if let Err(e) = self.timeline.set_config(config) {
            self.status_message = format!("Invalid settings: {}", e);
            return;
        }
        self.settings.timeline = config;
        if let Err(e) = self.settings.save() {
            log::warn!("could not save settings: {}", e);
        }
        // raw scroll offsets change sign with direction; start from a known place
        self.timeline.go_to_today(false, Instant::now());
        self.status_message = "Settings updated".to_string();
    }
}

/// Demonstration data laid out around `today`.
pub fn sample_dataset(today: NaiveDate) -> Result<Dataset> {
    let days = Duration::days;
    let design = Resource::new("Design").with_colour("#ab47bc");
    let backend = Resource::new("Backend").with_colour("#4285f4");
    let mut qa = Resource::new("QA");
    qa.start_date = Some(today - days(3));
    qa.due_date = Some(today + days(40));
    let ops = Resource::new("Operations");

    let events = vec![
        Event::new(design.id, "Wireframes", today - days(10), today - days(4))?,
        Event::new(design.id, "Visual design", today - days(3), today + days(6))?,
        Event::new(design.id, "Design review", today + days(5), today + days(7))?,
        Event::new(backend.id, "API", today - days(6), today + days(12))?,
        Event::new(backend.id, "Storage", today + days(2), today + days(9))?,
        Event::new(backend.id, "Migrations", today + days(4), today + days(5))?,
        Event::new(qa.id, "Test plan", today, today + days(3))?,
        Event::new(qa.id, "Regression", today + days(14), today + days(24))?,
        Event::new(ops.id, "Launch", today + days(30), today + days(30))?,
    ];

    Ok(Dataset {
        resources: vec![design, backend, qa, ops],
        events,
    })
}

impl eframe::App for TimelineApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Handle keyboard shortcuts outside closures to avoid borrow issues
        let typing = ctx.memory(|m| m.focused().is_some());
        if !typing && ctx.input(|i| i.key_pressed(egui::Key::T)) {
            self.go_to_today(true);
        }

        // Top panel: toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::toolbar::show_toolbar(self, ui);
        });

        // Bottom panel: status bar
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(24.0)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_HEADER)
                    .inner_margin(egui::Margin::symmetric(10.0, 0.0)),
            )
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new(&self.status_message)
                            .font(ui::theme::font_small())
                            .color(ui::theme::TEXT_SECONDARY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let window = self.timeline.window();
                        ui.label(
                            egui::RichText::new(format!(
                                "Resources: {} · Events: {} · Loaded: {} – {}",
                                self.timeline.resources().len(),
                                self.timeline.events().len(),
                                window.start.format("%b %Y"),
                                window.end.format("%b %Y"),
                            ))
                            .size(10.5)
                            .color(ui::theme::TEXT_DIM),
                        );
                    });
                });
            });

        // Central panel: timeline
        let frame = egui::Frame::default()
            .fill(ui::theme::BG_DARK)
            .inner_margin(egui::Margin::ZERO);
        egui::CentralPanel::default().frame(frame).show(ctx, |ui| {
            let interaction =
                ui::timeline_view::show_timeline(&mut self.timeline, &mut self.selected_event, ui);
            if let Some(message) = interaction.message {
                self.status_message = message;
            } else if interaction.changed {
                self.status_message = "Timeline updated".to_string();
            }
        });
    }
}
