use crate::app::TimelineApp;
use crate::model::{TextDirection, WeekendRule};
use crate::ui::theme;
use egui::{menu, RichText, Ui};
use egui_phosphor::regular as icons;

/// Render the top toolbar / menu bar.
pub fn show_toolbar(app: &mut TimelineApp, ui: &mut Ui) {
    menu::bar(ui, |ui| {
        ui.menu_button(RichText::new("  File  ").font(theme::font_menu()), |ui| {
            if ui.button("  Reload dataset").clicked() {
                app.reload_dataset();
                ui.close_menu();
            }
            if ui.button("  Load sample data").clicked() {
                app.load_sample();
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  Navigate  ").font(theme::font_menu()), |ui| {
            if ui
                .button(format!("{}  Previous month", icons::ARROW_LEFT))
                .clicked()
            {
                app.shift_window(false);
                ui.close_menu();
            }
            if ui
                .button(format!("{}  Next month", icons::ARROW_RIGHT))
                .clicked()
            {
                app.shift_window(true);
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Today          T").clicked() {
                app.go_to_today(true);
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  View  ").font(theme::font_menu()), |ui| {
            let mut config = *app.timeline.config();

            ui.label(RichText::new("Direction").small().weak());
            let mut changed = ui
                .radio_value(&mut config.text_direction, TextDirection::Ltr, "Left to right")
                .clicked();
            changed |= ui
                .radio_value(&mut config.text_direction, TextDirection::Rtl, "Right to left")
                .clicked();

            ui.separator();
            ui.label(RichText::new("Weekend").small().weak());
            changed |= ui
                .radio_value(&mut config.weekend_rule, WeekendRule::SaturdayOnly, "Saturday")
                .clicked();
            changed |= ui
                .radio_value(
                    &mut config.weekend_rule,
                    WeekendRule::SaturdayAndSunday,
                    "Saturday and Sunday",
                )
                .clicked();

            ui.separator();
            ui.label(RichText::new("Day width").small().weak());
            changed |= ui
                .add(egui::Slider::new(&mut config.column_width, 40.0..=240.0).suffix(" px"))
                .drag_stopped();

            if changed {
                app.apply_config(config);
                ui.close_menu();
            }
        });

        ui.separator();

        // Quick navigation
        if ui
            .button(RichText::new(icons::ARROW_LEFT).font(theme::font_menu()))
            .on_hover_text("Previous month")
            .clicked()
        {
            app.shift_window(false);
        }
        if ui
            .button(RichText::new("Today").font(theme::font_menu()))
            .clicked()
        {
            app.go_to_today(true);
        }
        if ui
            .button(RichText::new(icons::ARROW_RIGHT).font(theme::font_menu()))
            .on_hover_text("Next month")
            .clicked()
        {
            app.shift_window(true);
        }

        ui.add(egui_extras::DatePickerButton::new(&mut app.goto_date).id_salt("toolbar_goto"));
        if ui.button("Go").clicked() {
            app.go_to_date(app.goto_date);
        }

        // Right-aligned visible range
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let text = match app.timeline.visible_range() {
                Some(range) => format!(
                    "{} – {}",
                    range.start.format("%d %b %Y"),
                    range.end.format("%d %b %Y")
                ),
                None => String::new(),
            };
            ui.label(RichText::new(text).size(11.0).weak());
        });
    });
}
