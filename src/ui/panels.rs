use eframe::egui::{self, Color32, RichText, ScrollArea, Slider, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let dataset = state.dataset;
    let Some((min_year, max_year)) = dataset.year_bounds() else {
        ui.label("Dataset is empty.");
        return;
    };

    // Edit a copy; the state recomputes only when it actually changed.
    let mut selection = state.selection.clone();

    // ---- Year range ----
    ui.strong("Year range");
    let (mut from, mut to) = selection.years;
    ui.add(Slider::new(&mut from, min_year..=max_year).text("from"));
    ui.add(Slider::new(&mut to, min_year..=max_year).text("to"));
    // Dragging one end past the other drags both.
    if from > to {
        if from != selection.years.0 {
            to = from;
        } else {
            from = to;
        }
    }
    selection.years = (from, to);
    ui.separator();

    // ---- Sport ----
    ui.strong("Sport");
    let sport_text = selection.sport.clone().unwrap_or_else(|| "All".to_string());
    egui::ComboBox::from_id_salt("sport")
        .selected_text(sport_text)
        .width(ui.available_width() - 8.0)
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(&mut selection.sport, None, "All");
            for sport in &dataset.sports {
                ui.selectable_value(&mut selection.sport, Some(sport.clone()), sport);
            }
        });
    ui.separator();

    // ---- Countries (multi-select) ----
    ui.horizontal(|ui: &mut Ui| {
        ui.strong(format!("Countries ({} selected)", selection.countries.len()));
        if ui.small_button("Clear").clicked() {
            selection.countries.clear();
        }
    });
    ui.add(
        egui::TextEdit::singleline(&mut state.country_query)
            .hint_text("Search NOC code…"),
    );

    let query = state.country_query.trim().to_ascii_uppercase();
    let mut toggled: Option<&str> = None;
    ScrollArea::vertical()
        .id_salt("countries")
        .max_height((ui.available_height() - 40.0).max(0.0))
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for country in &dataset.countries {
                if !query.is_empty() && !country.contains(&query) {
                    continue;
                }
                let mut checked = selection.countries.contains(country);
                let mut text = RichText::new(country);
                if checked {
                    text = text.color(state.country_colors.color_for(country));
                }
                if ui.checkbox(&mut checked, text).changed() {
                    toggled = Some(country.as_str());
                }
            }
        });

    ui.separator();
    if ui.button("Reset all filters").clicked() {
        state.reset_filters();
        return;
    }

    state.set_selection(selection);
    if let Some(country) = toggled {
        state.toggle_country(country);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Export filtered rows…").clicked() {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} rows loaded, {} visible",
            state.dataset.len(),
            state.visible_indices.len()
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                Color32::GREEN
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn export_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export filtered rows")
        .set_file_name("athlete_events_filtered.csv")
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        state.export_visible(&path);
    }
}
