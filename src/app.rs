use eframe::egui::{self, ScrollArea, Ui};

use crate::data::model::Dataset;
use crate::state::AppState;
use crate::ui::{panels, plot, summary};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct OlympicDashApp {
    pub state: AppState,
}

impl OlympicDashApp {
    pub fn new(dataset: &'static Dataset, preview_rows: usize) -> Self {
        Self {
            state: AppState::new(dataset, preview_rows),
        }
    }
}

impl eframe::App for OlympicDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: metrics and charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| dashboard(ui, &self.state));
        });
    }
}

fn dashboard(ui: &mut Ui, state: &AppState) {
    let views = &state.views;

    ui.heading("🏅 Olympic Athlete Data Analysis Dashboard");
    ui.add_space(6.0);
    summary::metrics_row(ui, &views.metrics);

    plot::section(ui, "Dataset Overview");
    summary::preview_table(ui, &views.preview);

    plot::section(ui, "Key Distributions");
    ui.columns(2, |cols| {
        plot::subheading(&mut cols[0], "1. Age Distribution by Gender");
        plot::histogram(&mut cols[0], "age_hist", &views.age_by_gender, "Age");
        plot::subheading(&mut cols[1], "2. Gender Proportion");
        plot::gender_pie(&mut cols[1], &views.gender_proportion);
    });

    plot::section(ui, "Physical Attributes");
    ui.columns(2, |cols| {
        plot::subheading(&mut cols[0], "3. Height vs Weight");
        plot::height_weight_scatter(&mut cols[0], &views.height_weight);
        plot::subheading(&mut cols[1], "4. BMI Distribution");
        plot::histogram(&mut cols[1], "bmi_hist", &views.bmi_distribution, "BMI");
    });

    plot::section(ui, "Event and Medal Analysis");
    ui.columns(2, |cols| {
        plot::subheading(&mut cols[0], "5. Top 10 Sports by Medals");
        plot::ranked_bars(&mut cols[0], "top_sports", &views.top_sports, "Number of Medals");
        plot::subheading(&mut cols[1], "6. Medals Over the Years by Type");
        plot::medals_by_year(&mut cols[1], &views.medals_by_year);
    });

    plot::section(ui, "Country and Athlete Performance");
    plot::subheading(ui, "7. Top 10 Athletes with Most Medals");
    plot::ranked_bars(ui, "top_athletes", &views.top_athletes, "Number of Medals");

    plot::subheading(ui, "8. Medal Count for Selected Countries");
    plot::country_medals(ui, views.country_medals.as_deref(), &state.country_colors);

    plot::subheading(ui, "9. Athletes Over the Years");
    plot::athletes_over_years(ui, &views.athletes_over_years);
}
