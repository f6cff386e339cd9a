use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::aggregate::Metrics;
use crate::data::model::{AthleteRecord, COLUMNS};

/// Thousands separator, e.g. `271116` → `271,116`.
pub fn format_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn metric(ui: &mut Ui, label: &str, value: usize) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(label).weak());
        ui.label(RichText::new(format_count(value)).size(26.0).strong());
    });
}

/// The four headline counters.
pub fn metrics_row(ui: &mut Ui, m: &Metrics) {
    ui.columns(4, |cols| {
        metric(&mut cols[0], "Total Athletes", m.total_athletes);
        metric(&mut cols[1], "Total Events", m.total_events);
        metric(&mut cols[2], "Total Countries", m.total_countries);
        metric(&mut cols[3], "Total Medals", m.total_medals);
    });
}

/// First rows of the filtered view, every column.
pub fn preview_table(ui: &mut Ui, rows: &[AthleteRecord]) {
    if rows.is_empty() {
        ui.label(RichText::new("No rows match the current filters.").weak());
        return;
    }

    egui::ScrollArea::horizontal()
        .id_salt("preview")
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .vscroll(false)
                .columns(Column::auto().at_least(40.0).resizable(true), COLUMNS.len())
                .header(20.0, |mut header| {
                    for name in COLUMNS {
                        header.col(|ui: &mut Ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|mut body| {
                    for rec in rows {
                        body.row(18.0, |mut row| {
                            for name in COLUMNS {
                                row.col(|ui: &mut Ui| {
                                    ui.label(rec.cell(name));
                                });
                            }
                        });
                    }
                });
        });
}
