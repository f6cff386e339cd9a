use std::f32::consts::TAU;

use eframe::egui::{Color32, RichText, Sense, Shape, Stroke, Ui, Vec2};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Line, Plot, PlotPoints, PlotUi,
    Points,
};

use crate::color::{medal_color, sex_color, sex_label, ColorMap};
use crate::data::aggregate::{
    nearest_point, CountrySeries, HistogramSeries, MedalPivot, ScatterPoint,
};
use crate::data::model::Sex;

const PLOT_HEIGHT: f32 = 260.0;

/// How far (cm / kg) the cursor may be from an athlete for the hover label.
const HOVER_RADIUS: f64 = 1.5;

fn no_data(ui: &mut Ui) {
    ui.label(RichText::new("No rows match the current filters.").weak());
}

// ---------------------------------------------------------------------------
// Histograms (age, BMI) with a box-plot marginal
// ---------------------------------------------------------------------------

/// Stacked histogram per sex, with a box plot strip above it.
pub fn histogram(ui: &mut Ui, id: &str, series: &[HistogramSeries], x_label: &str) {
    if series.is_empty() {
        no_data(ui);
        return;
    }

    Plot::new(format!("{id}_box"))
        .height(70.0)
        .show_axes([false, false])
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            for (row, s) in series.iter().enumerate() {
                let spread = BoxSpread::new(
                    s.summary.min,
                    s.summary.q1,
                    s.summary.median,
                    s.summary.q3,
                    s.summary.max,
                );
                let elem = BoxElem::new(row as f64, spread).box_width(0.6);
                plot_ui.box_plot(
                    BoxPlot::new(vec![elem])
                        .name(sex_label(s.sex))
                        .color(sex_color(s.sex))
                        .horizontal(),
                );
            }
        });

    Plot::new(id)
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(x_label)
        .y_axis_label("count")
        .show(ui, |plot_ui| {
            let mut below: Vec<BarChart> = Vec::new();
            for s in series {
                let bars = s
                    .bins
                    .iter()
                    .map(|b| {
                        Bar::new((b.start + b.end) / 2.0, b.count as f64).width(b.end - b.start)
                    })
                    .collect();
                let refs: Vec<&BarChart> = below.iter().collect();
                let chart = BarChart::new(bars)
                    .name(sex_label(s.sex))
                    .color(sex_color(s.sex))
                    .stack_on(&refs);
                below.push(chart);
            }
            for chart in below {
                plot_ui.bar_chart(chart);
            }
        });
}

// ---------------------------------------------------------------------------
// Gender pie
// ---------------------------------------------------------------------------

/// Pie chart of row counts per sex, drawn with the painter.
pub fn gender_pie(ui: &mut Ui, counts: &[(Option<Sex>, usize)]) {
    let total: usize = counts.iter().map(|(_, c)| c).sum();
    if total == 0 {
        no_data(ui);
        return;
    }

    ui.horizontal(|ui: &mut Ui| {
        let size = PLOT_HEIGHT.min(ui.available_width() * 0.6);
        let (rect, _) = ui.allocate_exact_size(Vec2::splat(size), Sense::hover());
        let painter = ui.painter_at(rect);
        let center = rect.center();
        let radius = size * 0.45;

        let mut start = -TAU / 4.0;
        for &(sex, count) in counts {
            let sweep = TAU * count as f32 / total as f32;
            // Fan of thin triangles so every piece stays convex.
            let steps = ((sweep / 0.05).ceil() as usize).max(1);
            let at = |angle: f32| center + radius * Vec2::angled(angle);
            for i in 0..steps {
                let a0 = start + sweep * i as f32 / steps as f32;
                let a1 = start + sweep * (i + 1) as f32 / steps as f32;
                painter.add(Shape::convex_polygon(
                    vec![center, at(a0), at(a1)],
                    sex_color(sex),
                    Stroke::NONE,
                ));
            }
            start += sweep;
        }
        painter.circle_stroke(center, radius, Stroke::new(1.0, Color32::DARK_GRAY));

        ui.vertical(|ui: &mut Ui| {
            for &(sex, count) in counts {
                let pct = 100.0 * count as f64 / total as f64;
                ui.label(
                    RichText::new(format!("■ {}  {count} ({pct:.1}%)", sex_label(sex)))
                        .color(sex_color(sex)),
                );
            }
        });
    });
}

// ---------------------------------------------------------------------------
// Height vs weight scatter
// ---------------------------------------------------------------------------

pub fn height_weight_scatter(ui: &mut Ui, points: &[ScatterPoint]) {
    if points.is_empty() {
        no_data(ui);
        return;
    }

    Plot::new("height_weight")
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Height (cm)")
        .y_axis_label("Weight (kg)")
        .label_formatter(|_name, value| scatter_label(points, value.x, value.y))
        .show(ui, |plot_ui| {
            for sex in [Sex::Male, Sex::Female] {
                let pts: PlotPoints = points
                    .iter()
                    .filter(|p| p.sex == sex)
                    .map(|p| [p.height, p.weight])
                    .collect();
                plot_ui.points(
                    Points::new(pts)
                        .name(sex_label(Some(sex)))
                        .color(sex_color(Some(sex)))
                        .radius(1.5),
                );
            }
        });
}

/// Hover text: the athlete under the cursor, or the raw coordinates.
fn scatter_label(points: &[ScatterPoint], height: f64, weight: f64) -> String {
    match nearest_point(points, height, weight, HOVER_RADIUS) {
        Some(p) => format!(
            "{}\n{} · {}\n{:.0} cm, {:.0} kg",
            p.name, p.sport, p.country, p.height, p.weight
        ),
        None => format!("{height:.0} cm, {weight:.0} kg"),
    }
}

// ---------------------------------------------------------------------------
// Top-N bars
// ---------------------------------------------------------------------------

/// Horizontal bars, largest on top, category names on the y axis.
pub fn ranked_bars(ui: &mut Ui, id: &str, entries: &[(String, usize)], value_label: &str) {
    if entries.is_empty() {
        no_data(ui);
        return;
    }

    let n = entries.len();
    let labels: Vec<String> = entries.iter().map(|(name, _)| name.clone()).collect();
    let bars = entries
        .iter()
        .enumerate()
        .map(|(i, (name, count))| {
            Bar::new((n - 1 - i) as f64, *count as f64)
                .name(name)
                .width(0.7)
        })
        .collect();

    Plot::new(id)
        .height(PLOT_HEIGHT)
        .x_axis_label(value_label)
        .y_axis_formatter(move |mark: GridMark, _range| {
            let v = mark.value;
            if v.fract() != 0.0 || v < 0.0 {
                return String::new();
            }
            labels
                .get(n.wrapping_sub(1).wrapping_sub(v as usize))
                .cloned()
                .unwrap_or_default()
        })
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(bars)
                    .color(Color32::from_rgb(99, 110, 250))
                    .horizontal(),
            );
        });
}

// ---------------------------------------------------------------------------
// Lines with markers
// ---------------------------------------------------------------------------

fn line_with_markers(plot_ui: &mut PlotUi, name: &str, color: Color32, pts: Vec<[f64; 2]>) {
    plot_ui.line(Line::new(PlotPoints::from(pts.clone())).name(name).color(color).width(2.0));
    plot_ui.points(Points::new(pts).name(name).color(color).radius(3.0));
}

pub fn medals_by_year(ui: &mut Ui, pivot: &MedalPivot) {
    if pivot.years.is_empty() {
        no_data(ui);
        return;
    }

    Plot::new("medals_by_year")
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Year")
        .y_axis_label("Medals")
        .show(ui, |plot_ui| {
            for (medal, values) in &pivot.series {
                let pts = pivot
                    .years
                    .iter()
                    .zip(values)
                    .map(|(&y, &c)| [y as f64, c as f64])
                    .collect();
                line_with_markers(plot_ui, &medal.to_string(), medal_color(*medal), pts);
            }
        });
}

/// Medal count per selected country. `None` means nothing is selected yet.
pub fn country_medals(ui: &mut Ui, series: Option<&[CountrySeries]>, colors: &ColorMap) {
    let Some(series) = series else {
        ui.label(
            RichText::new(
                "Please select one or more countries from the sidebar to see their medal counts.",
            )
            .italics(),
        );
        return;
    };
    if series.is_empty() {
        no_data(ui);
        return;
    }

    Plot::new("country_medals")
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Year")
        .y_axis_label("Medals")
        .show(ui, |plot_ui| {
            for s in series {
                let pts = s
                    .points
                    .iter()
                    .map(|&(y, c)| [y as f64, c as f64])
                    .collect();
                line_with_markers(plot_ui, &s.country, colors.color_for(&s.country), pts);
            }
        });
}

pub fn athletes_over_years(ui: &mut Ui, counts: &[(i32, usize)]) {
    if counts.is_empty() {
        no_data(ui);
        return;
    }

    Plot::new("athletes_over_years")
        .height(PLOT_HEIGHT)
        .x_axis_label("Year")
        .y_axis_label("Number of Athletes")
        .show(ui, |plot_ui| {
            let pts = counts.iter().map(|&(y, c)| [y as f64, c as f64]).collect();
            line_with_markers(plot_ui, "Athletes", Color32::LIGHT_BLUE, pts);
        });
}

/// Section heading used between chart groups.
pub fn section(ui: &mut Ui, title: &str) {
    ui.add_space(8.0);
    ui.separator();
    ui.heading(title);
}

pub fn subheading(ui: &mut Ui, title: &str) {
    ui.label(RichText::new(title).strong().size(15.0));
}
