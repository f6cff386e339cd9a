use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use super::filter::{FilterSelection, FilteredView};
use super::model::{AthleteRecord, Medal, Sex};

/// Length of the "top N" bar charts.
pub const TOP_N: usize = 10;
/// Histogram bucket width for ages (years).
pub const AGE_BIN_WIDTH: f64 = 1.0;
/// Histogram bucket width for BMI (kg/m²).
pub const BMI_BIN_WIDTH: f64 = 1.0;

// ---------------------------------------------------------------------------
// Result types – plain data, no chart objects
// ---------------------------------------------------------------------------

/// Headline counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Metrics {
    /// Distinct athlete IDs.
    pub total_athletes: usize,
    /// Distinct events.
    pub total_events: usize,
    /// Distinct countries.
    pub total_countries: usize,
    /// Rows carrying a medal.
    pub total_medals: usize,
}

/// One histogram bucket covering `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Five-number summary backing the box-plot marginal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Histogram of one `Sex` partition (`None` = unknown).
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSeries {
    pub sex: Option<Sex>,
    pub bins: Vec<HistogramBin>,
    pub summary: BoxSummary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub height: f64,
    pub weight: f64,
    pub sex: Sex,
    pub name: String,
    pub sport: String,
    pub country: String,
}

/// Medal counts pivoted to one series per medal type over `years`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MedalPivot {
    pub years: Vec<i32>,
    /// Each vector is aligned with `years`; absent combinations are 0.
    pub series: Vec<(Medal, Vec<usize>)>,
}

/// Medals per year for one country.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountrySeries {
    pub country: String,
    pub points: Vec<(i32, usize)>,
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

pub fn metrics(view: &FilteredView) -> Metrics {
    let mut athletes = HashSet::new();
    let mut events = HashSet::new();
    let mut countries = HashSet::new();
    let mut medals = 0;

    for rec in view.rows() {
        athletes.insert(rec.id);
        events.insert(rec.event.as_str());
        countries.insert(rec.country.as_str());
        if rec.medal.is_some() {
            medals += 1;
        }
    }

    Metrics {
        total_athletes: athletes.len(),
        total_events: events.len(),
        total_countries: countries.len(),
        total_medals: medals,
    }
}

/// Ages partitioned by sex, rows without an age are dropped.
pub fn age_by_gender(view: &FilteredView) -> Vec<HistogramSeries> {
    histogram_by_sex(view.rows().filter_map(|r| Some((r.sex, r.age?))), AGE_BIN_WIDTH)
}

/// BMI partitioned by sex, rows without a BMI are dropped.
pub fn bmi_distribution(view: &FilteredView) -> Vec<HistogramSeries> {
    histogram_by_sex(view.rows().filter_map(|r| Some((r.sex, r.bmi?))), BMI_BIN_WIDTH)
}

/// Row count per sex, largest first. Unknown sex is its own bucket.
pub fn gender_proportion(view: &FilteredView) -> Vec<(Option<Sex>, usize)> {
    let mut counts: BTreeMap<Option<Sex>, usize> = BTreeMap::new();
    for rec in view.rows() {
        *counts.entry(rec.sex).or_default() += 1;
    }
    let mut out: Vec<_> = counts.into_iter().collect();
    // stable: equal counts keep key order
    out.sort_by(|a, b| b.1.cmp(&a.1));
    out
}

/// Rows with height, weight and sex all present.
pub fn height_weight_scatter(view: &FilteredView) -> Vec<ScatterPoint> {
    view.rows()
        .filter_map(|r| {
            Some(ScatterPoint {
                height: r.height?,
                weight: r.weight?,
                sex: r.sex?,
                name: r.name.clone(),
                sport: r.sport.clone(),
                country: r.country.clone(),
            })
        })
        .collect()
}

/// The scatter point closest to `(height, weight)`, if any lies within
/// `max_distance` (in plot units).
pub fn nearest_point(
    points: &[ScatterPoint],
    height: f64,
    weight: f64,
    max_distance: f64,
) -> Option<&ScatterPoint> {
    let dist2 = |p: &ScatterPoint| (p.height - height).powi(2) + (p.weight - weight).powi(2);
    points
        .iter()
        .filter(|p| dist2(p) <= max_distance * max_distance)
        .min_by(|a, b| dist2(a).total_cmp(&dist2(b)))
}

pub fn top_sports_by_medals(view: &FilteredView) -> Vec<(String, usize)> {
    top_counts(medal_rows(view).map(|r| r.sport.as_str()), TOP_N)
}

/// Medal-bearing rows per athlete name. Namesakes are not told apart.
pub fn top_athletes_by_medals(view: &FilteredView) -> Vec<(String, usize)> {
    top_counts(medal_rows(view).map(|r| r.name.as_str()), TOP_N)
}

/// Medal counts by (year, type). Once any medal exists every type gets a
/// series, zero-filled for years where it was not awarded.
pub fn medals_by_year_and_type(view: &FilteredView) -> MedalPivot {
    let mut counts: HashMap<(i32, Medal), usize> = HashMap::new();
    let mut years = BTreeSet::new();
    for rec in medal_rows(view) {
        if let Some(medal) = rec.medal {
            *counts.entry((rec.year, medal)).or_default() += 1;
            years.insert(rec.year);
        }
    }
    if years.is_empty() {
        return MedalPivot::default();
    }

    let years: Vec<i32> = years.into_iter().collect();
    let series = Medal::ALL
        .iter()
        .map(|&medal| {
            let values = years
                .iter()
                .map(|&y| counts.get(&(y, medal)).copied().unwrap_or(0))
                .collect();
            (medal, values)
        })
        .collect();

    MedalPivot { years, series }
}

/// Medals per year for each selected country.
///
/// Returns `None` when no country is selected, so the caller can show a
/// prompt instead of silently plotting every country.
pub fn country_medals_over_years(
    view: &FilteredView,
    countries: &BTreeSet<String>,
) -> Option<Vec<CountrySeries>> {
    if countries.is_empty() {
        return None;
    }
    let mut per_country: BTreeMap<&str, BTreeMap<i32, usize>> = BTreeMap::new();
    for rec in medal_rows(view).filter(|r| countries.contains(&r.country)) {
        *per_country
            .entry(rec.country.as_str())
            .or_default()
            .entry(rec.year)
            .or_default() += 1;
    }
    Some(
        per_country
            .into_iter()
            .map(|(country, years)| CountrySeries {
                country: country.to_string(),
                points: years.into_iter().collect(),
            })
            .collect(),
    )
}

/// Distinct athlete IDs per year, ascending by year.
pub fn athletes_over_years(view: &FilteredView) -> Vec<(i32, usize)> {
    let mut per_year: BTreeMap<i32, HashSet<u64>> = BTreeMap::new();
    for rec in view.rows() {
        per_year.entry(rec.year).or_default().insert(rec.id);
    }
    per_year
        .into_iter()
        .map(|(year, ids)| (year, ids.len()))
        .collect()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn medal_rows<'v, 'a: 'v>(
    view: &'v FilteredView<'a>,
) -> impl Iterator<Item = &'a AthleteRecord> + 'v {
    view.rows().filter(|r| r.medal.is_some())
}

/// Count keys and keep the `n` most frequent. Ties keep first-seen order.
fn top_counts<'k>(keys: impl Iterator<Item = &'k str>, n: usize) -> Vec<(String, usize)> {
    // key -> (first position, count)
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (pos, key) in keys.enumerate() {
        counts.entry(key).or_insert((pos, 0)).1 += 1;
    }
    let mut ranked: Vec<_> = counts.into_iter().collect();
    ranked.sort_by(|(_, (pa, ca)), (_, (pb, cb))| cb.cmp(ca).then(pa.cmp(pb)));
    ranked
        .into_iter()
        .take(n)
        .map(|(key, (_, count))| (key.to_string(), count))
        .collect()
}

fn histogram_by_sex(
    values: impl Iterator<Item = (Option<Sex>, f64)>,
    width: f64,
) -> Vec<HistogramSeries> {
    let mut groups: BTreeMap<Option<Sex>, Vec<f64>> = BTreeMap::new();
    for (sex, v) in values.filter(|(_, v)| v.is_finite()) {
        groups.entry(sex).or_default().push(v);
    }

    groups
        .into_iter()
        .filter_map(|(sex, mut values)| {
            values.sort_by(f64::total_cmp);
            Some(HistogramSeries {
                sex,
                bins: bucket(&values, width),
                summary: box_summary(&values)?,
            })
        })
        .collect()
}

/// Bucket sorted values into `[k*width, (k+1)*width)` bins, skipping empty ones.
fn bucket(values: &[f64], width: f64) -> Vec<HistogramBin> {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for v in values {
        *counts.entry((v / width).floor() as i64).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(k, count)| HistogramBin {
            start: k as f64 * width,
            end: (k + 1) as f64 * width,
            count,
        })
        .collect()
}

/// Quartiles by linear interpolation between closest ranks.
fn box_summary(sorted: &[f64]) -> Option<BoxSummary> {
    let (&min, &max) = (sorted.first()?, sorted.last()?);
    let quantile = |p: f64| {
        let h = (sorted.len() - 1) as f64 * p;
        let lo = h.floor() as usize;
        let hi = h.ceil() as usize;
        sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
    };
    Some(BoxSummary {
        min,
        q1: quantile(0.25),
        median: quantile(0.5),
        q3: quantile(0.75),
        max,
    })
}

// ---------------------------------------------------------------------------
// DashboardViews – everything the UI renders for one selection
// ---------------------------------------------------------------------------

/// All aggregate views for the current selection, recomputed from scratch on
/// every change.
#[derive(Debug, Clone, Default)]
pub struct DashboardViews {
    pub metrics: Metrics,
    pub preview: Vec<AthleteRecord>,
    pub age_by_gender: Vec<HistogramSeries>,
    pub gender_proportion: Vec<(Option<Sex>, usize)>,
    pub height_weight: Vec<ScatterPoint>,
    pub bmi_distribution: Vec<HistogramSeries>,
    pub top_sports: Vec<(String, usize)>,
    pub medals_by_year: MedalPivot,
    pub top_athletes: Vec<(String, usize)>,
    /// `None` until at least one country is selected.
    pub country_medals: Option<Vec<CountrySeries>>,
    pub athletes_over_years: Vec<(i32, usize)>,
}

impl DashboardViews {
    pub fn compute(view: &FilteredView, selection: &FilterSelection, preview_rows: usize) -> Self {
        DashboardViews {
            metrics: metrics(view),
            preview: view.head(preview_rows).into_iter().cloned().collect(),
            age_by_gender: age_by_gender(view),
            gender_proportion: gender_proportion(view),
            height_weight: height_weight_scatter(view),
            bmi_distribution: bmi_distribution(view),
            top_sports: top_sports_by_medals(view),
            medals_by_year: medals_by_year_and_type(view),
            top_athletes: top_athletes_by_medals(view),
            country_medals: country_medals_over_years(view, &selection.countries),
            athletes_over_years: athletes_over_years(view),
        }
    }
}
