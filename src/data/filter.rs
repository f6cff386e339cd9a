use std::collections::BTreeSet;

use super::model::{AthleteRecord, Dataset};

// ---------------------------------------------------------------------------
// FilterSelection – what the user picked in the side panel
// ---------------------------------------------------------------------------

/// Current filter choices.
///
/// * `sport: None` means every sport.
/// * An empty `countries` set means every country; otherwise a row passes
///   when its country is a member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSelection {
    /// Inclusive `(min, max)` year range.
    pub years: (i32, i32),
    pub sport: Option<String>,
    pub countries: BTreeSet<String>,
}

impl FilterSelection {
    /// The initial selection: every year in the dataset, no sport, no countries.
    pub fn full(dataset: &Dataset) -> Self {
        let years = dataset.year_bounds().unwrap_or((i32::MIN, i32::MAX));
        FilterSelection {
            years,
            sport: None,
            countries: BTreeSet::new(),
        }
    }

    /// Whether a single row passes every active filter.
    pub fn matches(&self, rec: &AthleteRecord) -> bool {
        let (lo, hi) = self.years;
        if rec.year < lo || rec.year > hi {
            return false;
        }
        if let Some(sport) = &self.sport {
            if rec.sport != *sport {
                return false;
            }
        }
        self.countries.is_empty() || self.countries.contains(&rec.country)
    }
}

// ---------------------------------------------------------------------------
// FilteredView – row subset of the dataset
// ---------------------------------------------------------------------------

/// Indices into a borrowed [`Dataset`] of the rows passing a selection.
/// The base dataset is never modified.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    pub dataset: &'a Dataset,
    pub indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// A view over every row.
    pub fn all(dataset: &'a Dataset) -> Self {
        FilteredView {
            dataset,
            indices: (0..dataset.len()).collect(),
        }
    }

    /// Narrow this view further; applying the same selection twice is a no-op.
    pub fn refine(&self, selection: &FilterSelection) -> FilteredView<'a> {
        FilteredView {
            dataset: self.dataset,
            indices: self
                .indices
                .iter()
                .copied()
                .filter(|&i| selection.matches(&self.dataset.records[i]))
                .collect(),
        }
    }

    /// Rows in dataset order.
    pub fn rows(&self) -> impl Iterator<Item = &'a AthleteRecord> + '_ {
        let records = &self.dataset.records;
        self.indices.iter().map(move |&i| &records[i])
    }

    /// The first `n` rows, for the preview table.
    pub fn head(&self, n: usize) -> Vec<&'a AthleteRecord> {
        self.rows().take(n).collect()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Return the rows of `dataset` that satisfy `selection`.
///
/// A selection referencing values that do not occur in the data yields an
/// empty view, never an error.
pub fn filter<'a>(dataset: &'a Dataset, selection: &FilterSelection) -> FilteredView<'a> {
    FilteredView::all(dataset).refine(selection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;

    fn dataset() -> Dataset {
        Dataset::from_records(vec![
            record(1, "A", 2000, "Judo", "JPN"),
            record(2, "B", 2000, "Judo", "JPN"),
            record(3, "C", 2004, "Swimming", "USA"),
            record(4, "D", 2008, "Swimming", "FRA"),
        ])
    }

    fn ids(view: &FilteredView) -> Vec<u64> {
        view.rows().map(|r| r.id).collect()
    }

    #[test]
    fn test_full_selection_keeps_everything() {
        let ds = dataset();
        let sel = FilterSelection::full(&ds);
        assert_eq!(sel.years, (2000, 2008));
        assert_eq!(filter(&ds, &sel).len(), 4);
    }

    #[test]
    fn test_year_range_is_inclusive() {
        let ds = dataset();
        let sel = FilterSelection {
            years: (2000, 2004),
            ..FilterSelection::full(&ds)
        };
        assert_eq!(ids(&filter(&ds, &sel)), vec![1, 2, 3]);
    }

    #[test]
    fn test_sport_and_countries_combine() {
        let ds = dataset();
        let sel = FilterSelection {
            sport: Some("Swimming".into()),
            countries: ["USA".to_string(), "JPN".to_string()].into(),
            ..FilterSelection::full(&ds)
        };
        assert_eq!(ids(&filter(&ds, &sel)), vec![3]);
    }

    #[test]
    fn test_unknown_values_give_empty_view() {
        let ds = dataset();
        let sel = FilterSelection {
            sport: Some("Quidditch".into()),
            ..FilterSelection::full(&ds)
        };
        assert!(filter(&ds, &sel).is_empty());

        let sel = FilterSelection {
            years: (1800, 1850),
            ..FilterSelection::full(&ds)
        };
        assert!(filter(&ds, &sel).is_empty());
    }

    #[test]
    fn test_refine_is_idempotent() {
        let ds = dataset();
        let sel = FilterSelection {
            years: (2000, 2004),
            countries: ["JPN".to_string()].into(),
            ..FilterSelection::full(&ds)
        };
        let once = filter(&ds, &sel);
        let twice = once.refine(&sel);
        assert_eq!(once.indices, twice.indices);
    }

    #[test]
    fn test_filter_leaves_dataset_untouched() {
        let ds = dataset();
        let before = ds.records.clone();
        let sel = FilterSelection {
            sport: Some("Judo".into()),
            ..FilterSelection::full(&ds)
        };
        let _ = filter(&ds, &sel);
        assert_eq!(ds.records, before);
    }

    #[test]
    fn test_head_takes_first_rows_in_order() {
        let ds = dataset();
        let view = filter(&ds, &FilterSelection::full(&ds));
        let head: Vec<u64> = view.head(2).iter().map(|r| r.id).collect();
        assert_eq!(head, vec![1, 2]);
        assert_eq!(view.head(10).len(), 4);
    }
}
