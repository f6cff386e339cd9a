use std::path::Path;

use crate::color::ColorMap;
use crate::data::aggregate::DashboardViews;
use crate::data::export::export_csv_file;
use crate::data::filter::{filter, FilterSelection, FilteredView};
use crate::data::model::Dataset;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded once at startup, shared read-only for the process lifetime.
    pub dataset: &'static Dataset,

    /// Current filter selection.
    pub selection: FilterSelection,

    /// Indices of rows passing the current selection (cached).
    pub visible_indices: Vec<usize>,

    /// Aggregates over the visible rows (cached).
    pub views: DashboardViews,

    /// Colours for the selected countries.
    pub country_colors: ColorMap,

    /// Rows shown in the preview table.
    pub preview_rows: usize,

    /// Text typed into the country search box.
    pub country_query: String,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(dataset: &'static Dataset, preview_rows: usize) -> Self {
        let mut state = Self {
            dataset,
            selection: FilterSelection::full(dataset),
            visible_indices: Vec::new(),
            views: DashboardViews::default(),
            country_colors: ColorMap::default(),
            preview_rows,
            country_query: String::new(),
            status_message: None,
        };
        state.refilter();
        state
    }

    /// Recompute the visible rows and every aggregate from the base dataset.
    pub fn refilter(&mut self) {
        let view = filter(self.dataset, &self.selection);
        self.views = DashboardViews::compute(&view, &self.selection, self.preview_rows);
        self.country_colors = ColorMap::new(&self.selection.countries);
        if view.is_empty() {
            log::info!("No rows match selection {:?}", self.selection);
        }
        log::debug!(
            "Selection {:?} matches {} of {} rows",
            self.selection,
            view.len(),
            self.dataset.len()
        );
        self.visible_indices = view.indices;
    }

    /// Replace the selection and recompute if it changed.
    pub fn set_selection(&mut self, selection: FilterSelection) {
        if selection != self.selection {
            self.selection = selection;
            self.refilter();
        }
    }

    /// Toggle a single country in the multi-select.
    pub fn toggle_country(&mut self, country: &str) {
        let mut selection = self.selection.clone();
        if !selection.countries.remove(country) {
            selection.countries.insert(country.to_string());
        }
        self.set_selection(selection);
    }

    /// Back to every year, every sport, no countries.
    pub fn reset_filters(&mut self) {
        self.set_selection(FilterSelection::full(self.dataset));
    }

    /// Export the visible rows to a CSV chosen by the user.
    pub fn export_visible(&mut self, path: &Path) {
        let view = FilteredView {
            dataset: self.dataset,
            indices: self.visible_indices.clone(),
        };
        match export_csv_file(&view, path) {
            Ok(n) => self.status_message = Some(format!("Exported {n} rows")),
            Err(e) => {
                log::error!("Failed to export: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
