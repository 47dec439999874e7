//! Dashboard session state.
//!
//! A session holds the shared dataset, the KPI summary computed once per
//! load and the current filter selection. Changing the selection only
//! recomputes the filtered subset and then notifies observers.

use crate::analysis;
use crate::dataset::Dataset;
use crate::models::{
    DashboardReport, DashboardSummary, FilterResult, FilterSelection, ReportMetadata,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Receives the new filter result whenever the selection changes.
pub trait SelectionObserver {
    fn on_selection_changed(&mut self, result: &FilterResult);
}

/// Settings that shape a session.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Number of cast members kept in the ranking.
    pub top_actors: usize,
    /// Initial content type; the first type option when unset.
    pub default_type: Option<String>,
    /// Initial year; the latest year option when unset.
    pub default_year: Option<i32>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            top_actors: 10,
            default_type: None,
            default_year: None,
        }
    }
}

impl From<&crate::config::Config> for SessionSettings {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            top_actors: config.report.top_actors,
            default_type: config.filter.default_type.clone(),
            default_year: config.filter.default_year,
        }
    }
}

/// One interactive dashboard session over a loaded dataset.
pub struct Session {
    dataset: Arc<Dataset>,
    settings: SessionSettings,
    summary: DashboardSummary,
    filtered: Option<FilterResult>,
    observers: Vec<Box<dyn SelectionObserver>>,
    filter_runs: usize,
}

impl Session {
    /// Start a session; computes the summary and the initial filter.
    pub fn new(dataset: Arc<Dataset>, settings: SessionSettings) -> Self {
        let summary = analysis::summarize(dataset.titles(), settings.top_actors);
        let mut session = Self {
            dataset,
            settings,
            summary,
            filtered: None,
            observers: Vec::new(),
            filter_runs: 0,
        };

        if let Some(selection) = session.initial_selection() {
            let result = session.run_filter(selection);
            session.filtered = Some(result);
        }

        session
    }

    /// Register an observer for selection changes.
    pub fn subscribe(&mut self, observer: Box<dyn SelectionObserver>) {
        self.observers.push(observer);
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub fn summary(&self) -> &DashboardSummary {
        &self.summary
    }

    pub fn selection(&self) -> Option<&FilterSelection> {
        self.filtered.as_ref().map(|f| &f.selection)
    }

    pub fn filtered(&self) -> Option<&FilterResult> {
        self.filtered.as_ref()
    }

    /// How many times the filtered subset has been computed.
    #[allow(dead_code)] // Introspection utility
    pub fn filter_runs(&self) -> usize {
        self.filter_runs
    }

    /// Change the content type, keeping the current year.
    ///
    /// Returns `true` when the selection changed.
    pub fn set_type(&mut self, kind: &str) -> bool {
        let year = self
            .selection()
            .map(|s| s.year)
            .or_else(|| self.dataset.year_options().last().copied());

        match year {
            Some(year) => self.set_selection(FilterSelection {
                kind: kind.to_string(),
                year,
            }),
            None => {
                warn!("No addition years in dataset; cannot filter by type");
                false
            }
        }
    }

    /// Change the year, keeping the current content type.
    ///
    /// Returns `true` when the selection changed.
    pub fn set_year(&mut self, year: i32) -> bool {
        let kind = self
            .selection()
            .map(|s| s.kind.clone())
            .or_else(|| self.dataset.type_options().into_iter().next());

        match kind {
            Some(kind) => self.set_selection(FilterSelection { kind, year }),
            None => {
                warn!("No content types in dataset; cannot filter by year");
                false
            }
        }
    }

    /// Replace the whole selection and notify observers if it changed.
    pub fn set_selection(&mut self, selection: FilterSelection) -> bool {
        if self.selection() == Some(&selection) {
            debug!("Selection unchanged: {}", selection);
            return false;
        }

        if !self.dataset.type_options().contains(&selection.kind) {
            warn!("Type '{}' does not occur in the dataset", selection.kind);
        }

        let result = self.run_filter(selection);
        self.notify(&result);
        self.filtered = Some(result);
        true
    }

    /// Swap in a freshly loaded dataset and recompute everything.
    pub fn replace_dataset(&mut self, dataset: Arc<Dataset>) {
        info!("Recomputing dashboard for {} titles", dataset.len());
        self.summary = analysis::summarize(dataset.titles(), self.settings.top_actors);
        self.dataset = dataset;

        let selection = self
            .selection()
            .cloned()
            .or_else(|| self.initial_selection());

        let filtered = selection.map(|s| self.run_filter(s));
        if let Some(ref result) = filtered {
            self.notify(result);
        }
        self.filtered = filtered;
    }

    /// Snapshot of the dashboard for rendering.
    pub fn report(&self, preview_rows: usize) -> DashboardReport {
        DashboardReport {
            metadata: ReportMetadata {
                source: self.dataset.source().display().to_string(),
                generated_at: Utc::now(),
                total_rows: self.dataset.len(),
                unparsed_dates: self.dataset.unparsed_dates(),
            },
            summary: self.summary.clone(),
            preview: self
                .dataset
                .titles()
                .iter()
                .take(preview_rows)
                .cloned()
                .collect(),
            filter: self.filtered.clone(),
        }
    }

    fn initial_selection(&self) -> Option<FilterSelection> {
        let kind = self
            .settings
            .default_type
            .clone()
            .or_else(|| self.dataset.type_options().into_iter().next())?;
        let year = self
            .settings
            .default_year
            .or_else(|| self.dataset.year_options().last().copied())?;

        Some(FilterSelection { kind, year })
    }

    fn run_filter(&mut self, selection: FilterSelection) -> FilterResult {
        self.filter_runs += 1;
        let rows: Vec<_> =
            analysis::filter_titles(self.dataset.titles(), &selection.kind, selection.year)
                .into_iter()
                .cloned()
                .collect();
        debug!("Filter {} matched {} rows", selection, rows.len());

        FilterResult { selection, rows }
    }

    fn notify(&mut self, result: &FilterResult) {
        for observer in &mut self.observers {
            observer.on_selection_changed(result);
        }
    }
}
