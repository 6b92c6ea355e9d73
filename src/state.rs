use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::chart::{build_chart, ChartKind, ChartOutcome, ChartRole, ChartSelection};
use crate::config::{HttpConfig, REPORT_TITLE};
use crate::data::export::DownloadArtifact;
use crate::data::filter::{filtered_indices, FilterSelection, FilteredView};
use crate::data::loader;
use crate::data::model::{Dataset, Value};
use crate::report::ProfileReport;

pub const URL_LOADED: &str = "Data loaded successfully from URL!";

// ---------------------------------------------------------------------------
// Session types
// ---------------------------------------------------------------------------

/// The two mutually exclusive input modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataSource {
    #[default]
    Upload,
    Url,
}

impl DataSource {
    pub fn label(self) -> &'static str {
        match self {
            DataSource::Upload => "Upload CSV",
            DataSource::Url => "Enter Public URL",
        }
    }
}

/// A dataset together with where it came from (file name or URL).
#[derive(Debug, Clone)]
pub struct LoadedSource {
    pub origin: String,
    pub dataset: Dataset,
}

/// Outcome of the last load attempt of one input mode.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadStatus {
    #[default]
    Idle,
    Success(String),
    /// Recoverable failure shown as a friendly error (URL loads).
    Error(String),
    /// Unrecovered failure; the whole error chain is shown (uploads).
    Fault(String),
}

/// Everything a widget can ask the session to do.
#[derive(Debug, Clone)]
pub enum UiEvent {
    SelectSource(DataSource),
    OpenFile(PathBuf),
    DropFile { name: String, bytes: Arc<[u8]> },
    EditUrl(String),
    SubmitUrl,
    SetFilterColumn(String),
    ToggleFilterValue(Value, bool),
    SelectAllValues,
    SelectNoValues,
    SetChartKind(ChartKind),
    PickChartColumn(ChartRole, String),
    SaveExport(PathBuf),
    SaveReport(PathBuf),
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// Widgets never mutate it directly: they emit [`UiEvent`]s which
/// [`AppState::handle`] applies, recomputing the derived views.
#[derive(Debug, Default)]
pub struct AppState {
    pub source: DataSource,
    pub upload: Option<LoadedSource>,
    pub upload_status: LoadStatus,
    pub fetched: Option<LoadedSource>,
    pub url_status: LoadStatus,
    pub url_input: String,
    pub http: HttpConfig,

    pub filter: Option<FilterSelection>,
    pub chart: ChartSelection,

    /// Indices of rows passing the current filter (cached).
    pub visible_indices: Vec<usize>,
    pub chart_outcome: Option<ChartOutcome>,
    pub report: Option<ProfileReport>,

    /// Result of the last save (export or report), shown next to the buttons.
    pub save_message: Option<String>,
}

impl AppState {
    /// Dataset of the active input mode.
    pub fn dataset(&self) -> Option<&Dataset> {
        self.active_source().map(|s| &s.dataset)
    }

    pub fn active_source(&self) -> Option<&LoadedSource> {
        match self.source {
            DataSource::Upload => self.upload.as_ref(),
            DataSource::Url => self.fetched.as_ref(),
        }
    }

    pub fn status(&self) -> &LoadStatus {
        match self.source {
            DataSource::Upload => &self.upload_status,
            DataSource::Url => &self.url_status,
        }
    }

    pub fn filtered_view(&self) -> Option<FilteredView<'_>> {
        self.dataset()
            .map(|ds| FilteredView::new(ds, &self.visible_indices))
    }

    /// Apply one interaction and refresh whatever depends on it.
    pub fn handle(&mut self, event: UiEvent) {
        match event {
            UiEvent::SelectSource(source) => {
                if self.source != source {
                    self.source = source;
                    self.on_dataset_changed();
                }
            }
            UiEvent::OpenFile(path) => {
                let origin = file_label(&path);
                let result = loader::load_file(&path);
                self.source = DataSource::Upload;
                self.set_upload(origin, result);
            }
            UiEvent::DropFile { name, bytes } => {
                let result = loader::load_bytes(&name, &bytes);
                self.source = DataSource::Upload;
                self.set_upload(name, result);
            }
            UiEvent::EditUrl(url) => self.url_input = url,
            UiEvent::SubmitUrl => self.fetch_url(),
            UiEvent::SetFilterColumn(column) => {
                let selection = self.dataset().map(|ds| FilterSelection::all_of(ds, &column));
                if selection.is_some() {
                    self.filter = selection;
                    self.refilter();
                }
            }
            UiEvent::ToggleFilterValue(value, on) => {
                if let Some(sel) = self.filter.as_mut() {
                    sel.toggle(&value, on);
                    self.refilter();
                }
            }
            UiEvent::SelectAllValues => {
                let all = match (self.dataset(), &self.filter) {
                    (Some(ds), Some(sel)) => Some(FilterSelection::all_of(ds, &sel.column)),
                    _ => None,
                };
                if all.is_some() {
                    self.filter = all;
                    self.refilter();
                }
            }
            UiEvent::SelectNoValues => {
                if let Some(sel) = self.filter.as_mut() {
                    sel.selected.clear();
                    self.refilter();
                }
            }
            UiEvent::SetChartKind(kind) => {
                self.chart.kind = kind;
                self.rebuild_chart();
            }
            UiEvent::PickChartColumn(role, column) => {
                self.chart.set_pick(role, column);
                self.rebuild_chart();
            }
            UiEvent::SaveExport(path) => {
                let outcome = self.save_export(&path);
                self.record_save(outcome);
            }
            UiEvent::SaveReport(path) => {
                let outcome = self.save_report(&path);
                self.record_save(outcome);
            }
        }
    }

    fn set_upload(&mut self, origin: String, result: loader::LoadResult<Dataset>) {
        match result {
            Ok(dataset) => {
                log::info!(
                    "Loaded {origin}: {} rows, columns {:?}",
                    dataset.len(),
                    dataset.column_names()
                );
                self.upload = Some(LoadedSource { origin, dataset });
                self.upload_status = LoadStatus::Idle;
            }
            Err(e) => {
                log::error!("Failed to parse upload {origin}: {e:#}");
                self.upload = None;
                self.upload_status = LoadStatus::Fault(format!("{origin}: {:#}", anyhow::Error::from(e)));
            }
        }
        self.on_dataset_changed();
    }

    fn fetch_url(&mut self) {
        let url = self.url_input.trim().to_string();
        if url.is_empty() {
            self.fetched = None;
            self.url_status = LoadStatus::Idle;
        } else {
            match loader::load_url(&url, &self.http) {
                Ok(dataset) => {
                    log::info!("Loaded {} rows from {url}", dataset.len());
                    self.fetched = Some(LoadedSource {
                        origin: url,
                        dataset,
                    });
                    self.url_status = LoadStatus::Success(URL_LOADED.to_string());
                }
                Err(e) => {
                    log::error!("Failed to load data from {url}: {e}");
                    self.fetched = None;
                    self.url_status = LoadStatus::Error(format!("Failed to load data from URL: {e}"));
                }
            }
        }
        self.source = DataSource::Url;
        self.on_dataset_changed();
    }

    /// Reset selections and rebuild every derived view for the active dataset.
    fn on_dataset_changed(&mut self) {
        let (filter, report) = match self.dataset() {
            Some(ds) => (
                FilterSelection::initial(ds),
                Some(ProfileReport::build(ds, REPORT_TITLE)),
            ),
            None => (None, None),
        };
        self.filter = filter;
        self.report = report;
        self.save_message = None;
        self.refilter();
        self.rebuild_chart();
    }

    /// Recompute `visible_indices` after a filter change.
    fn refilter(&mut self) {
        let indices = match (self.dataset(), &self.filter) {
            (Some(ds), Some(sel)) => filtered_indices(ds, sel),
            _ => Vec::new(),
        };
        self.visible_indices = indices;
    }

    fn rebuild_chart(&mut self) {
        let outcome = self.dataset().map(|ds| build_chart(ds, &self.chart));
        if let Some(ChartOutcome::Warning(msg)) = &outcome {
            log::debug!("{} not drawn: {msg}", self.chart.kind.label());
        }
        self.chart_outcome = outcome;
    }

    fn save_export(&self, path: &Path) -> Result<String> {
        let view = self.filtered_view().context("no dataset loaded")?;
        let artifact = DownloadArtifact::filtered_csv(&view)?;
        artifact.save(path)?;
        Ok(format!("Saved {} rows to {}", view.len(), path.display()))
    }

    fn save_report(&self, path: &Path) -> Result<String> {
        let report = self.report.as_ref().context("no report available")?;
        let is_json = path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        let body = if is_json {
            report.to_json().context("serializing report")?
        } else {
            report.to_html()
        };
        std::fs::write(path, body)
            .with_context(|| format!("writing report to {}", path.display()))?;
        log::info!("Saved profiling report to {}", path.display());
        Ok(format!("Saved report to {}", path.display()))
    }

    fn record_save(&mut self, outcome: Result<String>) {
        self.save_message = Some(match outcome {
            Ok(msg) => msg,
            Err(e) => {
                log::error!("Save failed: {e:#}");
                format!("Error: {e:#}")
            }
        });
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn csv_file(contents: &str) -> std::io::Result<tempfile::NamedTempFile> {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile()?;
        file.write_all(contents.as_bytes())?;
        Ok(file)
    }

    fn loaded(contents: &str) -> Result<(AppState, tempfile::NamedTempFile), Box<dyn std::error::Error>> {
        let file = csv_file(contents)?;
        let mut state = AppState::default();
        state.handle(UiEvent::OpenFile(file.path().to_path_buf()));
        Ok((state, file))
    }

    #[test]
    fn fresh_session_has_nothing_to_render() {
        let state = AppState::default();
        assert!(state.dataset().is_none());
        assert_eq!(state.status(), &LoadStatus::Idle);
        assert!(state.report.is_none());
        assert!(state.chart_outcome.is_none());
    }

    #[test]
    fn upload_initialises_filter_report_and_chart() -> TestResult {
        let (state, _file) = loaded("a,b\n1,x\n2,y\n3,x\n")?;
        let ds = state.dataset().ok_or("dataset missing")?;
        assert_eq!(ds.shape(), (3, 2));
        assert_eq!(state.filter.as_ref().map(|f| f.column.as_str()), Some("a"));
        assert_eq!(state.visible_indices, vec![0, 1, 2]);
        assert!(state.report.is_some());
        assert!(matches!(state.chart_outcome, Some(ChartOutcome::Render(_))));
        assert_eq!(state.status(), &LoadStatus::Idle);
        Ok(())
    }

    #[test]
    fn filter_then_export_matches_expected_csv() -> TestResult {
        let (mut state, _file) = loaded("a,b\n1,x\n2,y\n3,x\n")?;
        state.handle(UiEvent::SetFilterColumn("b".into()));
        state.handle(UiEvent::ToggleFilterValue(Value::String("y".into()), false));
        assert_eq!(state.visible_indices, vec![0, 2]);

        let dir = tempfile::tempdir()?;
        let out = dir.path().join("filtered_data.csv");
        state.handle(UiEvent::SaveExport(out.clone()));
        assert_eq!(std::fs::read_to_string(&out)?, "a,b\n1,x\n3,x\n");
        assert!(state.save_message.as_deref().is_some_and(|m| m.starts_with("Saved 2 rows")));
        Ok(())
    }

    #[test]
    fn select_none_then_all() -> TestResult {
        let (mut state, _file) = loaded("a,b\n1,x\n2,y\n")?;
        state.handle(UiEvent::SelectNoValues);
        assert!(state.visible_indices.is_empty());
        state.handle(UiEvent::SelectAllValues);
        assert_eq!(state.visible_indices, vec![0, 1]);
        Ok(())
    }

    #[test]
    fn report_ignores_filter_state() -> TestResult {
        let (mut state, _file) = loaded("a,b\n1,x\n2,y\n")?;
        state.handle(UiEvent::SelectNoValues);
        let rows = state.report.as_ref().map(|r| r.overview.n_rows);
        assert_eq!(rows, Some(2));
        Ok(())
    }

    #[test]
    fn chart_switch_warns_when_prerequisites_missing() -> TestResult {
        let (mut state, _file) = loaded("a,b\n1,2\n3,4\n")?;
        state.handle(UiEvent::SetChartKind(ChartKind::Boxplot));
        assert!(matches!(state.chart_outcome, Some(ChartOutcome::Warning(_))));
        state.handle(UiEvent::SetChartKind(ChartKind::Scatterplot));
        state.handle(UiEvent::PickChartColumn(ChartRole::ScatterY, "b".into()));
        assert!(matches!(state.chart_outcome, Some(ChartOutcome::Render(_))));
        Ok(())
    }

    #[test]
    fn malformed_upload_is_a_fault_without_dataset() -> TestResult {
        let (state, _file) = loaded("a,b\n1,2\n3\n")?;
        assert!(state.dataset().is_none());
        assert!(matches!(state.status(), LoadStatus::Fault(_)));
        assert!(state.report.is_none());
        Ok(())
    }

    #[test]
    fn dropped_bytes_load_as_upload() {
        let mut state = AppState::default();
        state.handle(UiEvent::SelectSource(DataSource::Url));
        state.handle(UiEvent::DropFile {
            name: "drop.csv".into(),
            bytes: Arc::from(&b"k,v\na,1\n"[..]),
        });
        assert_eq!(state.source, DataSource::Upload);
        assert_eq!(state.active_source().map(|s| s.origin.as_str()), Some("drop.csv"));
    }

    #[test]
    fn url_404_leaves_no_dataset() {
        let mut server = mockito::Server::new();
        let _mock = server.mock("GET", "/data.csv").with_status(404).create();

        let mut state = AppState::default();
        state.handle(UiEvent::SelectSource(DataSource::Url));
        state.handle(UiEvent::EditUrl(format!("{}/data.csv", server.url())));
        state.handle(UiEvent::SubmitUrl);

        assert!(state.dataset().is_none());
        assert!(state.report.is_none());
        assert!(state.chart_outcome.is_none());
        assert!(state.filtered_view().is_none());
        match state.status() {
            LoadStatus::Error(msg) => assert!(msg.starts_with("Failed to load data from URL:")),
            other => panic!("unexpected status {other:?}"),
        }
    }

    #[test]
    fn url_success_and_source_switch_keep_separate_slots() -> TestResult {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/data.csv")
            .with_status(200)
            .with_body("a,b\n1,x\n")
            .create();

        let (mut state, _file) = loaded("p\n1\n2\n")?;
        state.handle(UiEvent::EditUrl(format!("{}/data.csv", server.url())));
        state.handle(UiEvent::SubmitUrl);
        assert_eq!(state.status(), &LoadStatus::Success(URL_LOADED.to_string()));
        assert_eq!(state.dataset().map(Dataset::shape), Some((1, 2)));

        state.handle(UiEvent::SelectSource(DataSource::Upload));
        assert_eq!(state.dataset().map(Dataset::shape), Some((2, 1)));
        assert_eq!(state.filter.as_ref().map(|f| f.column.as_str()), Some("p"));
        Ok(())
    }

    #[test]
    fn report_saves_as_html_or_json() -> TestResult {
        let (mut state, _file) = loaded("a\n1\n")?;
        let dir = tempfile::tempdir()?;
        let html = dir.path().join("report.html");
        let json = dir.path().join("report.json");
        state.handle(UiEvent::SaveReport(html.clone()));
        state.handle(UiEvent::SaveReport(json.clone()));
        assert!(std::fs::read_to_string(&html)?.starts_with("<!DOCTYPE html>"));
        assert!(std::fs::read_to_string(&json)?.trim_start().starts_with('{'));
        Ok(())
    }
}
