use std::path::PathBuf;

use eframe::egui::{self, Color32, Key, RichText, ScrollArea, Ui};

use crate::config::{EXPORT_FILE_NAME, EXPORT_MIME, PREVIEW_ROWS};
use crate::state::{AppState, DataSource, LoadStatus, UiEvent};
use crate::ui::{plot, report, table, Events};

const TABLE_HEIGHT: f32 = 260.0;

// ---------------------------------------------------------------------------
// Left side panel – data source and filter widgets
// ---------------------------------------------------------------------------

/// Render the left panel: input mode, source widgets and the filter.
pub fn side_panel(ui: &mut Ui, state: &AppState, events: &mut Events) {
    ui.heading("Data Source");
    ui.label("Choose how to load your data:");
    for source in [DataSource::Upload, DataSource::Url] {
        if ui.radio(state.source == source, source.label()).clicked() && state.source != source {
            events.push(UiEvent::SelectSource(source));
        }
    }
    ui.add_space(4.0);

    match state.source {
        DataSource::Upload => {
            ui.label("Upload your CSV file");
            if ui.button("Browse…").clicked() {
                if let Some(path) = open_file_dialog() {
                    events.push(UiEvent::OpenFile(path));
                }
            }
            match &state.upload {
                Some(src) => ui.label(RichText::new(&src.origin).monospace()),
                None => ui.label(RichText::new("…or drop a file onto the window").weak()),
            };
        }
        DataSource::Url => {
            ui.label("Paste the public CSV URL here");
            let mut url = state.url_input.clone();
            let response = ui.text_edit_singleline(&mut url);
            if response.changed() {
                events.push(UiEvent::EditUrl(url));
            }
            let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));
            if ui.button("Load").clicked() || submitted {
                events.push(UiEvent::SubmitUrl);
            }
        }
    }

    ui.separator();
    filter_panel(ui, state, events);
}

/// "Filter by column" selector plus one checkbox per distinct value.
fn filter_panel(ui: &mut Ui, state: &AppState, events: &mut Events) {
    let (Some(dataset), Some(filter)) = (state.dataset(), state.filter.as_ref()) else {
        return;
    };

    ui.heading("Filter Data");
    egui::ComboBox::from_label("Filter by column")
        .selected_text(filter.column.as_str())
        .show_ui(ui, |ui: &mut Ui| {
            for col in &dataset.columns {
                if ui.selectable_label(col.name == filter.column, col.name.as_str()).clicked()
                    && col.name != filter.column
                {
                    events.push(UiEvent::SetFilterColumn(col.name.clone()));
                }
            }
        });

    let all_values = dataset.distinct_values(&filter.column);
    let n_total = all_values.map_or(0, |v| v.len());
    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!("Select values ({}/{n_total})", filter.selected.len()));
        if ui.small_button("All").clicked() {
            events.push(UiEvent::SelectAllValues);
        }
        if ui.small_button("None").clicked() {
            events.push(UiEvent::SelectNoValues);
        }
    });

    ScrollArea::vertical()
        .id_salt("filter_values")
        .auto_shrink([false, true])
        .show(ui, |ui: &mut Ui| {
            for val in all_values.into_iter().flatten() {
                let mut checked = filter.selected.contains(val);
                if ui.checkbox(&mut checked, val.to_string()).changed() {
                    events.push(UiEvent::ToggleFilterValue(val.clone(), checked));
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the title bar with the dataset size.
pub fn top_bar(ui: &mut Ui, state: &AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.heading("Exploratory Data Analysis (EDA) App");
        ui.separator();
        if let Some(src) = state.active_source() {
            ui.label(format!(
                "{}: {} rows loaded, {} visible",
                src.origin,
                src.dataset.len(),
                state.visible_indices.len()
            ));
        }
    });
}

// ---------------------------------------------------------------------------
// Central panel – the analysis sections, top to bottom
// ---------------------------------------------------------------------------

pub fn central_panel(ui: &mut Ui, state: &AppState, events: &mut Events) {
    status_banner(ui, state.status());

    let Some(dataset) = state.dataset() else {
        if !matches!(state.status(), LoadStatus::Fault(_)) {
            ui.label(
                RichText::new("Please upload a file or enter a public URL to begin.")
                    .color(Color32::from_rgb(40, 110, 190)),
            );
        }
        return;
    };

    ui.heading("Preview of Dataset");
    let head: Vec<usize> = (0..dataset.len().min(PREVIEW_ROWS)).collect();
    table::data_table(ui, "preview", dataset, &head, TABLE_HEIGHT);
    if dataset.is_empty() {
        ui.label(RichText::new("The dataset has a header but no rows.").weak());
    }
    ui.add_space(8.0);

    ui.heading("Dataset Summary");
    table::summary(ui, dataset);
    ui.add_space(8.0);

    ui.heading("Filtered Data");
    table::data_table(ui, "filtered", dataset, &state.visible_indices, TABLE_HEIGHT);
    if state.filtered_view().is_some_and(|v| v.is_empty()) {
        ui.label(RichText::new("No rows match the current filter.").weak());
    }
    ui.add_space(8.0);

    plot::chart_section(ui, state, events);
    ui.add_space(8.0);

    if let Some(r) = &state.report {
        report::report_section(ui, r, events);
        ui.add_space(8.0);
    }

    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Download Filtered Data").clicked() {
            if let Some(path) = save_export_dialog() {
                events.push(UiEvent::SaveExport(path));
            }
        }
        if let Some(msg) = &state.save_message {
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                Color32::DARK_GREEN
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

fn status_banner(ui: &mut Ui, status: &LoadStatus) {
    match status {
        LoadStatus::Idle => {}
        LoadStatus::Success(msg) => {
            ui.label(RichText::new(msg).color(Color32::DARK_GREEN));
        }
        LoadStatus::Error(msg) => {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
        LoadStatus::Fault(msg) => {
            egui::Frame::group(ui.style())
                .fill(Color32::from_rgb(255, 235, 235))
                .show(ui, |ui: &mut Ui| {
                    ui.label(RichText::new("Unhandled error while reading the upload").strong().color(Color32::RED));
                    ui.label(RichText::new(msg).monospace());
                });
        }
    }
    ui.add_space(4.0);
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Open tabular data")
        .add_filter("Supported files", &["csv", "tsv", "txt", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("TSV", &["tsv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file()
}

fn save_export_dialog() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Download Filtered Data")
        .set_file_name(EXPORT_FILE_NAME)
        .add_filter(format!("CSV ({EXPORT_MIME})"), &["csv"])
        .save_file()
}
