use eframe::egui::{self, Align, Layout, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::{Dataset, Value};

const ROW_HEIGHT: f32 = 18.0;

/// Render `indices` rows of `dataset` as a striped, scrollable table with a
/// leading index column. Only visible rows are laid out.
pub fn data_table(ui: &mut Ui, id: &str, dataset: &Dataset, indices: &[usize], max_height: f32) {
    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(Layout::left_to_right(Align::Center))
            .column(Column::auto().at_least(40.0))
            .columns(Column::auto().at_least(70.0).clip(true), dataset.n_cols())
            .min_scrolled_height(0.0)
            .max_scroll_height(max_height)
            .header(20.0, |mut header| {
                header.col(|ui: &mut Ui| {
                    ui.label(RichText::new("#").weak());
                });
                for col in &dataset.columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(col.name.as_str()).on_hover_text(col.kind.label());
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, indices.len(), |mut row| {
                    let idx = indices[row.index()];
                    row.col(|ui: &mut Ui| {
                        ui.label(RichText::new(idx.to_string()).weak());
                    });
                    for value in &dataset.rows[idx] {
                        row.col(|ui: &mut Ui| {
                            cell(ui, value);
                        });
                    }
                });
            });
    });
}

fn cell(ui: &mut Ui, value: &Value) {
    match value {
        Value::Null => {
            ui.label(RichText::new("<NA>").weak().italics());
        }
        Value::Integer(_) | Value::Float(_) => {
            ui.label(RichText::new(value.to_string()).monospace());
        }
        other => {
            ui.label(other.to_string());
        }
    }
}

/// `Shape: (rows, cols)` plus the per-column missing-value counts.
pub fn summary(ui: &mut Ui, dataset: &Dataset) {
    let (rows, cols) = dataset.shape();
    ui.label(format!("Shape: ({rows}, {cols})"));
    ui.add_space(4.0);
    ui.label("Missing Values:");

    egui::Grid::new("missing_values")
        .striped(true)
        .num_columns(2)
        .show(ui, |ui: &mut Ui| {
            for (name, missing) in dataset.missing_counts() {
                ui.label(name);
                ui.label(RichText::new(missing.to_string()).monospace());
                ui.end_row();
            }
        });
}
