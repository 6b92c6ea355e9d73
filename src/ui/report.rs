use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_plot::{Bar, BarChart, Plot};

use crate::color::PRIMARY;
use crate::config::REPORT_HEIGHT;
use crate::report::profile::{Correlations, NumericSummary, VariableProfile};
use crate::report::ProfileReport;
use crate::state::UiEvent;
use crate::ui::Events;

// ---------------------------------------------------------------------------
// Embedded profiling report
// ---------------------------------------------------------------------------

/// Render the report inside a fixed-height scroll area.
pub fn report_section(ui: &mut Ui, report: &ProfileReport, events: &mut Events) {
    ui.heading("Data Profiling Report");
    if ui.button("Save report…").clicked() {
        if let Some(path) = rfd::FileDialog::new()
            .set_title("Save profiling report")
            .set_file_name("profile_report.html")
            .add_filter("HTML", &["html"])
            .add_filter("JSON", &["json"])
            .save_file()
        {
            events.push(UiEvent::SaveReport(path));
        }
    }

    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ScrollArea::vertical()
            .id_salt("profile_report")
            .max_height(REPORT_HEIGHT)
            .auto_shrink([false, true])
            .show(ui, |ui: &mut Ui| {
                ui.label(RichText::new(report.title.as_str()).size(20.0).strong());
                ui.separator();
                overview(ui, report);
                alerts(ui, report);

                egui::CollapsingHeader::new(RichText::new("Variables").strong())
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        for v in &report.variables {
                            variable(ui, v);
                        }
                    });

                egui::CollapsingHeader::new(RichText::new("Correlations").strong())
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| correlations(ui, &report.correlations));

                egui::CollapsingHeader::new(RichText::new("Missing values").strong())
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        egui::Grid::new("report_missing").striped(true).show(ui, |ui: &mut Ui| {
                            for m in &report.missing {
                                ui.label(m.column.as_str());
                                ui.label(m.missing.to_string());
                                ui.end_row();
                            }
                        });
                    });

                egui::CollapsingHeader::new(RichText::new("Sample").strong())
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        egui::Grid::new("report_sample").striped(true).show(ui, |ui: &mut Ui| {
                            for c in &report.sample.columns {
                                ui.strong(c.as_str());
                            }
                            ui.end_row();
                            for row in &report.sample.rows {
                                for v in row {
                                    ui.label(v.to_string());
                                }
                                ui.end_row();
                            }
                        });
                    });
            });
    });
}

fn overview(ui: &mut Ui, report: &ProfileReport) {
    let o = &report.overview;
    ui.strong("Overview");
    egui::Grid::new("report_overview").num_columns(2).show(ui, |ui: &mut Ui| {
        let rows = [
            ("Number of variables", o.n_cols.to_string()),
            ("Number of observations", o.n_rows.to_string()),
            ("Missing cells", format!("{} ({:.1}%)", o.missing_cells, o.missing_cells_pct)),
            ("Duplicate rows", format!("{} ({:.1}%)", o.duplicate_rows, o.duplicate_rows_pct)),
        ];
        for (label, value) in rows {
            ui.label(label);
            ui.label(value);
            ui.end_row();
        }
        for (kind, n) in &o.kinds {
            ui.label(RichText::new(kind).weak());
            ui.label(n.to_string());
            ui.end_row();
        }
    });
    ui.add_space(6.0);
}

fn alerts(ui: &mut Ui, report: &ProfileReport) {
    ui.strong(format!("Alerts ({})", report.alerts.len()));
    for a in &report.alerts {
        ui.label(RichText::new(a.to_string()).color(Color32::from_rgb(200, 110, 0)));
    }
    ui.add_space(6.0);
}

fn variable(ui: &mut Ui, v: &VariableProfile) {
    egui::CollapsingHeader::new(format!("{}  ({})", v.name, v.kind))
        .id_salt(("report_var", &v.name))
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal_top(|ui: &mut Ui| {
                egui::Grid::new(("var_grid", &v.name)).num_columns(2).show(ui, |ui: &mut Ui| {
                    stat_row(ui, "Distinct", format!("{} ({:.1}%)", v.distinct, v.distinct_pct));
                    stat_row(ui, "Missing", format!("{} ({:.1}%)", v.missing, v.missing_pct));
                    if let Some(n) = &v.numeric {
                        numeric_rows(ui, n);
                    }
                });

                if let Some(n) = &v.numeric {
                    mini_histogram(ui, &v.name, n);
                } else if !v.top_values.is_empty() {
                    egui::Grid::new(("var_top", &v.name)).num_columns(2).show(ui, |ui: &mut Ui| {
                        for (value, count) in &v.top_values {
                            ui.label(value.to_string());
                            ui.label(count.to_string());
                            ui.end_row();
                        }
                    });
                }
            });
        });
}

fn stat_row(ui: &mut Ui, label: &str, value: String) {
    ui.label(RichText::new(label).weak());
    ui.label(value);
    ui.end_row();
}

fn numeric_rows(ui: &mut Ui, n: &NumericSummary) {
    stat_row(ui, "Mean", format!("{:.4}", n.mean));
    stat_row(ui, "Std", n.std.map(|s| format!("{s:.4}")).unwrap_or_else(|| "–".into()));
    stat_row(ui, "Min", format!("{:.4}", n.min));
    stat_row(ui, "25%", format!("{:.4}", n.q1));
    stat_row(ui, "50%", format!("{:.4}", n.median));
    stat_row(ui, "75%", format!("{:.4}", n.q3));
    stat_row(ui, "Max", format!("{:.4}", n.max));
    stat_row(ui, "Zeros", n.zeros.to_string());
}

fn mini_histogram(ui: &mut Ui, name: &str, n: &NumericSummary) {
    let bars: Vec<Bar> = n
        .histogram
        .iter()
        .map(|b| {
            Bar::new((b.start + b.end) / 2.0, b.count as f64)
                .width(b.end - b.start)
                .name(format!("[{:.3}, {:.3})", b.start, b.end))
        })
        .collect();

    Plot::new(("report_hist", name))
        .width(260.0)
        .height(120.0)
        .show_axes([true, false])
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| plot_ui.bar_chart(BarChart::new(bars).color(PRIMARY)));
}

/// Matrix grid, cells tinted red (negative) to blue (positive).
fn correlations(ui: &mut Ui, corr: &Correlations) {
    if corr.columns.len() < 2 {
        ui.label(RichText::new("Fewer than two numeric variables.").weak());
        return;
    }
    egui::Grid::new("report_corr").show(ui, |ui: &mut Ui| {
        ui.label("");
        for c in &corr.columns {
            ui.strong(c.as_str());
        }
        ui.end_row();
        for (c, row) in corr.columns.iter().zip(&corr.matrix) {
            ui.strong(c.as_str());
            for r in row {
                match r {
                    Some(r) => {
                        let t = (r.abs() as f32).clamp(0.0, 1.0);
                        let base = if *r >= 0.0 {
                            Color32::from_rgb(60, 110, 200)
                        } else {
                            Color32::from_rgb(200, 70, 60)
                        };
                        ui.label(
                            RichText::new(format!("{r:.2}"))
                                .monospace()
                                .background_color(base.gamma_multiply(t * 0.6)),
                        );
                    }
                    None => {
                        ui.label(RichText::new("–").weak());
                    }
                }
            }
            ui.end_row();
        }
    });
}
