use eframe::egui::{self, Color32, RichText, Stroke, Ui};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Plot, PlotPoints, Points};

use crate::chart::{resolve, BoxGroup, ChartKind, ChartOutcome, ChartRole, ChartSpec};
use crate::color::{CategoryColors, PRIMARY};
use crate::config::CHART_HEIGHT;
use crate::data::stats::Bin;
use crate::state::{AppState, UiEvent};
use crate::ui::Events;

// ---------------------------------------------------------------------------
// Chart selector + chart rendering
// ---------------------------------------------------------------------------

/// Chart type selector, per-chart column pickers and the chart itself.
pub fn chart_section(ui: &mut Ui, state: &AppState, events: &mut Events) {
    let Some(dataset) = state.dataset() else {
        return;
    };

    ui.heading("Visualizations");

    let kind = state.chart.kind;
    egui::ComboBox::from_label("Choose a chart type")
        .selected_text(kind.label())
        .show_ui(ui, |ui: &mut Ui| {
            for k in ChartKind::ALL {
                if ui.selectable_label(k == kind, k.label()).clicked() && k != kind {
                    events.push(UiEvent::SetChartKind(k));
                }
            }
        });

    let numeric = dataset.numeric_columns();
    let categorical = dataset.categorical_columns();
    let pickers: Vec<(ChartRole, &str, &[String])> = match kind {
        ChartKind::Histogram => vec![(ChartRole::HistogramColumn, "Select column", numeric.as_slice())],
        ChartKind::Boxplot if !categorical.is_empty() && !numeric.is_empty() => vec![
            (ChartRole::BoxX, "X Axis (categorical)", categorical.as_slice()),
            (ChartRole::BoxY, "Y Axis (numeric)", numeric.as_slice()),
        ],
        ChartKind::Boxplot => Vec::new(),
        ChartKind::Scatterplot => vec![
            (ChartRole::ScatterX, "X-axis", numeric.as_slice()),
            (ChartRole::ScatterY, "Y-axis", numeric.as_slice()),
        ],
    };
    for (role, label, candidates) in pickers {
        column_picker(ui, state, events, role, label, candidates);
    }

    ui.add_space(6.0);
    match &state.chart_outcome {
        Some(ChartOutcome::Warning(msg)) => {
            ui.label(RichText::new(format!("⚠ {msg}")).color(Color32::from_rgb(200, 140, 0)));
        }
        Some(ChartOutcome::Render(spec)) => draw(ui, spec),
        None => {}
    }
}

fn column_picker(
    ui: &mut Ui,
    state: &AppState,
    events: &mut Events,
    role: ChartRole,
    label: &str,
    candidates: &[String],
) {
    let Some(current) = resolve(state.chart.pick(role), candidates) else {
        return;
    };
    egui::ComboBox::from_label(label)
        .selected_text(current)
        .show_ui(ui, |ui: &mut Ui| {
            for col in candidates {
                if ui.selectable_label(col == current, col.as_str()).clicked() && col != current {
                    events.push(UiEvent::PickChartColumn(role, col.clone()));
                }
            }
        });
}

pub fn draw(ui: &mut Ui, spec: &ChartSpec) {
    match spec {
        ChartSpec::Histogram { column, x_title, bins } => histogram(ui, column, x_title, bins),
        ChartSpec::Boxplot { x, y, groups } => boxplot(ui, x, y, groups),
        ChartSpec::Scatterplot { x, y, points, radius } => scatter(ui, x, y, points, *radius),
    }
}

/// Base plot: pan, zoom and box-zoom on; wheel scrolling left to the page.
fn interactive_plot(id: &str) -> Plot {
    Plot::new(id)
        .height(CHART_HEIGHT)
        .allow_drag(true)
        .allow_zoom(true)
        .allow_boxed_zoom(true)
        .allow_scroll(false)
}

fn histogram(ui: &mut Ui, column: &str, x_title: &str, bins: &[Bin]) {
    let bars: Vec<Bar> = bins
        .iter()
        .map(|b| {
            Bar::new((b.start + b.end) / 2.0, b.count as f64)
                .width(b.end - b.start)
                .name(format!("{column}: [{}, {})", b.start, b.end))
        })
        .collect();

    let chart = BarChart::new(bars)
        .color(PRIMARY)
        .name(x_title)
        .element_formatter(Box::new(|bar: &Bar, _chart: &BarChart| {
            format!("{}\nFrequency: {}", bar.name, bar.value)
        }));

    interactive_plot("histogram")
        .x_axis_label(x_title)
        .y_axis_label("Frequency")
        .show(ui, |plot_ui| plot_ui.bar_chart(chart));
}

fn boxplot(ui: &mut Ui, x: &str, y: &str, groups: &[BoxGroup]) {
    let colors = CategoryColors::new(groups.iter().map(|g| &g.category));
    let names: Vec<String> = groups.iter().map(|g| g.category.to_string()).collect();

    let boxes: Vec<BoxPlot> = groups
        .iter()
        .enumerate()
        .map(|(i, g)| {
            let s = &g.summary;
            let color = colors.color_for(&g.category);
            let elem = BoxElem::new(
                i as f64,
                BoxSpread::new(s.lower_whisker, s.q1, s.median, s.q3, s.upper_whisker),
            )
            .name(&names[i])
            .box_width(0.5)
            .whisker_width(0.3)
            .fill(color.linear_multiply(0.25))
            .stroke(Stroke::new(1.5, color));

            let (x, y, n) = (x.to_string(), y.to_string(), s.count);
            BoxPlot::new(vec![elem])
                .name(&names[i])
                .element_formatter(Box::new(move |e: &BoxElem, _plot: &BoxPlot| {
                    let sp = &e.spread;
                    format!(
                        "{x}: {}\n{y}: median {:.3}\nQ1 {:.3}, Q3 {:.3}\nwhiskers {:.3} – {:.3}\nn = {n}",
                        e.name, sp.median, sp.quartile1, sp.quartile3, sp.lower_whisker, sp.upper_whisker
                    )
                }))
        })
        .collect();

    let outliers: Vec<Points> = groups
        .iter()
        .enumerate()
        .filter(|(_, g)| !g.summary.outliers.is_empty())
        .map(|(i, g)| {
            let pts: PlotPoints = g.summary.outliers.iter().map(|&v| [i as f64, v]).collect();
            Points::new(pts)
                .radius(2.5)
                .color(colors.color_for(&g.category))
                .name(&names[i])
        })
        .collect();

    let (x_owned, y_owned) = (x.to_string(), y.to_string());
    interactive_plot("boxplot")
        .x_axis_label(x)
        .y_axis_label(y)
        .x_axis_formatter(move |mark, _range| {
            let i = mark.value.round();
            if (mark.value - i).abs() < 1e-6 && i >= 0.0 {
                names.get(i as usize).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        })
        .label_formatter(move |name, value| {
            if name.is_empty() {
                format!("{y_owned}: {:.3}", value.y)
            } else {
                format!("{x_owned}: {name}\n{y_owned}: {:.3}", value.y)
            }
        })
        .show(ui, |plot_ui| {
            for b in boxes {
                plot_ui.box_plot(b);
            }
            for p in outliers {
                plot_ui.points(p);
            }
        });
}

fn scatter(ui: &mut Ui, x: &str, y: &str, points: &[[f64; 2]], radius: f32) {
    let series = Points::new(PlotPoints::from(points.to_vec()))
        .radius(radius)
        .color(PRIMARY)
        .name(format!("{y} vs {x}"));

    let (x_owned, y_owned) = (x.to_string(), y.to_string());
    interactive_plot("scatterplot")
        .x_axis_label(x)
        .y_axis_label(y)
        .label_formatter(move |_name, value| {
            format!("{x_owned}: {:.3}\n{y_owned}: {:.3}", value.x, value.y)
        })
        .show(ui, |plot_ui| plot_ui.points(series));
}
