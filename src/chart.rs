use std::collections::BTreeMap;

use crate::config::{scatter_point_radius, HISTOGRAM_MAX_BINS};
use crate::data::model::{Dataset, Value};
use crate::data::stats::{self, Bin, BoxSummary};

// ---------------------------------------------------------------------------
// Chart selection (user state) and resolved chart specifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartKind {
    #[default]
    Histogram,
    Boxplot,
    Scatterplot,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [ChartKind::Histogram, ChartKind::Boxplot, ChartKind::Scatterplot];

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Histogram => "Histogram",
            ChartKind::Boxplot => "Boxplot",
            ChartKind::Scatterplot => "Scatterplot",
        }
    }
}

/// Which column drives each role of each chart. `None` means "first candidate".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartSelection {
    pub kind: ChartKind,
    pub histogram_column: Option<String>,
    pub box_x: Option<String>,
    pub box_y: Option<String>,
    pub scatter_x: Option<String>,
    pub scatter_y: Option<String>,
}

/// A column slot of one of the charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartRole {
    HistogramColumn,
    BoxX,
    BoxY,
    ScatterX,
    ScatterY,
}

impl ChartSelection {
    pub fn pick(&self, role: ChartRole) -> Option<&str> {
        match role {
            ChartRole::HistogramColumn => self.histogram_column.as_deref(),
            ChartRole::BoxX => self.box_x.as_deref(),
            ChartRole::BoxY => self.box_y.as_deref(),
            ChartRole::ScatterX => self.scatter_x.as_deref(),
            ChartRole::ScatterY => self.scatter_y.as_deref(),
        }
    }

    pub fn set_pick(&mut self, role: ChartRole, column: String) {
        let slot = match role {
            ChartRole::HistogramColumn => &mut self.histogram_column,
            ChartRole::BoxX => &mut self.box_x,
            ChartRole::BoxY => &mut self.box_y,
            ChartRole::ScatterX => &mut self.scatter_x,
            ChartRole::ScatterY => &mut self.scatter_y,
        };
        *slot = Some(column);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxGroup {
    pub category: Value,
    pub summary: BoxSummary,
}

/// A render-ready chart description.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartSpec {
    Histogram {
        column: String,
        x_title: String,
        bins: Vec<Bin>,
    },
    Boxplot {
        x: String,
        y: String,
        groups: Vec<BoxGroup>,
    },
    Scatterplot {
        x: String,
        y: String,
        points: Vec<[f64; 2]>,
        radius: f32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartOutcome {
    Render(ChartSpec),
    Warning(&'static str),
}

pub const NO_NUMERIC_HISTOGRAM: &str = "No numeric columns available for histogram.";
pub const NO_BOXPLOT_COLUMNS: &str =
    "You need at least one categorical and one numeric column to draw a boxplot.";
pub const NO_NUMERIC_SCATTER: &str = "No numeric columns available for scatterplot.";

/// Keep a remembered pick if it is still a candidate, else the first candidate.
pub fn resolve<'a>(picked: Option<&str>, candidates: &'a [String]) -> Option<&'a str> {
    picked
        .and_then(|p| candidates.iter().find(|c| c.as_str() == p))
        .or_else(|| candidates.first())
        .map(String::as_str)
}

/// Build the chart for the current selection over the full dataset.
pub fn build_chart(dataset: &Dataset, selection: &ChartSelection) -> ChartOutcome {
    let numeric = dataset.numeric_columns();
    match selection.kind {
        ChartKind::Histogram => {
            let Some(col) = resolve(selection.histogram_column.as_deref(), &numeric) else {
                return ChartOutcome::Warning(NO_NUMERIC_HISTOGRAM);
            };
            ChartOutcome::Render(histogram_spec(dataset, col))
        }
        ChartKind::Boxplot => {
            let categorical = dataset.categorical_columns();
            let (Some(x), Some(y)) = (
                resolve(selection.box_x.as_deref(), &categorical),
                resolve(selection.box_y.as_deref(), &numeric),
            ) else {
                return ChartOutcome::Warning(NO_BOXPLOT_COLUMNS);
            };
            ChartOutcome::Render(boxplot_spec(dataset, x, y))
        }
        ChartKind::Scatterplot => {
            let (Some(x), Some(y)) = (
                resolve(selection.scatter_x.as_deref(), &numeric),
                resolve(selection.scatter_y.as_deref(), &numeric),
            ) else {
                return ChartOutcome::Warning(NO_NUMERIC_SCATTER);
            };
            ChartOutcome::Render(scatter_spec(dataset, x, y))
        }
    }
}

fn histogram_spec(dataset: &Dataset, column: &str) -> ChartSpec {
    let values = dataset
        .column_index(column)
        .map(|i| dataset.numeric_values(i))
        .unwrap_or_default();

    let finite = values.iter().copied().filter(|v| v.is_finite());
    let bins = match (finite.clone().reduce(f64::min), finite.reduce(f64::max)) {
        (Some(lo), Some(hi)) => {
            stats::histogram(&values, stats::nice_bins(lo, hi, HISTOGRAM_MAX_BINS))
        }
        _ => Vec::new(),
    };

    ChartSpec::Histogram {
        column: column.to_string(),
        x_title: format!("{column} (binned)"),
        bins,
    }
}

fn boxplot_spec(dataset: &Dataset, x: &str, y: &str) -> ChartSpec {
    let mut groups: BTreeMap<Value, Vec<f64>> = BTreeMap::new();
    if let (Some(xi), Some(yi)) = (dataset.column_index(x), dataset.column_index(y)) {
        for row in &dataset.rows {
            if row[xi].is_null() {
                continue;
            }
            if let Some(v) = row[yi].as_f64() {
                groups.entry(row[xi].clone()).or_default().push(v);
            }
        }
    }

    let groups = groups
        .into_iter()
        .filter_map(|(category, ys)| {
            stats::box_summary(&ys).map(|summary| BoxGroup { category, summary })
        })
        .collect();

    ChartSpec::Boxplot {
        x: x.to_string(),
        y: y.to_string(),
        groups,
    }
}

fn scatter_spec(dataset: &Dataset, x: &str, y: &str) -> ChartSpec {
    let points = match (dataset.column_index(x), dataset.column_index(y)) {
        (Some(xi), Some(yi)) => dataset
            .rows
            .iter()
            .filter_map(|row| Some([row[xi].as_f64()?, row[yi].as_f64()?]))
            .collect(),
        _ => Vec::new(),
    };

    ChartSpec::Scatterplot {
        x: x.to_string(),
        y: y.to_string(),
        points,
        radius: scatter_point_radius(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::parse_delimited;

    fn mixed() -> Dataset {
        parse_delimited("g,v,w\na,1,10\nb,2,\na,3,30\n,4,40\n".as_bytes(), b',').expect("valid csv")
    }

    #[test]
    fn histogram_warns_without_numeric_columns() {
        let ds = parse_delimited("s\nx\ny\n".as_bytes(), b',').expect("valid csv");
        let outcome = build_chart(&ds, &ChartSelection::default());
        assert_eq!(outcome, ChartOutcome::Warning(NO_NUMERIC_HISTOGRAM));
    }

    #[test]
    fn histogram_defaults_to_first_numeric_column() {
        let ds = mixed();
        let ChartOutcome::Render(ChartSpec::Histogram { column, x_title, bins }) =
            build_chart(&ds, &ChartSelection::default())
        else {
            panic!("expected histogram");
        };
        assert_eq!(column, "v");
        assert_eq!(x_title, "v (binned)");
        assert!(bins.len() <= HISTOGRAM_MAX_BINS);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 4);
    }

    #[test]
    fn histogram_bins_skip_infinite_values() {
        let ds = parse_delimited("v\n1\n2\n3\ninf\n-inf\n".as_bytes(), b',').expect("valid csv");
        let ChartOutcome::Render(ChartSpec::Histogram { bins, .. }) =
            build_chart(&ds, &ChartSelection::default())
        else {
            panic!("expected histogram");
        };
        assert!(!bins.is_empty());
        assert!(bins.iter().all(|b| b.start.is_finite() && b.end.is_finite()));
        assert!(bins[0].start <= 1.0 && bins[bins.len() - 1].end >= 3.0);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 3);
    }

    #[test]
    fn histogram_of_only_infinite_values_has_no_bins() {
        let ds = parse_delimited("v\ninf\n-inf\n".as_bytes(), b',').expect("valid csv");
        let outcome = build_chart(&ds, &ChartSelection::default());
        assert!(matches!(
            outcome,
            ChartOutcome::Render(ChartSpec::Histogram { ref bins, .. }) if bins.is_empty()
        ));
    }

    #[test]
    fn stale_pick_falls_back_to_first_candidate() {
        let cols = vec!["p".to_string(), "q".to_string()];
        assert_eq!(resolve(Some("q"), &cols), Some("q"));
        assert_eq!(resolve(Some("gone"), &cols), Some("p"));
        assert_eq!(resolve(None, &[]), None);
    }

    #[test]
    fn boxplot_requires_both_kinds() {
        let ds = parse_delimited("v\n1\n2\n".as_bytes(), b',').expect("valid csv");
        let sel = ChartSelection {
            kind: ChartKind::Boxplot,
            ..Default::default()
        };
        assert_eq!(build_chart(&ds, &sel), ChartOutcome::Warning(NO_BOXPLOT_COLUMNS));
    }

    #[test]
    fn boxplot_groups_by_category_and_skips_nulls() {
        let ds = mixed();
        let sel = ChartSelection {
            kind: ChartKind::Boxplot,
            box_y: Some("w".into()),
            ..Default::default()
        };
        let ChartOutcome::Render(ChartSpec::Boxplot { x, y, groups }) = build_chart(&ds, &sel)
        else {
            panic!("expected boxplot");
        };
        assert_eq!((x.as_str(), y.as_str()), ("g", "w"));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].category, Value::String("a".into()));
        assert_eq!(groups[0].summary.median, 20.0);
    }

    #[test]
    fn scatter_allows_same_column_and_skips_missing() {
        let ds = mixed();
        let sel = ChartSelection {
            kind: ChartKind::Scatterplot,
            scatter_x: Some("w".into()),
            scatter_y: Some("w".into()),
            ..Default::default()
        };
        let ChartOutcome::Render(ChartSpec::Scatterplot { points, .. }) = build_chart(&ds, &sel)
        else {
            panic!("expected scatterplot");
        };
        assert_eq!(points, vec![[10.0, 10.0], [30.0, 30.0], [40.0, 40.0]]);
    }

    #[test]
    fn scatter_warns_without_numeric_columns() {
        let ds = parse_delimited("s,t\nx,y\n".as_bytes(), b',').expect("valid csv");
        let sel = ChartSelection {
            kind: ChartKind::Scatterplot,
            ..Default::default()
        };
        assert_eq!(build_chart(&ds, &sel), ChartOutcome::Warning(NO_NUMERIC_SCATTER));
    }
}
