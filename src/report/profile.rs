use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::data::model::{ColumnKind, Dataset, Value};
use crate::data::stats::{self, Bin};

const HIGH_MISSING_FRACTION: f64 = 0.2;
const HIGH_CORRELATION: f64 = 0.9;
const ZEROS_FRACTION: f64 = 0.1;
const TOP_VALUES: usize = 10;
const VARIABLE_HISTOGRAM_BINS: usize = 10;
const SAMPLE_ROWS: usize = 10;

// ---------------------------------------------------------------------------
// Report structure
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ProfileReport {
    pub title: String,
    pub overview: Overview,
    pub variables: Vec<VariableProfile>,
    pub correlations: Correlations,
    pub missing: Vec<MissingCount>,
    pub alerts: Vec<Alert>,
    pub sample: Sample,
}

#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub n_rows: usize,
    pub n_cols: usize,
    pub missing_cells: usize,
    pub missing_cells_pct: f64,
    pub duplicate_rows: usize,
    pub duplicate_rows_pct: f64,
    /// Column count per kind label (`int64`, `float64`, `bool`, `object`).
    pub kinds: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VariableProfile {
    pub name: String,
    pub kind: ColumnKind,
    pub count: usize,
    pub missing: usize,
    pub missing_pct: f64,
    pub distinct: usize,
    pub distinct_pct: f64,
    pub numeric: Option<NumericSummary>,
    /// Most frequent values with their counts (categorical columns only).
    pub top_values: Vec<(Value, usize)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NumericSummary {
    pub mean: f64,
    pub std: Option<f64>,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub zeros: usize,
    pub histogram: Vec<Bin>,
}

/// Pearson matrix over the numeric columns; `None` cells are undefined.
#[derive(Debug, Clone, Serialize)]
pub struct Correlations {
    pub columns: Vec<String>,
    pub matrix: Vec<Vec<Option<f64>>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MissingCount {
    pub column: String,
    pub missing: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Alert {
    HighMissing { column: String, pct: f64 },
    Constant { column: String },
    Unique { column: String },
    HighCorrelation { a: String, b: String, r: f64 },
    Zeros { column: String, pct: f64 },
}

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Alert::HighMissing { column, pct } => write!(f, "{column} has {pct:.1}% missing values"),
            Alert::Constant { column } => write!(f, "{column} has a constant value"),
            Alert::Unique { column } => write!(f, "{column} has unique values"),
            Alert::HighCorrelation { a, b, r } => {
                write!(f, "{a} is highly correlated with {b} (r = {r:.3})")
            }
            Alert::Zeros { column, pct } => write!(f, "{column} has {pct:.1}% zeros"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Sample {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

fn pct(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        100.0 * part as f64 / whole as f64
    }
}

impl ProfileReport {
    /// Profile the whole dataset. Cost grows with rows × columns, plus
    /// columns² for the correlation matrix.
    pub fn build(dataset: &Dataset, title: &str) -> Self {
        let variables: Vec<VariableProfile> = (0..dataset.n_cols())
            .map(|i| profile_variable(dataset, i))
            .collect();
        let correlations = correlations(dataset);
        let overview = overview(dataset, &variables);
        let alerts = alerts(dataset.len(), &variables, &correlations);

        let missing = variables
            .iter()
            .map(|v| MissingCount {
                column: v.name.clone(),
                missing: v.missing,
            })
            .collect();

        let sample = Sample {
            columns: dataset.column_names(),
            rows: dataset.rows.iter().take(SAMPLE_ROWS).cloned().collect(),
        };

        log::debug!(
            "profiled {} variables, {} alerts",
            variables.len(),
            alerts.len()
        );

        ProfileReport {
            title: title.to_string(),
            overview,
            variables,
            correlations,
            missing,
            alerts,
            sample,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn overview(dataset: &Dataset, variables: &[VariableProfile]) -> Overview {
    let missing_cells: usize = variables.iter().map(|v| v.missing).sum();

    let mut seen: HashSet<&[Value]> = HashSet::with_capacity(dataset.len());
    let duplicate_rows = dataset
        .rows
        .iter()
        .map(Vec::as_slice)
        .filter(|row| !seen.insert(*row))
        .count();

    let mut kinds = BTreeMap::new();
    for c in &dataset.columns {
        *kinds.entry(c.kind.label().to_string()).or_insert(0) += 1;
    }

    Overview {
        n_rows: dataset.len(),
        n_cols: dataset.n_cols(),
        missing_cells,
        missing_cells_pct: pct(missing_cells, dataset.len() * dataset.n_cols()),
        duplicate_rows,
        duplicate_rows_pct: pct(duplicate_rows, dataset.len()),
        kinds,
    }
}

fn profile_variable(dataset: &Dataset, idx: usize) -> VariableProfile {
    let info = &dataset.columns[idx];
    let n = dataset.len();
    let missing = dataset.column_values(idx).filter(|v| v.is_null()).count();
    let count = n - missing;
    let distinct = dataset.unique_values[idx].len();

    let numeric = if info.kind.is_numeric() {
        numeric_summary(&dataset.numeric_values(idx))
    } else {
        None
    };

    let top_values = if info.kind.is_categorical() {
        let mut freq: HashMap<&Value, usize> = HashMap::new();
        for v in dataset.column_values(idx).filter(|v| !v.is_null()) {
            *freq.entry(v).or_insert(0) += 1;
        }
        let mut pairs: Vec<(Value, usize)> =
            freq.into_iter().map(|(v, c)| (v.clone(), c)).collect();
        pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        pairs.truncate(TOP_VALUES);
        pairs
    } else {
        Vec::new()
    };

    VariableProfile {
        name: info.name.clone(),
        kind: info.kind,
        count,
        missing,
        missing_pct: pct(missing, n),
        distinct,
        distinct_pct: pct(distinct, count),
        numeric,
        top_values,
    }
}

fn numeric_summary(values: &[f64]) -> Option<NumericSummary> {
    let sorted = stats::sorted(values);
    let (&min, &max) = (sorted.first()?, sorted.last()?);
    Some(NumericSummary {
        mean: stats::mean(&sorted)?,
        std: stats::std_dev(&sorted),
        min,
        q1: stats::percentile(&sorted, 0.25),
        median: stats::percentile(&sorted, 0.5),
        q3: stats::percentile(&sorted, 0.75),
        max,
        zeros: sorted.iter().filter(|&&v| v == 0.0).count(),
        histogram: stats::equal_width_histogram(&sorted, VARIABLE_HISTOGRAM_BINS),
    })
}

/// Pairwise-complete Pearson correlations between numeric columns.
fn correlations(dataset: &Dataset) -> Correlations {
    let idx: Vec<usize> = dataset
        .columns
        .iter()
        .enumerate()
        .filter(|(_, c)| c.kind.is_numeric())
        .map(|(i, _)| i)
        .collect();

    let matrix = idx
        .iter()
        .map(|&a| {
            idx.iter()
                .map(|&b| {
                    let pairs: Vec<(f64, f64)> = dataset
                        .rows
                        .iter()
                        .filter_map(|r| Some((r[a].as_f64()?, r[b].as_f64()?)))
                        .collect();
                    stats::pearson(&pairs)
                })
                .collect()
        })
        .collect();

    Correlations {
        columns: idx.iter().map(|&i| dataset.columns[i].name.clone()).collect(),
        matrix,
    }
}

fn alerts(n_rows: usize, variables: &[VariableProfile], corr: &Correlations) -> Vec<Alert> {
    let mut out = Vec::new();

    for v in variables {
        if v.missing_pct > HIGH_MISSING_FRACTION * 100.0 {
            out.push(Alert::HighMissing {
                column: v.name.clone(),
                pct: v.missing_pct,
            });
        }
        if v.distinct == 1 {
            out.push(Alert::Constant {
                column: v.name.clone(),
            });
        } else if n_rows >= 2 && v.count == n_rows && v.distinct == v.count {
            out.push(Alert::Unique {
                column: v.name.clone(),
            });
        }
        if let Some(num) = &v.numeric {
            let z = pct(num.zeros, v.count);
            if z > ZEROS_FRACTION * 100.0 {
                out.push(Alert::Zeros {
                    column: v.name.clone(),
                    pct: z,
                });
            }
        }
    }

    for (i, row) in corr.matrix.iter().enumerate() {
        for (j, r) in row.iter().enumerate().skip(i + 1) {
            if let Some(r) = r {
                if r.abs() > HIGH_CORRELATION {
                    out.push(Alert::HighCorrelation {
                        a: corr.columns[i].clone(),
                        b: corr.columns[j].clone(),
                        r: *r,
                    });
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::parse_delimited;

    fn report(csv: &str) -> ProfileReport {
        let ds = parse_delimited(csv.as_bytes(), b',').expect("valid csv");
        ProfileReport::build(&ds, "Data Profile Report")
    }

    #[test]
    fn overview_counts_missing_and_duplicates() {
        let r = report("a,b\n1,x\n1,x\n,y\n2,\n");
        assert_eq!(r.overview.n_rows, 4);
        assert_eq!(r.overview.n_cols, 2);
        assert_eq!(r.overview.missing_cells, 2);
        assert_eq!(r.overview.duplicate_rows, 1);
        assert_eq!(r.overview.kinds.get("int64"), Some(&1));
        assert_eq!(r.overview.kinds.get("object"), Some(&1));
    }

    #[test]
    fn numeric_variables_get_summary() {
        let r = report("v\n1\n2\n3\n4\n0\n");
        let num = r.variables[0].numeric.as_ref().expect("numeric summary");
        assert_eq!(num.min, 0.0);
        assert_eq!(num.max, 4.0);
        assert_eq!(num.median, 2.0);
        assert_eq!(num.zeros, 1);
        assert_eq!(num.histogram.iter().map(|b| b.count).sum::<usize>(), 5);
    }

    #[test]
    fn categorical_variables_get_top_values() {
        let r = report("c\nb\na\nb\nc\n");
        let top = &r.variables[0].top_values;
        assert_eq!(top[0], (Value::String("b".into()), 2));
        assert_eq!(top.len(), 3);
        assert!(r.variables[0].numeric.is_none());
    }

    #[test]
    fn alerts_cover_correlation_constant_and_missing() {
        let r = report("x,y,k,m\n1,2,z,\n2,4,z,\n3,6,z,1\n4,8,z,\n");
        assert!(r.alerts.contains(&Alert::Constant { column: "k".into() }));
        assert!(r.alerts.iter().any(|a| matches!(a, Alert::HighMissing { column, .. } if column == "m")));
        assert!(r
            .alerts
            .iter()
            .any(|a| matches!(a, Alert::HighCorrelation { a, b, .. } if a == "x" && b == "y")));
        assert!(r.alerts.iter().any(|a| matches!(a, Alert::Unique { column } if column == "x")));
    }

    #[test]
    fn correlation_matrix_is_square_over_numeric_columns() {
        let r = report("x,s,y\n1,a,3\n2,b,1\n3,c,2\n");
        assert_eq!(r.correlations.columns, vec!["x", "y"]);
        assert_eq!(r.correlations.matrix.len(), 2);
        assert!(r.correlations.matrix.iter().all(|row| row.len() == 2));
        assert_eq!(r.correlations.matrix[0][1], r.correlations.matrix[1][0]);
    }

    #[test]
    fn empty_dataset_profiles_without_panicking() {
        let r = report("a,b\n");
        assert_eq!(r.overview.n_rows, 0);
        assert_eq!(r.overview.missing_cells_pct, 0.0);
        assert!(r.variables.iter().all(|v| v.numeric.is_none()));
    }

    #[test]
    fn report_serializes_to_json() {
        let r = report("a,b\n1,x\n");
        let json = r.to_json().expect("serializable");
        assert!(json.contains("\"title\": \"Data Profile Report\""));
    }
}
