use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Value – a single cell of the table
// ---------------------------------------------------------------------------

/// Field texts that count as missing, matching the pandas `read_csv` defaults.
pub const NA_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn is_na_marker(raw: &str) -> bool {
    NA_MARKERS.contains(&raw)
}

/// A dynamically-typed cell value mirroring common Pandas dtypes.
/// Using `BTreeMap` / `BTreeSet` downstream so `Value` must be `Ord`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can put Value in BTreeSet --

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        fn discriminant(v: &Value) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::String(s) => s.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Null => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            // Debug keeps the trailing `.0` on whole floats.
            Value::Float(v) => write!(f, "{v:?}"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Null => write!(f, "<NA>"),
        }
    }
}

impl Value {
    /// Numeric view of the value, used for charts and statistics.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Float cell with pandas semantics: NaN is missing, `-0.0` is `0.0`.
    pub fn from_f64(v: f64) -> Value {
        if v.is_nan() {
            Value::Null
        } else if v == 0.0 {
            Value::Float(0.0)
        } else {
            Value::Float(v)
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Text written to a CSV field: empty for nulls, `Display` otherwise.
    pub fn to_field(&self) -> String {
        match self {
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    /// Parse a raw field as a value of the given column kind.
    /// Callers must have inferred `kind` from the same column.
    pub fn parse_as(raw: &str, kind: ColumnKind) -> Value {
        if is_na_marker(raw) {
            return Value::Null;
        }
        match kind {
            ColumnKind::Integer => raw.parse().map(Value::Integer).unwrap_or(Value::Null),
            ColumnKind::Float => raw.parse().map(Value::from_f64).unwrap_or(Value::Null),
            ColumnKind::Bool => parse_bool(raw).map(Value::Bool).unwrap_or(Value::Null),
            ColumnKind::Text => Value::String(raw.to_string()),
        }
    }

    /// Convert an already-typed value into the representation of `kind`.
    pub fn coerce(self, kind: ColumnKind) -> Value {
        match (self, kind) {
            (Value::Null, _) => Value::Null,
            (Value::Integer(i), ColumnKind::Float) => Value::Float(i as f64),
            (Value::Float(f), ColumnKind::Float) => Value::from_f64(f),
            (v @ Value::Integer(_), ColumnKind::Integer)
            | (v @ Value::Bool(_), ColumnKind::Bool)
            | (v @ Value::String(_), ColumnKind::Text) => v,
            (other, _) => Value::String(other.to_string()),
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "True" | "TRUE" | "true" => Some(true),
        "False" | "FALSE" | "false" => Some(false),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// ColumnKind – inferred column dtype
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ColumnKind {
    Integer,
    Float,
    Bool,
    Text,
}

impl ColumnKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Float)
    }

    pub fn is_categorical(self) -> bool {
        !self.is_numeric()
    }

    pub fn label(self) -> &'static str {
        match self {
            ColumnKind::Integer => "int64",
            ColumnKind::Float => "float64",
            ColumnKind::Bool => "bool",
            ColumnKind::Text => "object",
        }
    }

    /// Infer a kind from raw field texts. Missing markers are ignored; a column
    /// with no present fields is `Text`.
    pub fn infer_raw<'a>(fields: impl IntoIterator<Item = &'a str>) -> ColumnKind {
        let mut int_ok = true;
        let mut float_ok = true;
        let mut bool_ok = true;
        let mut seen = false;

        for raw in fields {
            if is_na_marker(raw) {
                continue;
            }
            seen = true;
            int_ok = int_ok && raw.parse::<i64>().is_ok();
            float_ok = float_ok && raw.parse::<f64>().is_ok();
            bool_ok = bool_ok && parse_bool(raw).is_some();
            if !int_ok && !float_ok && !bool_ok {
                return ColumnKind::Text;
            }
        }

        match (seen, int_ok, float_ok, bool_ok) {
            (false, ..) => ColumnKind::Text,
            (true, true, _, _) => ColumnKind::Integer,
            (true, false, true, _) => ColumnKind::Float,
            (true, false, false, true) => ColumnKind::Bool,
            _ => ColumnKind::Text,
        }
    }

    /// Infer a kind from already-typed values (JSON, Parquet).
    pub fn infer_values<'a>(values: impl IntoIterator<Item = &'a Value>) -> ColumnKind {
        let mut kind: Option<ColumnKind> = None;
        for v in values {
            let this = match v {
                Value::Null => continue,
                Value::Integer(_) => ColumnKind::Integer,
                Value::Float(_) => ColumnKind::Float,
                Value::Bool(_) => ColumnKind::Bool,
                Value::String(_) => ColumnKind::Text,
            };
            kind = Some(match (kind, this) {
                (None, k) => k,
                (Some(a), b) if a == b => a,
                (Some(ColumnKind::Integer), ColumnKind::Float)
                | (Some(ColumnKind::Float), ColumnKind::Integer) => ColumnKind::Float,
                _ => return ColumnKind::Text,
            });
        }
        kind.unwrap_or(ColumnKind::Text)
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub kind: ColumnKind,
}

/// The full parsed table with pre-computed per-column distinct values.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Columns in source order.
    pub columns: Vec<ColumnInfo>,
    /// Row-major cells; every row has `columns.len()` entries.
    pub rows: Vec<Vec<Value>>,
    /// For each column the sorted set of distinct non-null values.
    pub unique_values: Vec<BTreeSet<Value>>,
}

impl Dataset {
    /// Build the distinct-value index from typed rows.
    pub fn new(columns: Vec<ColumnInfo>, rows: Vec<Vec<Value>>) -> Self {
        let mut unique_values = vec![BTreeSet::new(); columns.len()];
        for row in &rows {
            for (set, val) in unique_values.iter_mut().zip(row) {
                if !val.is_null() {
                    set.insert(val.clone());
                }
            }
        }
        Dataset {
            columns,
            rows,
            unique_values,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// `(rows, columns)`, as pandas reports it.
    pub fn shape(&self) -> (usize, usize) {
        (self.len(), self.n_cols())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn numeric_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.kind.is_numeric())
            .map(|c| c.name.clone())
            .collect()
    }

    pub fn categorical_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.kind.is_categorical())
            .map(|c| c.name.clone())
            .collect()
    }

    /// Cells of one column, top to bottom.
    pub fn column_values(&self, idx: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().map(move |row| &row[idx])
    }

    /// Non-null numeric cells of one column.
    pub fn numeric_values(&self, idx: usize) -> Vec<f64> {
        self.column_values(idx).filter_map(Value::as_f64).collect()
    }

    pub fn distinct_values(&self, name: &str) -> Option<&BTreeSet<Value>> {
        self.column_index(name).map(|i| &self.unique_values[i])
    }

    /// Missing cells per column, in column order.
    pub fn missing_counts(&self) -> Vec<(String, usize)> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let n = self.column_values(i).filter(|v| v.is_null()).count();
                (c.name.clone(), n)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Dataset {
        Dataset::new(
            vec![
                ColumnInfo { name: "a".into(), kind: ColumnKind::Integer },
                ColumnInfo { name: "b".into(), kind: ColumnKind::Text },
            ],
            vec![
                vec![Value::Integer(1), Value::String("x".into())],
                vec![Value::Null, Value::String("y".into())],
                vec![Value::Integer(3), Value::String("x".into())],
            ],
        )
    }

    #[test]
    fn infer_raw_prefers_narrowest_kind() {
        assert_eq!(ColumnKind::infer_raw(["1", "2", ""]), ColumnKind::Integer);
        assert_eq!(ColumnKind::infer_raw(["1", "2.5"]), ColumnKind::Float);
        assert_eq!(ColumnKind::infer_raw(["True", "false", "NA"]), ColumnKind::Bool);
        assert_eq!(ColumnKind::infer_raw(["1", "x"]), ColumnKind::Text);
        assert_eq!(ColumnKind::infer_raw(["", "nan"]), ColumnKind::Text);
    }

    #[test]
    fn infer_values_widens_int_to_float() {
        let vals = [Value::Integer(1), Value::Null, Value::Float(0.5)];
        assert_eq!(ColumnKind::infer_values(&vals), ColumnKind::Float);
        let mixed = [Value::Integer(1), Value::Bool(true)];
        assert_eq!(ColumnKind::infer_values(&mixed), ColumnKind::Text);
    }

    #[test]
    fn parse_as_maps_na_markers_to_null() {
        assert_eq!(Value::parse_as("NaN", ColumnKind::Float), Value::Null);
        assert_eq!(Value::parse_as("", ColumnKind::Text), Value::Null);
        assert_eq!(Value::parse_as("7", ColumnKind::Float), Value::Float(7.0));
    }

    #[test]
    fn coerce_converts_to_text_when_kinds_disagree() {
        assert_eq!(Value::Bool(true).coerce(ColumnKind::Text), Value::String("True".into()));
        assert_eq!(Value::Integer(2).coerce(ColumnKind::Float), Value::Float(2.0));
    }

    #[test]
    fn float_display_keeps_decimal_point() {
        assert_eq!(Value::Float(3.0).to_string(), "3.0");
        assert_eq!(Value::Float(0.25).to_string(), "0.25");
        assert_eq!(Value::Null.to_field(), "");
    }

    #[test]
    fn negative_zero_is_one_distinct_value() {
        let ds = Dataset::new(
            vec![ColumnInfo {
                name: "f".into(),
                kind: ColumnKind::infer_raw(["0.0", "-0.0", "1.5"]),
            }],
            ["0.0", "-0.0", "1.5"]
                .iter()
                .map(|raw| vec![Value::parse_as(raw, ColumnKind::Float)])
                .collect(),
        );
        assert_eq!(ds.unique_values[0].len(), 2);
        assert_eq!(ds.rows[1][0].to_field(), "0.0");
        assert_eq!(Value::Float(-0.0).coerce(ColumnKind::Float), Value::Float(0.0));
        assert_eq!(Value::from_f64(f64::NAN), Value::Null);
    }

    #[test]
    fn equality_agrees_with_ordering() {
        assert_ne!(Value::Float(-0.0), Value::Float(0.0));
        assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
        assert_ne!(Value::Integer(1), Value::Float(1.0));
    }

    #[test]
    fn ordering_puts_null_first_and_floats_total() {
        let mut set = BTreeSet::new();
        set.insert(Value::Float(f64::NAN));
        set.insert(Value::Float(1.0));
        set.insert(Value::Null);
        let first = set.iter().next().cloned();
        assert_eq!(first, Some(Value::Null));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn dataset_indexes_distinct_non_null_values() {
        let ds = table();
        assert_eq!(ds.shape(), (3, 2));
        assert_eq!(ds.unique_values[0].len(), 2);
        assert_eq!(ds.distinct_values("b").map(|s| s.len()), Some(2));
        assert_eq!(ds.missing_counts(), vec![("a".to_string(), 1), ("b".to_string(), 0)]);
        assert_eq!(ds.numeric_columns(), vec!["a".to_string()]);
        assert_eq!(ds.categorical_columns(), vec!["b".to_string()]);
        assert_eq!(ds.numeric_values(0), vec![1.0, 3.0]);
    }
}
