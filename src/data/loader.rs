use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int16Array, Int32Array, Int64Array,
    Int8Array, UInt16Array, UInt32Array, UInt64Array, UInt8Array,
};
use arrow::datatypes::{DataType, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{ColumnInfo, ColumnKind, Dataset, Value};
use crate::config::HttpConfig;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("HTTP {status} while fetching {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed delimited text: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("unreadable arrow data: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("No columns to parse from input")]
    NoColumns,

    #[error("{0}")]
    InvalidRecords(String),
}

pub type LoadResult<T> = Result<T, LoadError>;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Delimited(u8),
    Json,
    Parquet,
}

/// Pick a parser from a file name or URL path. Unknown extensions are read
/// as comma-separated text, like `read_csv` would.
fn format_for(name: &str) -> Format {
    let path = name.split(['?', '#']).next().unwrap_or(name);
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "tsv" | "tab" => Format::Delimited(b'\t'),
        "json" => Format::Json,
        "parquet" | "pq" => Format::Parquet,
        _ => Format::Delimited(b','),
    }
}

/// Load a dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.txt` – comma-separated text with a header row
/// * `.tsv`          – tab-separated text with a header row
/// * `.json`         – `[{ "col": value, ... }, ...]` (records orientation)
/// * `.parquet`      – flat Parquet file with scalar columns
pub fn load_file(path: &Path) -> LoadResult<Dataset> {
    let name = path.to_string_lossy();
    match format_for(&name) {
        Format::Delimited(delim) => {
            let file = std::fs::File::open(path)?;
            parse_delimited(file, delim)
        }
        Format::Json => {
            let text = std::fs::read_to_string(path)?;
            parse_json(&text)
        }
        Format::Parquet => {
            let file = std::fs::File::open(path)?;
            let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
            collect_batches(builder.build()?)
        }
    }
}

/// Load an in-memory upload (e.g. a file dropped onto the window).
pub fn load_bytes(name: &str, data: &[u8]) -> LoadResult<Dataset> {
    match format_for(name) {
        Format::Delimited(delim) => parse_delimited(data, delim),
        Format::Json => parse_json(std::str::from_utf8(data).map_err(|e| {
            LoadError::InvalidRecords(format!("JSON upload is not UTF-8: {e}"))
        })?),
        Format::Parquet => {
            let builder =
                ParquetRecordBatchReaderBuilder::try_new(bytes::Bytes::copy_from_slice(data))?;
            collect_batches(builder.build()?)
        }
    }
}

/// Fetch delimited text over HTTP(S) and parse it.
///
/// Non-success status codes are failures; the body is never parsed for them.
pub fn load_url(url: &str, config: &HttpConfig) -> LoadResult<Dataset> {
    let client = reqwest::blocking::Client::builder()
        .timeout(config.timeout)
        .user_agent(config.user_agent.clone())
        .build()?;

    let response = client.get(url).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.bytes()?;
    log::debug!("fetched {} bytes from {url}", body.len());

    let delim = match format_for(url) {
        Format::Delimited(d) => d,
        _ => b',',
    };
    parse_delimited(body.as_ref(), delim)
}

// ---------------------------------------------------------------------------
// Delimited text
// ---------------------------------------------------------------------------

/// Parse delimited text: header row, then records of the same width.
/// Column kinds are inferred from every non-missing field of the column.
pub fn parse_delimited<R: Read>(input: R, delimiter: u8) -> LoadResult<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(false)
        .from_reader(input);

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    if headers.is_empty() || (headers.len() == 1 && headers[0].is_empty()) {
        return Err(LoadError::NoColumns);
    }

    let mut raw_rows: Vec<csv::StringRecord> = Vec::new();
    for result in reader.records() {
        raw_rows.push(result?);
    }

    let columns: Vec<ColumnInfo> = dedupe_headers(headers)
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let kind = ColumnKind::infer_raw(raw_rows.iter().map(|r| r.get(i).unwrap_or("")));
            ColumnInfo { name, kind }
        })
        .collect();

    let rows = raw_rows
        .iter()
        .map(|record| {
            columns
                .iter()
                .enumerate()
                .map(|(i, col)| Value::parse_as(record.get(i).unwrap_or(""), col.kind))
                .collect()
        })
        .collect();

    Ok(Dataset::new(columns, rows))
}

/// Rename repeated header names to `name.1`, `name.2`, … (pandas mangling).
fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(headers.len());
    for h in headers {
        let mut name = h.clone();
        let mut n = 1;
        while out.contains(&name) {
            name = format!("{h}.{n}");
            n += 1;
        }
        out.push(name);
    }
    out
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "species": "setosa", "petal_width": 0.2 },
///   ...
/// ]
/// ```
///
/// Columns appear in first-seen order; a key missing from a record is null.
fn parse_json(text: &str) -> LoadResult<Dataset> {
    let root: JsonValue = serde_json::from_str(text)?;
    let records = root
        .as_array()
        .ok_or_else(|| LoadError::InvalidRecords("Expected top-level JSON array".into()))?;

    let mut names: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| LoadError::InvalidRecords(format!("Row {i} is not a JSON object")))?;
        for key in obj.keys() {
            if !names.contains(key) {
                names.push(key.clone());
            }
        }
    }
    if names.is_empty() {
        return Err(LoadError::NoColumns);
    }

    let cells: Vec<Vec<Value>> = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| {
            names
                .iter()
                .map(|n| obj.get(n).map(json_to_value).unwrap_or(Value::Null))
                .collect()
        })
        .collect();

    Ok(typed_dataset(names, cells))
}

fn json_to_value(val: &JsonValue) -> Value {
    match val {
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::from_f64(f)
            } else {
                Value::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Null => Value::Null,
        other => Value::String(other.to_string()),
    }
}

/// Infer each column's kind from typed cells and coerce the cells to it.
fn typed_dataset(names: Vec<String>, mut cells: Vec<Vec<Value>>) -> Dataset {
    let columns: Vec<ColumnInfo> = dedupe_headers(names)
        .into_iter()
        .enumerate()
        .map(|(i, name)| ColumnInfo {
            name,
            kind: ColumnKind::infer_values(cells.iter().map(|r| &r[i])),
        })
        .collect();

    for row in &mut cells {
        for (cell, col) in row.iter_mut().zip(&columns) {
            *cell = std::mem::replace(cell, Value::Null).coerce(col.kind);
        }
    }
    Dataset::new(columns, cells)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Read every record batch of a Parquet file into one dataset.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`). Nested columns are rendered as text.
fn collect_batches<I>(reader: I) -> LoadResult<Dataset>
where
    I: Iterator<Item = Result<RecordBatch, arrow::error::ArrowError>>,
{
    let mut schema: Option<Arc<Schema>> = None;
    let mut cells: Vec<Vec<Value>> = Vec::new();

    for batch_result in reader {
        let batch = batch_result?;
        if schema.is_none() {
            schema = Some(batch.schema());
        }
        for row in 0..batch.num_rows() {
            let values = batch
                .columns()
                .iter()
                .map(|col| arrow_value(col, row))
                .collect::<LoadResult<Vec<_>>>()?;
            cells.push(values);
        }
    }

    let schema = schema.ok_or(LoadError::NoColumns)?;
    let names: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();
    if names.is_empty() {
        return Err(LoadError::NoColumns);
    }
    Ok(typed_dataset(names, cells))
}

/// Extract a single cell from an Arrow column at a given row.
fn arrow_value(col: &Arc<dyn Array>, row: usize) -> LoadResult<Value> {
    if col.is_null(row) {
        return Ok(Value::Null);
    }

    macro_rules! int_cell {
        ($ty:ty) => {
            col.as_any()
                .downcast_ref::<$ty>()
                .map(|a| Value::Integer(a.value(row) as i64))
        };
    }

    let value = match col.data_type() {
        DataType::Utf8 => Some(Value::String(col.as_string::<i32>().value(row).to_string())),
        DataType::LargeUtf8 => Some(Value::String(col.as_string::<i64>().value(row).to_string())),
        DataType::Int8 => int_cell!(Int8Array),
        DataType::Int16 => int_cell!(Int16Array),
        DataType::Int32 => int_cell!(Int32Array),
        DataType::Int64 => int_cell!(Int64Array),
        DataType::UInt8 => int_cell!(UInt8Array),
        DataType::UInt16 => int_cell!(UInt16Array),
        DataType::UInt32 => int_cell!(UInt32Array),
        DataType::UInt64 => col
            .as_any()
            .downcast_ref::<UInt64Array>()
            .map(|a| match i64::try_from(a.value(row)) {
                Ok(i) => Value::Integer(i),
                Err(_) => Value::Float(a.value(row) as f64),
            }),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .map(|a| Value::from_f64(a.value(row) as f64)),
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(|a| Value::from_f64(a.value(row))),
        DataType::Boolean => col
            .as_any()
            .downcast_ref::<BooleanArray>()
            .map(|a| Value::Bool(a.value(row))),
        _ => {
            let formatter = ArrayFormatter::try_new(col.as_ref(), &FormatOptions::default())?;
            Some(Value::String(formatter.value(row).to_string()))
        }
    };

    value.ok_or_else(|| {
        LoadError::InvalidRecords(format!("column type {:?} did not downcast", col.data_type()))
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use arrow::array::{ArrayRef, StringArray};
    use arrow::datatypes::Field;
    use parquet::arrow::ArrowWriter;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn parses_header_and_infers_kinds() -> TestResult {
        let ds = parse_delimited("a,b,c\n1,x,0.5\n2,y,\n3,x,1.5\n".as_bytes(), b',')?;
        assert_eq!(ds.shape(), (3, 3));
        assert_eq!(ds.columns[0].kind, ColumnKind::Integer);
        assert_eq!(ds.columns[1].kind, ColumnKind::Text);
        assert_eq!(ds.columns[2].kind, ColumnKind::Float);
        assert_eq!(ds.rows[1][2], Value::Null);
        assert_eq!(ds.rows[2][0], Value::Integer(3));
        Ok(())
    }

    #[test]
    fn header_only_input_has_zero_rows() -> TestResult {
        let ds = parse_delimited("a,b\n".as_bytes(), b',')?;
        assert_eq!(ds.shape(), (0, 2));
        Ok(())
    }

    #[test]
    fn empty_input_has_no_columns() {
        let err = parse_delimited("".as_bytes(), b',').unwrap_err();
        assert!(matches!(err, LoadError::NoColumns));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = parse_delimited("a,b\n1,2\n3\n".as_bytes(), b',').unwrap_err();
        assert!(matches!(err, LoadError::Csv(_)));
    }

    #[test]
    fn duplicate_headers_are_mangled() -> TestResult {
        let ds = parse_delimited("x,x,x\n1,2,3\n".as_bytes(), b',')?;
        assert_eq!(ds.column_names(), vec!["x", "x.1", "x.2"]);
        Ok(())
    }

    #[test]
    fn extension_picks_format() {
        assert_eq!(format_for("data.TSV"), Format::Delimited(b'\t'));
        assert_eq!(format_for("https://h/x.json?raw=1"), Format::Json);
        assert_eq!(format_for("rows.pq"), Format::Parquet);
        assert_eq!(format_for("https://h/download"), Format::Delimited(b','));
    }

    #[test]
    fn load_file_reads_tsv() -> TestResult {
        let mut file = tempfile::Builder::new().suffix(".tsv").tempfile()?;
        write!(file, "k\tv\na\t1\nb\t2\n")?;
        let ds = load_file(file.path())?;
        assert_eq!(ds.shape(), (2, 2));
        assert_eq!(ds.columns[1].kind, ColumnKind::Integer);
        Ok(())
    }

    #[test]
    fn json_records_fill_missing_keys_with_null() -> TestResult {
        let ds = load_bytes(
            "rows.json",
            br#"[{"s": "a", "n": 1}, {"s": "b", "n": 2.5}, {"s": "c"}]"#,
        )?;
        assert_eq!(ds.column_names(), vec!["s", "n"]);
        assert_eq!(ds.columns[1].kind, ColumnKind::Float);
        assert_eq!(ds.rows[0][1], Value::Float(1.0));
        assert_eq!(ds.rows[2][1], Value::Null);
        Ok(())
    }

    #[test]
    fn json_columns_follow_first_seen_key_order() -> TestResult {
        let ds = load_bytes("rows.json", br#"[{"z": 1, "a": 2}, {"m": 3, "a": 4}]"#)?;
        assert_eq!(ds.column_names(), vec!["z", "a", "m"]);
        assert_eq!(ds.rows[1][0], Value::Null);
        Ok(())
    }

    #[test]
    fn json_must_be_an_array() {
        let err = load_bytes("x.json", br#"{"a": 1}"#).unwrap_err();
        assert!(matches!(err, LoadError::InvalidRecords(_)));
    }

    #[test]
    fn parquet_round_trips_scalar_columns() -> TestResult {
        let schema = Arc::new(Schema::new(vec![
            Field::new("name", DataType::Utf8, false),
            Field::new("score", DataType::Float64, true),
            Field::new("n", DataType::Int32, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["a", "b"])) as ArrayRef,
                Arc::new(Float64Array::from(vec![Some(1.5), None])),
                Arc::new(Int32Array::from(vec![7, 8])),
            ],
        )?;

        let mut buf = Vec::new();
        let mut writer = ArrowWriter::try_new(&mut buf, schema, None)?;
        writer.write(&batch)?;
        writer.close()?;

        let ds = load_bytes("t.parquet", &buf)?;
        assert_eq!(ds.shape(), (2, 3));
        assert_eq!(ds.columns[1].kind, ColumnKind::Float);
        assert_eq!(ds.rows[1][1], Value::Null);
        assert_eq!(ds.rows[0][2], Value::Integer(7));
        Ok(())
    }

    #[test]
    fn url_load_parses_body() -> TestResult {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/data.csv")
            .with_status(200)
            .with_body("a,b\n1,x\n2,y\n")
            .create();

        let ds = load_url(&format!("{}/data.csv", server.url()), &HttpConfig::default())?;
        mock.assert();
        assert_eq!(ds.shape(), (2, 2));
        Ok(())
    }

    #[test]
    fn url_404_is_a_status_error() {
        let mut server = mockito::Server::new();
        let _mock = server.mock("GET", "/missing.csv").with_status(404).create();

        let err = load_url(&format!("{}/missing.csv", server.url()), &HttpConfig::default())
            .unwrap_err();
        assert!(matches!(err, LoadError::HttpStatus { status: 404, .. }));
    }
}
