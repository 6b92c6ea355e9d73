/// Data layer: core types, loading, filtering, statistics and export.
///
/// Architecture:
/// ```text
///  upload (.csv / .tsv / .json / .parquet)      URL (delimited text)
///        │                                            │
///        ▼                                            ▼
///   ┌──────────────────────────────────────────────────────┐
///   │  loader   parse + infer column kinds → Dataset        │
///   └──────────────────────────────────────────────────────┘
///        │
///        ▼
///   ┌──────────┐        ┌──────────┐
///   │ Dataset  │───────▶│  stats   │  quantiles, bins, boxes, correlation
///   └──────────┘        └──────────┘
///        │
///        ▼
///   ┌──────────┐        ┌──────────┐
///   │  filter  │───────▶│  export  │  filtered view → filtered_data.csv
///   └──────────┘        └──────────┘
/// ```

pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod stats;
