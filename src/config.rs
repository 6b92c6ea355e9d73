use std::time::Duration;

// ---------------------------------------------------------------------------
// Window
// ---------------------------------------------------------------------------

pub const WINDOW_TITLE: &str = "Interactive EDA App";
pub const WINDOW_SIZE: [f32; 2] = [1280.0, 900.0];
pub const WINDOW_MIN_SIZE: [f32; 2] = [640.0, 420.0];

// ---------------------------------------------------------------------------
// Tables & charts
// ---------------------------------------------------------------------------

/// Rows shown in the "Preview of Dataset" table.
pub const PREVIEW_ROWS: usize = 5;

/// Upper bound on histogram bins; the actual count comes from nice binning.
pub const HISTOGRAM_MAX_BINS: usize = 30;

/// Scatter marker area in square pixels.
pub const SCATTER_POINT_AREA: f32 = 60.0;

/// Marker radius matching [`SCATTER_POINT_AREA`].
pub fn scatter_point_radius() -> f32 {
    (SCATTER_POINT_AREA / std::f32::consts::PI).sqrt()
}

pub const CHART_HEIGHT: f32 = 380.0;

// ---------------------------------------------------------------------------
// Profiling report
// ---------------------------------------------------------------------------

pub const REPORT_TITLE: &str = "Data Profile Report";
pub const REPORT_HEIGHT: f32 = 1000.0;

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

pub const EXPORT_FILE_NAME: &str = "filtered_data.csv";
pub const EXPORT_MIME: &str = "text/csv";

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

/// Settings for fetching a dataset from a URL.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        }
    }
}
