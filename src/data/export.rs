use std::path::Path;

use anyhow::{Context, Result};

use super::filter::FilteredView;
use crate::config::{EXPORT_FILE_NAME, EXPORT_MIME};

// ---------------------------------------------------------------------------
// CSV export of the filtered view
// ---------------------------------------------------------------------------

/// A file offered for download: fixed name, MIME type and contents.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadArtifact {
    pub file_name: &'static str,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl DownloadArtifact {
    pub fn filtered_csv(view: &FilteredView<'_>) -> Result<Self> {
        Ok(DownloadArtifact {
            file_name: EXPORT_FILE_NAME,
            mime: EXPORT_MIME,
            bytes: to_csv_bytes(view)?,
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, &self.bytes)
            .with_context(|| format!("writing {} to {}", self.file_name, path.display()))?;
        log::info!("Saved {} bytes of {} to {}", self.bytes.len(), self.mime, path.display());
        Ok(())
    }
}

/// Serialize the view as UTF-8 CSV: header row, then one line per row,
/// no index column. Missing cells are empty fields.
pub fn to_csv_bytes(view: &FilteredView<'_>) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(view.dataset.columns.iter().map(|c| c.name.as_str()))
        .context("writing CSV header")?;

    for row in view.rows() {
        writer
            .write_record(row.iter().map(|v| v.to_field()))
            .context("writing CSV row")?;
    }

    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing CSV buffer: {}", e.error()))
}
