//! CSV downloads of the urgent and reorder views.

use std::path::{Path, PathBuf};

use crate::error::ExportError;
use crate::views::TableView;

pub const URGENT_EXPORT_FILE: &str = "urgent_items.csv";
pub const REORDER_EXPORT_FILE: &str = "reorder_items.csv";

/// Write `view` as CSV to `path`, returning the path written.
pub fn export_view(view: &TableView, path: &Path) -> Result<PathBuf, ExportError> {
    let bytes = view.to_csv()?;
    std::fs::write(path, bytes).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("exported view={:?} rows={} path={}", view.title, view.len(), path.display());
    Ok(path.to_path_buf())
}
