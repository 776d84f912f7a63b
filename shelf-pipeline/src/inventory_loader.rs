//! Inventory file loader.
//!
//! Turns a CSV or spreadsheet file into an [`InventoryTable`], or a text file
//! into a preview payload. The format is chosen by file extension:
//!   .csv          -> table
//!   .xlsx / .xls  -> table (first worksheet)
//!   .txt          -> raw text, preview only
//!   anything else -> unsupported (a warning, not an error)

use std::io::{Cursor, Read};
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use crate::error::LoadError;
use crate::types::InventoryTable;

/// Default dataset loaded when nothing else is supplied.
pub const DEFAULT_DATA_FILE: &str = "inventory_optimized.csv";

/// Characters of an uploaded text file shown in the preview.
pub const TEXT_PREVIEW_CHARS: usize = 2000;

/// File kind, detected by extension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Spreadsheet,
    Text,
    Unsupported(String),
}

impl SourceFormat {
    pub fn from_file_name(file_name: &str) -> Self {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "csv" => SourceFormat::Csv,
            "xlsx" | "xls" => SourceFormat::Spreadsheet,
            "txt" => SourceFormat::Text,
            _ => SourceFormat::Unsupported(extension),
        }
    }
}

/// What a loaded file turned out to be.
#[derive(Clone, Debug)]
pub enum Upload {
    Table(InventoryTable),
    Text(String),
    Unsupported { extension: String },
}

/// Load inventory rows from a CSV reader.
pub fn load_inventory<R: Read>(reader: R) -> Result<InventoryTable, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()
        .map_err(|source| LoadError::Csv { line: 1, source })?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(LoadError::MissingHeader);
    }

    let mut rows = Vec::new();
    for (idx, result) in csv_reader.records().enumerate() {
        let record = result.map_err(|source| LoadError::Csv {
            line: source
                .position()
                .map(|p| p.line())
                .unwrap_or(idx as u64 + 2),
            source,
        })?;
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(InventoryTable::from_rows(headers, rows))
}

/// Load inventory rows from the first worksheet of a spreadsheet.
pub fn load_spreadsheet(bytes: Vec<u8>) -> Result<InventoryTable, LoadError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| LoadError::Spreadsheet(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(LoadError::MissingHeader)?
        .map_err(|e| LoadError::Spreadsheet(e.to_string()))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or(LoadError::MissingHeader)?
        .iter()
        .map(cell_text)
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(LoadError::MissingHeader);
    }

    let body: Vec<Vec<String>> = rows
        .map(|row| row.iter().map(cell_text).collect::<Vec<_>>())
        .filter(|cells| cells.iter().any(|c| !c.is_empty()))
        .collect();

    Ok(InventoryTable::from_rows(headers, body))
}

/// Render a spreadsheet cell the way a CSV export would.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        // Whole floats print without a trailing ".0" so "5" and 5.0 agree.
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Load an uploaded file from memory, dispatching on its extension.
pub fn load_bytes(file_name: &str, bytes: Vec<u8>) -> Result<Upload, LoadError> {
    match SourceFormat::from_file_name(file_name) {
        SourceFormat::Csv => load_inventory(bytes.as_slice()).map(Upload::Table),
        SourceFormat::Spreadsheet => load_spreadsheet(bytes).map(Upload::Table),
        SourceFormat::Text => Ok(Upload::Text(String::from_utf8_lossy(&bytes).into_owned())),
        SourceFormat::Unsupported(extension) => Ok(Upload::Unsupported { extension }),
    }
}

/// Load a file from disk, dispatching on its extension.
///
/// Unsupported extensions are reported without opening the file.
pub fn load_path(path: &Path) -> Result<Upload, LoadError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if let SourceFormat::Unsupported(extension) = SourceFormat::from_file_name(&file_name) {
        return Ok(Upload::Unsupported { extension });
    }

    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_bytes(&file_name, bytes)
}

/// Load a file that must be tabular (the default dataset).
pub fn load_inventory_file(path: &Path) -> Result<InventoryTable, LoadError> {
    match load_path(path)? {
        Upload::Table(table) => Ok(table),
        Upload::Text(_) | Upload::Unsupported { .. } => Err(LoadError::NotTabular {
            file_name: path.display().to_string(),
        }),
    }
}

/// First [`TEXT_PREVIEW_CHARS`] characters of an uploaded text file.
pub fn text_preview(text: &str) -> &str {
    match text.char_indices().nth(TEXT_PREVIEW_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
