//! CSV encoding of a context subset for the assistant prompt.
//!
//! Header row plus every record, all columns in schema order. Fields with
//! commas, quotes or newlines are quoted by the csv writer, so row
//! boundaries survive whatever is in a product name.

use std::io;

use crate::types::InventoryTable;

/// Encode `table` as CSV text.
pub fn serialize(table: &InventoryTable) -> csv::Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(table.schema().headers())?;
    for record in table.iter() {
        writer.write_record(record.cells())?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| csv::Error::from(io::Error::new(io::ErrorKind::InvalidData, e)))
}
