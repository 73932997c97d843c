//! Spreadsheet export of accumulated citation tables.
//!
//! Builds an xlsx workbook with one header row followed by one row per
//! accumulated [`FieldSet`], preserving the fixed column order.

use crate::error::Result;
use crate::fields::{FieldSet, HEADERS};
use rust_xlsxwriter::Workbook;
use std::path::Path;
use tracing::info;

/// Fixed download filename for the exported workbook
pub const EXPORT_FILENAME: &str = "research_data.xlsx";

/// MIME type for xlsx attachments
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Serialize the accumulated table to an in-memory xlsx workbook.
///
/// An empty table still produces a workbook containing the header row.
/// Does not mutate the table.
pub fn workbook_bytes(rows: &[FieldSet]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, header) in HEADERS.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header)?;
    }

    for (row_idx, row) in rows.iter().enumerate() {
        for (col, value) in row.values().iter().enumerate() {
            worksheet.write_string(row_idx as u32 + 1, col as u16, value)?;
        }
    }

    let buffer = workbook.save_to_buffer()?;
    info!(rows = rows.len(), bytes = buffer.len(), "Built workbook");
    Ok(buffer)
}

/// Write the accumulated table to an xlsx file on disk (CLI mode)
pub fn write_workbook(path: &Path, rows: &[FieldSet]) -> Result<()> {
    let buffer = workbook_bytes(rows)?;
    std::fs::write(path, buffer)?;
    info!(path = %path.display(), "Saved workbook");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FIELD_COUNT;

    fn sample_row() -> FieldSet {
        let values: [String; FIELD_COUNT] =
            std::array::from_fn(|i| format!("v{}", i + 1));
        FieldSet::from(values)
    }

    #[test]
    fn test_empty_table_still_builds_headers() {
        let bytes = workbook_bytes(&[]).unwrap();
        // xlsx files are zip archives; check magic bytes and non-trivial size
        assert!(bytes.len() > 4);
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_rows_grow_the_workbook() {
        let empty = workbook_bytes(&[]).unwrap();
        let rows: Vec<FieldSet> = (0..10).map(|_| sample_row()).collect();
        let filled = workbook_bytes(&rows).unwrap();
        assert!(filled.len() > empty.len());
    }

    #[test]
    fn test_write_workbook_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(EXPORT_FILENAME);
        write_workbook(&path, &[sample_row()]).unwrap();
        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
