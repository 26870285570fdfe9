//! Writer for .grd file format

use crate::document::{Workbook, Worksheet};
use crate::error::{Result, SpillgridError};
use spillgrid_engine::engine::CellType;
use std::fs;
use std::path::Path;

/// Write a Workbook to a .grd file
pub fn write_grd(path: &Path, workbook: &Workbook) -> Result<()> {
    let content = write_grd_content(workbook);
    fs::write(path, content).map_err(|e| SpillgridError::io("write", path, e))
}

/// Write a Workbook to a .grd format string.
///
/// Spill members are left out; they are implied by their anchor's range.
pub fn write_grd_content(workbook: &Workbook) -> String {
    let mut lines = vec!["# spillgrid workbook".to_string()];
    for sheet in &workbook.sheets {
        lines.push(String::new());
        lines.push(format!("[{}]", sheet.name()));
        write_sheet_lines(sheet, &mut lines);
    }
    lines.join("\n") + "\n"
}

fn write_sheet_lines(sheet: &Worksheet, lines: &mut Vec<String>) {
    for (cell_ref, cell) in sheet.cells_sorted() {
        let value_str = match &cell.contents {
            CellType::Empty | CellType::SpillMember { .. } => continue,
            CellType::Number(n) => n.to_string(),
            CellType::Bool(true) => "TRUE".to_string(),
            CellType::Bool(false) => "FALSE".to_string(),
            CellType::Text(s) => format!("\"{}\"", escape_grd(s, true)),
            CellType::Formula(f) => escape_grd(f, false),
            CellType::ArrayAnchor { formula, range } => {
                format!("{{{}}} {}", range, escape_grd(formula, false))
            }
        };
        lines.push(format!("{}: {}", cell_ref, value_str));
    }
}

/// Escape backslashes and line breaks so a value stays on one line.
/// Quotes are escaped only inside quoted text; formulas keep theirs.
fn escape_grd(input: &str, quoted: bool) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' if quoted => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out
}
