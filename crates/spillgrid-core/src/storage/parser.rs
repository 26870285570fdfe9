//! Parser for .grd file format

use crate::document::Workbook;
use crate::error::{Result, SpillgridError};
use spillgrid_engine::engine::{Cell, CellRange, CellRef};
use std::fs;
use std::path::Path;

/// Parse a .grd file and return a Workbook
pub fn parse_grd(path: &Path) -> Result<Workbook> {
    let content = fs::read_to_string(path).map_err(|e| SpillgridError::io("read", path, e))?;
    parse_grd_content(&content)
}

/// Parse .grd content from a string.
///
/// Cells listed before any `[Sheet]` header land in the default sheet.
/// Spill members are rebuilt from each anchor's range.
pub fn parse_grd_content(content: &str) -> Result<Workbook> {
    let mut workbook = Workbook::empty();
    let mut current: Option<String> = None;

    for (line_num, line) in content.lines().enumerate() {
        let line_num = line_num + 1;
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let sheet = workbook
                .get_or_create_sheet(header)
                .map_err(|e| parse_error(line_num, e.to_string()))?;
            current = Some(sheet.name().to_string());
            continue;
        }

        let Some((cell_ref_str, value_str)) = line.split_once(':') else {
            return Err(parse_error(line_num, "Expected 'CELLREF: VALUE' format"));
        };

        let cell_ref_str = cell_ref_str.trim();
        let cell_ref = CellRef::parse(cell_ref_str)
            .map_err(|_| parse_error(line_num, format!("Invalid cell reference: {}", cell_ref_str)))?;
        let cell = parse_cell_value(cell_ref, value_str, line_num)?;

        let sheet_name = match &current {
            Some(name) => name.clone(),
            None => {
                let name = crate::document::DEFAULT_SHEET_NAME.to_string();
                workbook
                    .get_or_create_sheet(&name)
                    .map_err(|e| parse_error(line_num, e.to_string()))?;
                current = Some(name.clone());
                name
            }
        };
        workbook.sheet_mut(&sheet_name)?.set_cell(cell_ref, cell);
    }

    if workbook.sheets.is_empty() {
        workbook = Workbook::new();
    }
    for sheet in &mut workbook.sheets {
        sheet.rebuild_spill_members(false);
    }
    workbook.modified = false;
    Ok(workbook)
}

fn parse_error(line: usize, message: impl Into<String>) -> SpillgridError {
    SpillgridError::Parse {
        line,
        message: message.into(),
    }
}

/// Parse a cell value string into a Cell
fn parse_cell_value(cell_ref: CellRef, value: &str, line_num: usize) -> Result<Cell> {
    let value = value.trim();

    if value.is_empty() {
        return Ok(Cell::new_empty());
    }

    // Array anchor: "{F3:F9} =FORMULA"
    if let Some(rest) = value.strip_prefix('{') {
        let Some((range_str, formula)) = rest.split_once('}') else {
            return Err(parse_error(line_num, "Unterminated array range"));
        };
        let range = CellRange::parse(range_str.trim())
            .map_err(|e| parse_error(line_num, e.to_string()))?;
        if range.start() != cell_ref {
            return Err(parse_error(
                line_num,
                format!("Array range {} must start at {}", range, cell_ref),
            ));
        }
        let formula = formula.trim();
        if !formula.starts_with('=') {
            return Err(parse_error(line_num, "Array formula must start with '='"));
        }
        return Ok(Cell::new_array_anchor(&unescape_grd(formula, false), range));
    }

    if value.starts_with('=') {
        return Ok(Cell::new_formula(&unescape_grd(value, false)));
    }

    // Quoted string: starts and ends with '"'
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        let text = &value[1..value.len() - 1];
        return Ok(Cell::new_text(&unescape_grd(text, true)));
    }

    match value {
        "TRUE" => return Ok(Cell::new_bool(true)),
        "FALSE" => return Ok(Cell::new_bool(false)),
        _ => {}
    }

    match value.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(Cell::new_number(n)),
        _ => Err(parse_error(
            line_num,
            format!("Invalid value: {}. Use quotes for text.", value),
        )),
    }
}

/// Undo the writer's escapes; `\"` is only special inside quoted text.
fn unescape_grd(input: &str, quoted: bool) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('"') if quoted => out.push('"'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(next) => {
                out.push('\\');
                out.push(next);
            }
            None => out.push('\\'),
        }
    }
    out
}
