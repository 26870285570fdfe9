//! Writes spill bindings into a workbook.

use super::{Workbook, Worksheet};
use crate::error::Result;
use spillgrid_engine::engine::{CellRange, CellRef, CellType, SpillBinding};
use tracing::{debug, info};

impl Workbook {
    /// Serialize `binding` into `sheet`.
    ///
    /// The anchor cell receives the formula tagged with the binding's range;
    /// every other cell in the range becomes a spill member of the anchor.
    /// Anything previously stored in those cells is overwritten. An earlier
    /// binding that overlaps the range is cut back first so that it no longer
    /// reaches into it. Nothing is written when the sheet does not exist.
    pub fn apply_spill_binding(&mut self, sheet: &str, binding: &SpillBinding) -> Result<()> {
        let worksheet = self.sheet_mut(sheet)?;
        trim_overlapped_spills(worksheet, binding.range());
        let anchor = binding.anchor();
        worksheet.mark_cell_as_array_anchor(anchor, binding.formula(), binding.range());
        for cell_ref in binding.members() {
            worksheet.mark_cell_as_spill_member(cell_ref, anchor);
        }
        debug!(
            sheet,
            range = %binding.range(),
            members = binding.range().cell_count() - 1,
            "wrote spill binding"
        );
        Ok(())
    }
}

/// Cut back every earlier spill that reaches into `range`.
///
/// A spill whose anchor lies inside `range` is dropped. Any other keeps the
/// larger of its block above `range` or its block left of `range`, so its
/// recorded range stays a rectangle starting at the anchor. Members left
/// outside the kept block are cleared.
fn trim_overlapped_spills(worksheet: &mut Worksheet, range: CellRange) {
    let overlapped: Vec<(CellRef, String, CellRange)> = worksheet
        .grid
        .iter()
        .filter_map(|entry| match &entry.value().contents {
            CellType::ArrayAnchor { formula, range: old } if old.intersects(&range) => {
                Some((*entry.key(), formula.clone(), *old))
            }
            _ => None,
        })
        .collect();

    for (anchor, formula, old) in overlapped {
        let kept = kept_block(old, range);
        for cell_ref in old.cells() {
            if range.contains(&cell_ref) || kept.is_some_and(|k| k.contains(&cell_ref)) {
                continue;
            }
            if worksheet.get(&cell_ref).and_then(|c| c.spill_anchor()) == Some(anchor) {
                worksheet.clear_cell(&cell_ref);
            }
        }
        if let Some(kept) = kept {
            worksheet.mark_cell_as_array_anchor(anchor, &formula, kept);
        }
        debug!(
            anchor = %anchor,
            old = %old,
            kept = ?kept.map(|k| k.to_string()),
            "trimmed overlapped spill"
        );
    }
}

/// Largest rectangle of `old` starting at its anchor that stays clear of `newer`.
fn kept_block(old: CellRange, newer: CellRange) -> Option<CellRange> {
    let anchor = old.start();
    if newer.contains(&anchor) {
        return None;
    }
    let above = (newer.start().row > anchor.row)
        .then(|| CellRange::new(anchor, CellRef::new(old.end().col, newer.start().row - 1)).ok())
        .flatten();
    let left = (newer.start().col > anchor.col)
        .then(|| CellRange::new(anchor, CellRef::new(newer.start().col - 1, old.end().row)).ok())
        .flatten();
    match (above, left) {
        (Some(a), Some(l)) if l.cell_count() > a.cell_count() => Some(l),
        (Some(a), _) => Some(a),
        (None, l) => l,
    }
}

/// Serialize a prepared [`SpillBinding`] into `sheet` of `workbook`.
pub fn apply(workbook: &mut Workbook, sheet: &str, binding: &SpillBinding) -> Result<()> {
    workbook.apply_spill_binding(sheet, binding)
}

/// Resolve `start`/`end`, bind `formula` to the range and write it to `sheet`.
///
/// Checks run in order: sheet, references, range ordering, formula. The
/// first failure is returned and the workbook is left untouched. On success
/// the confirmation names the formula as given and the resolved range.
pub fn apply_dynamic_array_formula(
    workbook: &mut Workbook,
    sheet: &str,
    start: &str,
    end: &str,
    formula: &str,
) -> Result<String> {
    workbook.sheet(sheet)?;

    let start = CellRef::parse(start)?;
    let end = CellRef::parse(end)?;
    let range = CellRange::new(start, end)?;
    let binding = SpillBinding::bind(range, formula)?;

    workbook.apply_spill_binding(sheet, &binding)?;

    let applied = formula.trim();
    info!(sheet, range = %range, formula = applied, "applied dynamic array formula");
    Ok(format!(
        "Applied dynamic array formula '{}' to range {}",
        applied, range
    ))
}
