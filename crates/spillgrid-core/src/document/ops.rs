use super::Worksheet;
use crate::error::{Result, SpillgridError};
use spillgrid_engine::engine::{Cell, CellRange, CellRef, CellType, CellValue};

impl Worksheet {
    /// Snapshot of a cell, or `None` when it is empty.
    pub fn get(&self, cell_ref: &CellRef) -> Option<Cell> {
        self.grid.get(cell_ref).map(|r| r.clone())
    }

    /// Store a cell; empty cells are removed from the grid.
    pub fn set_cell(&mut self, cell_ref: CellRef, cell: Cell) {
        if cell.is_empty() {
            self.grid.remove(&cell_ref);
        } else {
            self.grid.insert(cell_ref, cell);
        }
    }

    /// Write a plain value, replacing whatever the cell held.
    pub fn set_cell_value(&mut self, cell_ref: CellRef, value: impl Into<CellValue>) {
        self.set_cell(cell_ref, Cell::from(value.into()));
    }

    /// Write an ordinary (non-spilling) formula.
    pub fn set_formula(&mut self, cell_ref: CellRef, formula: &str) {
        self.set_cell(cell_ref, Cell::new_formula(formula));
    }

    /// Tag `cell_ref` as the anchor of an array formula spilling over `range`.
    pub fn mark_cell_as_array_anchor(&mut self, cell_ref: CellRef, formula: &str, range: CellRange) {
        self.set_cell(cell_ref, Cell::new_array_anchor(formula, range));
    }

    /// Tag `cell_ref` as holding part of the result of the array formula at `anchor`.
    pub fn mark_cell_as_spill_member(&mut self, cell_ref: CellRef, anchor: CellRef) {
        self.set_cell(cell_ref, Cell::new_spill_member(anchor));
    }

    pub fn clear_cell(&mut self, cell_ref: &CellRef) {
        self.grid.remove(cell_ref);
    }

    /// Write a block of values row by row starting at `start`.
    /// Empty values clear their cell. Returns the number of non-empty cells written.
    pub fn write_rows(&mut self, start: CellRef, rows: &[Vec<CellValue>]) -> Result<usize> {
        let mut written = 0;
        for (row_idx, row) in rows.iter().enumerate() {
            for (col_idx, value) in row.iter().enumerate() {
                let cell_ref = start.offset(col_idx, row_idx).ok_or_else(|| {
                    SpillgridError::InvalidReference(format!(
                        "{}+({},{})",
                        start, col_idx, row_idx
                    ))
                })?;
                if !matches!(value, CellValue::Empty) {
                    written += 1;
                }
                self.set_cell_value(cell_ref, value.clone());
            }
        }
        Ok(written)
    }

    pub fn len(&self) -> usize {
        self.grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    /// All stored cells, sorted row by row.
    pub fn cells_sorted(&self) -> Vec<(CellRef, Cell)> {
        let mut cells: Vec<(CellRef, Cell)> = self
            .grid
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        cells.sort_by(|(a, _), (b, _)| a.row.cmp(&b.row).then(a.col.cmp(&b.col)));
        cells
    }

    /// Bounding range of every stored cell, or `None` for an empty sheet.
    pub fn dimension(&self) -> Option<CellRange> {
        let mut keys = self.grid.iter().map(|entry| *entry.key());
        let first = keys.next()?;
        let seed = CellRange::new(first, first).ok()?;
        Some(keys.fold(seed, |range, cell| range.expand_to(&cell)))
    }

    /// Cells tagged as spill members of `anchor`, row by row.
    pub fn spill_members_of(&self, anchor: &CellRef) -> Vec<CellRef> {
        let mut members: Vec<CellRef> = self
            .grid
            .iter()
            .filter(|entry| entry.value().spill_anchor().as_ref() == Some(anchor))
            .map(|entry| *entry.key())
            .collect();
        members.sort_by(|a, b| a.row.cmp(&b.row).then(a.col.cmp(&b.col)));
        members
    }

    /// Re-tag the spill members of every array anchor from its range.
    ///
    /// Storage formats only keep the anchor; loaders call this to rebuild the
    /// placeholders. Anchors are never overwritten. Other stored cells inside
    /// a range are kept unless `replace_values` is set, which SpreadsheetML
    /// loaders use because member cells there hold cached results.
    /// Anchors are visited row by row, so the first one claims a shared cell.
    pub(crate) fn rebuild_spill_members(&mut self, replace_values: bool) {
        let mut anchors: Vec<(CellRef, CellRange)> = self
            .grid
            .iter()
            .filter_map(|entry| match &entry.value().contents {
                CellType::ArrayAnchor { range, .. } => Some((*entry.key(), *range)),
                _ => None,
            })
            .collect();
        anchors.sort_by(|(a, _), (b, _)| a.row.cmp(&b.row).then(a.col.cmp(&b.col)));

        for (anchor, range) in anchors {
            for cell_ref in range.cells().filter(|c| *c != anchor) {
                let claimable = match self.grid.get(&cell_ref).map(|c| c.contents.clone()) {
                    None => true,
                    Some(CellType::ArrayAnchor { .. } | CellType::SpillMember { .. }) => false,
                    Some(_) => replace_values,
                };
                if claimable {
                    self.mark_cell_as_spill_member(cell_ref, anchor);
                }
            }
        }
    }
}
