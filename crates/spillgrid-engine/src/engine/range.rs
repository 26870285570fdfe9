//! Rectangular cell ranges.
//!
//! A [`CellRange`] is always ordered: its start is the top-left cell and its
//! end the bottom-right. Construction refuses reversed corners instead of
//! swapping them, so a caller's idea of where a spill starts is never
//! silently changed.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::cell_ref::CellRef;
use crate::error::{EngineError, Result};

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct CellRange {
    start: CellRef,
    end: CellRef,
}

impl CellRange {
    /// Build a range from its top-left and bottom-right cells.
    ///
    /// Fails with [`EngineError::InvalidRange`] when `start` is below or to
    /// the right of `end`. `start == end` is a valid one-cell range.
    pub fn new(start: CellRef, end: CellRef) -> Result<CellRange> {
        if start.row > end.row || start.col > end.col {
            return Err(EngineError::InvalidRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(CellRange { start, end })
    }

    /// Resolve two textual references into a range.
    pub fn from_refs(start: &str, end: &str) -> Result<CellRange> {
        let start = CellRef::parse(start)?;
        let end = CellRef::parse(end)?;
        Self::new(start, end)
    }

    /// Parse `"A1:C3"`; a lone `"A1"` is a one-cell range.
    pub fn parse(text: &str) -> Result<CellRange> {
        match text.split_once(':') {
            Some((start, end)) => Self::from_refs(start, end),
            None => {
                let cell = CellRef::parse(text)?;
                Ok(CellRange {
                    start: cell,
                    end: cell,
                })
            }
        }
    }

    pub fn start(&self) -> CellRef {
        self.start
    }

    pub fn end(&self) -> CellRef {
        self.end
    }

    pub fn height(&self) -> usize {
        self.end.row - self.start.row + 1
    }

    pub fn width(&self) -> usize {
        self.end.col - self.start.col + 1
    }

    pub fn cell_count(&self) -> usize {
        self.width().saturating_mul(self.height())
    }

    pub fn is_single_cell(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, cell: &CellRef) -> bool {
        (self.start.row..=self.end.row).contains(&cell.row)
            && (self.start.col..=self.end.col).contains(&cell.col)
    }

    /// Whether the two ranges share at least one cell.
    pub fn intersects(&self, other: &CellRange) -> bool {
        self.start.row <= other.end.row
            && other.start.row <= self.end.row
            && self.start.col <= other.end.col
            && other.start.col <= self.end.col
    }

    /// Every cell of the range, row by row from the top-left.
    pub fn cells(self) -> impl Iterator<Item = CellRef> {
        let (start, end) = (self.start, self.end);
        (start.row..=end.row)
            .flat_map(move |row| (start.col..=end.col).map(move |col| CellRef::new(col, row)))
    }

    /// Smallest range covering both `self` and `cell`.
    pub fn expand_to(&self, cell: &CellRef) -> CellRange {
        CellRange {
            start: CellRef::new(self.start.col.min(cell.col), self.start.row.min(cell.row)),
            end: CellRef::new(self.end.col.max(cell.col), self.end.row.max(cell.row)),
        }
    }
}

impl std::str::FromStr for CellRange {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(text: &str) -> CellRef {
        CellRef::parse(text).unwrap()
    }

    #[test]
    fn test_dimensions() {
        let range = CellRange::from_refs("A17", "C19").unwrap();
        assert_eq!(range.width(), 3);
        assert_eq!(range.height(), 3);
        assert_eq!(range.cell_count(), 9);
        assert_eq!(range.to_string(), "A17:C19");
    }

    #[test]
    fn test_single_cell_range_is_valid() {
        let range = CellRange::new(cell("D4"), cell("D4")).unwrap();
        assert!(range.is_single_cell());
        assert_eq!(range.cell_count(), 1);
        assert_eq!(range.to_string(), "D4:D4");
    }

    #[test]
    fn test_reversed_corners_are_rejected() {
        let err = CellRange::new(cell("D5"), cell("D1")).unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidRange {
                start: "D5".into(),
                end: "D1".into()
            }
        );
        assert!(CellRange::new(cell("C1"), cell("A3")).is_err());
        assert!(CellRange::new(cell("B2"), cell("A1")).is_err());
    }

    #[test]
    fn test_ordered_pairs_succeed_and_reversed_fail() {
        let refs = ["A1", "B1", "A2", "C7", "AA30"];
        for a in refs {
            for b in refs {
                let (a, b) = (cell(a), cell(b));
                if a.row <= b.row && a.col <= b.col {
                    assert!(CellRange::new(a, b).is_ok());
                    if a != b {
                        assert!(matches!(
                            CellRange::new(b, a),
                            Err(EngineError::InvalidRange { .. })
                        ));
                    }
                }
            }
        }
    }

    #[test]
    fn test_cells_are_row_major() {
        let range = CellRange::parse("A1:B2").unwrap();
        let cells: Vec<String> = range.cells().map(|c| c.to_string()).collect();
        assert_eq!(cells, vec!["A1", "B1", "A2", "B2"]);
    }

    #[test]
    fn test_parse_lone_reference() {
        let range = CellRange::parse("e20").unwrap();
        assert_eq!(range.start(), cell("E20"));
        assert!(range.is_single_cell());
    }

    #[test]
    fn test_parse_propagates_bad_reference() {
        assert_eq!(
            CellRange::parse("A1:INVALID"),
            Err(EngineError::InvalidReference("INVALID".into()))
        );
    }

    #[test]
    fn test_intersects() {
        let range = CellRange::parse("A1:A5").unwrap();
        assert!(range.intersects(&CellRange::parse("A3:B4").unwrap()));
        assert!(range.intersects(&CellRange::parse("A5").unwrap()));
        assert!(!range.intersects(&CellRange::parse("B1:C5").unwrap()));
        assert!(!range.intersects(&CellRange::parse("A6:A9").unwrap()));
    }

    #[test]
    fn test_contains_and_expand() {
        let range = CellRange::parse("F3:F9").unwrap();
        assert!(range.contains(&cell("F3")));
        assert!(range.contains(&cell("F9")));
        assert!(!range.contains(&cell("G3")));
        assert_eq!(range.expand_to(&cell("A1")).to_string(), "A1:F9");
    }
}
