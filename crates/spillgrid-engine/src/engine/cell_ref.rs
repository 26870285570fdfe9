//! Cell reference parsing and formatting.
//!
//! Provides bidirectional conversion between spreadsheet-style cell references
//! (e.g., "A1", "F3", "AA100") and zero-indexed column/row coordinates.
//!
//! # Examples
//!
//! ```
//! use spillgrid_engine::engine::CellRef;
//!
//! let cell = CellRef::parse("B3").unwrap();
//! assert_eq!(cell.col, 1); // 0-indexed
//! assert_eq!(cell.row, 2);
//! assert_eq!(cell.to_string(), "B3");
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::error::{EngineError, Result};

/// Number of rows in a SpreadsheetML worksheet.
pub const MAX_ROWS: usize = 1_048_576;
/// Number of columns in a SpreadsheetML worksheet (`XFD`).
pub const MAX_COLS: usize = 16_384;

/// A reference to a cell by column and row indices (0-indexed).
///
/// Row 0 / column 0 is the user's `A1`; use [`CellRef::row_number`] and
/// [`CellRef::col_number`] for the 1-based values a spreadsheet shows.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

fn a1_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?<letters>[A-Z]+)(?<numbers>[0-9]+)$")
            .expect("A1 reference regex must compile")
    })
}

impl CellRef {
    pub fn new(col: usize, row: usize) -> CellRef {
        CellRef { row, col }
    }

    /// Parse a cell reference from spreadsheet notation (e.g., "A1", "b2", "AA10").
    ///
    /// Letters are case-insensitive. Anything else (whitespace, `$`, sheet
    /// prefixes, row 0, cells beyond `XFD1048576`) is rejected.
    pub fn parse(reference: &str) -> Result<CellRef> {
        Self::parse_a1(reference).ok_or_else(|| EngineError::InvalidReference(reference.to_string()))
    }

    fn parse_a1(name: &str) -> Option<CellRef> {
        let upper = name.to_ascii_uppercase();
        let caps = a1_re().captures(&upper)?;
        let letters = &caps["letters"];
        let numbers = &caps["numbers"];

        let mut col_acc = 0usize;
        for c in letters.bytes() {
            let digit = (c - b'A') as usize + 1;
            col_acc = col_acc.checked_mul(26)?.checked_add(digit)?;
        }
        if col_acc > MAX_COLS {
            return None;
        }
        let col = col_acc.checked_sub(1)?;

        let row_number = numbers.parse::<usize>().ok()?;
        if row_number > MAX_ROWS {
            return None;
        }
        let row = row_number.checked_sub(1)?;

        Some(CellRef::new(col, row))
    }

    /// 1-based row number as displayed by a spreadsheet.
    pub fn row_number(&self) -> usize {
        self.row + 1
    }

    /// 1-based column number (`A` = 1).
    pub fn col_number(&self) -> usize {
        self.col + 1
    }

    /// Move by a column/row offset, or `None` if the result leaves the sheet.
    pub fn offset(&self, delta_col: usize, delta_row: usize) -> Option<CellRef> {
        let col = self.col.checked_add(delta_col)?;
        let row = self.row.checked_add(delta_row)?;
        (col < MAX_COLS && row < MAX_ROWS).then_some(CellRef::new(col, row))
    }

    /// Convert column index to spreadsheet-style letters (0 -> A, 25 -> Z, 26 -> AA).
    pub fn col_to_letters(col: usize) -> String {
        let mut result = String::new();
        let mut n = col as u128 + 1;
        while n > 0 {
            n -= 1;
            result.insert(0, (b'A' + (n % 26) as u8) as char);
            n /= 26;
        }
        result
    }
}

impl std::str::FromStr for CellRef {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CellRef::col_to_letters(self.col), self.row + 1)
    }
}
