//! Cell data structures for the spreadsheet grid.
//!
//! This module provides the data types for representing cells:
//! - [`CellValue`] - A plain value a caller can write (text, number, boolean)
//! - [`CellType`] - Everything a cell can hold, including array anchors and spill members
//! - [`Cell`] - A cell in a worksheet
//! - [`Grid`] - Sparse storage for cells (backed by `DashMap`)

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::cell_ref::CellRef;
use super::range::CellRange;

/// A plain value written by a caller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    /// Parse user input into a value.
    /// - Empty string or whitespace -> Empty
    /// - Quoted string -> Text (without quotes)
    /// - Valid number -> Number
    /// - TRUE / FALSE (any case) -> Bool
    /// - Otherwise -> Text
    pub fn from_input(input: &str) -> CellValue {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return CellValue::Empty;
        }

        if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
            return CellValue::Text(trimmed[1..trimmed.len() - 1].to_string());
        }

        if let Ok(n) = trimmed.parse::<f64>() {
            if n.is_finite() {
                return CellValue::Number(n);
            }
        }

        if trimmed.eq_ignore_ascii_case("true") {
            return CellValue::Bool(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return CellValue::Bool(false);
        }

        CellValue::Text(trimmed.to_string())
    }
}

impl From<&str> for CellValue {
    fn from(text: &str) -> Self {
        CellValue::Text(text.to_string())
    }
}

impl From<String> for CellValue {
    fn from(text: String) -> Self {
        CellValue::Text(text)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

/// The type of content stored in a cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CellType {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// An ordinary formula, leading `=` included.
    Formula(String),
    /// Top-left cell of a dynamic array; its result spills over `range`.
    ArrayAnchor { formula: String, range: CellRange },
    /// A cell whose value is produced by the array formula at `anchor`.
    SpillMember { anchor: CellRef },
}

/// A cell in a worksheet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub contents: CellType,
}

impl Cell {
    pub fn new_empty() -> Cell {
        Cell {
            contents: CellType::Empty,
        }
    }

    pub fn new_text(text: &str) -> Cell {
        Cell {
            contents: CellType::Text(text.to_string()),
        }
    }

    pub fn new_number(n: f64) -> Cell {
        Cell {
            contents: CellType::Number(n),
        }
    }

    pub fn new_bool(b: bool) -> Cell {
        Cell {
            contents: CellType::Bool(b),
        }
    }

    /// Create a formula cell. A missing leading `=` is added.
    pub fn new_formula(formula: &str) -> Cell {
        let formula = formula.trim();
        let formula = if formula.starts_with('=') {
            formula.to_string()
        } else {
            format!("={}", formula)
        };
        Cell {
            contents: CellType::Formula(formula),
        }
    }

    pub fn new_array_anchor(formula: &str, range: CellRange) -> Cell {
        Cell {
            contents: CellType::ArrayAnchor {
                formula: formula.to_string(),
                range,
            },
        }
    }

    pub fn new_spill_member(anchor: CellRef) -> Cell {
        Cell {
            contents: CellType::SpillMember { anchor },
        }
    }

    /// Parse user input and create appropriate cell type.
    /// A leading `=` makes a formula; everything else follows [`CellValue::from_input`].
    pub fn from_input(input: &str) -> Cell {
        let trimmed = input.trim();
        if trimmed.starts_with('=') {
            return Cell::new_formula(trimmed);
        }
        Cell::from(CellValue::from_input(trimmed))
    }

    /// Formula text carried by this cell. Spill members never carry any.
    pub fn formula_text(&self) -> Option<&str> {
        match &self.contents {
            CellType::Formula(f) | CellType::ArrayAnchor { formula: f, .. } => Some(f),
            _ => None,
        }
    }

    /// Anchor of the array formula this cell belongs to, if any.
    pub fn spill_anchor(&self) -> Option<CellRef> {
        match self.contents {
            CellType::SpillMember { anchor } => Some(anchor),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.contents, CellType::Empty)
    }
}

impl From<CellValue> for Cell {
    fn from(value: CellValue) -> Self {
        let contents = match value {
            CellValue::Empty => CellType::Empty,
            CellValue::Text(s) => CellType::Text(s),
            CellValue::Number(n) => CellType::Number(n),
            CellValue::Bool(b) => CellType::Bool(b),
        };
        Cell { contents }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.contents {
            CellType::Empty => Ok(()),
            CellType::Text(s) => write!(f, "{:?}", s),
            CellType::Number(n) => write!(f, "{}", n),
            CellType::Bool(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            CellType::Formula(s) => f.write_str(s),
            CellType::ArrayAnchor { formula, range } => write!(f, "{{{}}} {}", range, formula),
            CellType::SpillMember { anchor } => write!(f, "~{}", anchor),
        }
    }
}

/// Sparse grid storage.
pub type Grid = DashMap<CellRef, Cell>;
