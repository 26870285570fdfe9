//! spillgrid-core - workbook model, dynamic-array spill serialization and storage.

pub mod document;
pub mod error;
pub mod storage;

pub use document::{
    DEFAULT_SHEET_NAME, FileFormat, Workbook, Worksheet, apply, apply_dynamic_array_formula,
    apply_spill_formula,
};
pub use error::{Result, SpillgridError};

pub use spillgrid_engine::engine::{Cell, CellRange, CellRef, CellType, CellValue, SpillBinding};
