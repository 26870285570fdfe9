//! Spill formula engine API.
//!
//! This module resolves references and prepares dynamic-array formulas for
//! serialization:
//!
//! - [`CellRef`] - Cell reference parsing (A1 notation ↔ row/col indices)
//! - [`CellRange`] - Ordered rectangular ranges
//! - [`function_namespace`] - Compatibility table of future functions
//! - [`rewrite_formula`] - Namespace-prefix function calls for older readers
//! - [`SpillBinding`] - A rewritten formula bound to its anchor and range
//! - [`Cell`], [`CellType`], [`CellValue`], [`Grid`] - Data structures for cell storage

mod cell;
mod cell_ref;
mod compat;
mod range;
mod rewrite;
mod spill;

pub use cell::{Cell, CellType, CellValue, Grid};
pub use cell_ref::{CellRef, MAX_COLS, MAX_ROWS};
pub use compat::{
    FunctionNamespace, XL_FN_PREFIX, XL_WS_PREFIX, compatibility_rules, function_namespace,
};
pub use range::CellRange;
pub use rewrite::{rewrite_formula, strip_namespace_prefixes};
pub use spill::SpillBinding;
