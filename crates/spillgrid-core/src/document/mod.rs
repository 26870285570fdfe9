//! Workbook model, cell editing, spill serialization and file I/O.

mod io;
mod ops;
mod spill;
mod state;

pub use io::{FileFormat, apply_spill_formula};
pub use spill::{apply, apply_dynamic_array_formula};
pub use state::{DEFAULT_SHEET_NAME, Workbook, Worksheet};
