//! On-disk workbook formats: the line-based .grd text format and .xlsx.

mod parser;
mod writer;
pub mod xlsx;

pub use parser::{parse_grd, parse_grd_content};
pub use writer::{write_grd, write_grd_content};
pub use xlsx::{read_xlsx, write_xlsx};
