//! SpreadsheetML (.xlsx) package support.
//!
//! Only the parts needed to carry cell values, formulas and dynamic-array
//! anchors are written. Array anchors are emitted as `<f t="array" ref=..>`
//! cells pointing at the `XLDAPR` cell-metadata record in `xl/metadata.xml`,
//! which is what marks them as spilling rather than legacy CSE arrays.
//! Spill members are not stored; readers rebuild them from `ref`.

mod reader;
mod writer;

pub use reader::{read_xlsx, read_xlsx_from};
pub use writer::{write_xlsx, write_xlsx_to};

pub(crate) const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
pub(crate) const NS_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub(crate) const NS_PACKAGE_REL: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships";

pub(crate) const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub(crate) const REL_WORKSHEET: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
pub(crate) const REL_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
pub(crate) const REL_SHEET_METADATA: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/sheetMetadata";

pub(crate) const WORKBOOK_PART: &str = "xl/workbook.xml";
pub(crate) const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
pub(crate) const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";
pub(crate) const METADATA_PART: &str = "xl/metadata.xml";

/// Largest uncompressed part the reader will inflate.
pub(crate) const MAX_PART_BYTES: u64 = 256 * 1024 * 1024;
