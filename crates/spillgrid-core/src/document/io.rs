use super::{Workbook, apply_dynamic_array_formula};
use crate::error::{Result, SpillgridError};
use crate::storage::{parse_grd, read_xlsx, write_grd, write_xlsx};
use std::path::{Path, PathBuf};
use tracing::info;

/// Storage format, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Grd,
    Xlsx,
}

impl FileFormat {
    /// `.xlsx` selects SpreadsheetML; `.grd` or no extension selects the text format.
    pub fn from_path(path: &Path) -> Result<FileFormat> {
        match path.extension().and_then(|e| e.to_str()) {
            None => Ok(FileFormat::Grd),
            Some(ext) if ext.eq_ignore_ascii_case("grd") => Ok(FileFormat::Grd),
            Some(ext) if ext.eq_ignore_ascii_case("xlsx") => Ok(FileFormat::Xlsx),
            Some(ext) => Err(SpillgridError::UnsupportedFormat(ext.to_string())),
        }
    }
}

impl Workbook {
    /// Load a workbook, picking the format from the extension.
    pub fn load(path: &Path) -> Result<Workbook> {
        let mut workbook = match FileFormat::from_path(path)? {
            FileFormat::Grd => parse_grd(path)?,
            FileFormat::Xlsx => read_xlsx(path)?,
        };
        workbook.file_path = Some(path.to_path_buf());
        workbook.modified = false;
        info!(path = %path.display(), sheets = workbook.sheets.len(), "loaded workbook");
        Ok(workbook)
    }

    /// Save to `path` and remember it as the workbook's file.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        match FileFormat::from_path(path)? {
            FileFormat::Grd => write_grd(path, self)?,
            FileFormat::Xlsx => write_xlsx(path, self)?,
        }
        self.file_path = Some(path.to_path_buf());
        self.modified = false;
        info!(path = %path.display(), "saved workbook");
        Ok(())
    }

    /// Save to current file path.
    /// Returns the path saved to.
    pub fn save_file(&mut self) -> Result<PathBuf> {
        let Some(path) = self.file_path.clone() else {
            return Err(SpillgridError::NoFilePath);
        };
        self.save(&path)?;
        Ok(path)
    }
}

/// Load the workbook at `path`, apply a dynamic-array formula to `sheet` and save it back.
///
/// I/O failures carry the sheet and range in their message. The file is
/// left untouched when the formula cannot be applied.
pub fn apply_spill_formula(
    path: &Path,
    sheet: &str,
    start: &str,
    end: &str,
    formula: &str,
) -> Result<String> {
    let target = format!("{}!{}:{}", sheet, start, end);
    let mut workbook = Workbook::load(path).map_err(|e| e.with_context(&target))?;
    let message = apply_dynamic_array_formula(&mut workbook, sheet, start, end, formula)?;
    workbook.save(path).map_err(|e| e.with_context(&target))?;
    Ok(message)
}
