use crate::error::{Result, SpillgridError};
use spillgrid_engine::engine::Grid;
use std::path::PathBuf;

/// Name given to the sheet of a fresh workbook.
pub const DEFAULT_SHEET_NAME: &str = "Sheet";

/// Longest sheet name a SpreadsheetML reader accepts.
const MAX_SHEET_NAME_LEN: usize = 31;

/// A named worksheet: sparse cell storage.
#[derive(Debug, Clone)]
pub struct Worksheet {
    pub(crate) name: String,
    /// The worksheet grid (sparse; empty cells are absent)
    pub grid: Grid,
}

impl Worksheet {
    pub fn new(name: &str) -> Self {
        Worksheet {
            name: name.to_string(),
            grid: Grid::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// UI-agnostic in-memory workbook.
///
/// Mutations take `&mut self`; callers sharing a workbook across threads must
/// serialize access themselves.
#[derive(Debug, Clone)]
pub struct Workbook {
    /// Worksheets in tab order
    pub sheets: Vec<Worksheet>,
    /// Path the workbook was loaded from or last saved to
    pub file_path: Option<PathBuf>,
    /// Whether the workbook has unsaved changes
    pub modified: bool,
}

impl Workbook {
    /// Create a workbook with a single empty sheet named [`DEFAULT_SHEET_NAME`].
    ///
    /// This constructor is side-effect free: it does not touch the filesystem.
    pub fn new() -> Self {
        Workbook {
            sheets: vec![Worksheet::new(DEFAULT_SHEET_NAME)],
            file_path: None,
            modified: false,
        }
    }

    /// A workbook without sheets, for loaders to fill.
    pub(crate) fn empty() -> Self {
        Workbook {
            sheets: Vec::new(),
            file_path: None,
            modified: false,
        }
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn has_sheet(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.sheets.iter().position(|s| s.name == name)
    }

    /// The first sheet, which spreadsheet applications open by default.
    pub fn active_sheet(&self) -> Option<&Worksheet> {
        self.sheets.first()
    }

    pub fn sheet(&self, name: &str) -> Result<&Worksheet> {
        self.position(name)
            .map(|idx| &self.sheets[idx])
            .ok_or_else(|| SpillgridError::SheetNotFound(name.to_string()))
    }

    /// Mutable access to a sheet. Marks the workbook as modified.
    pub fn sheet_mut(&mut self, name: &str) -> Result<&mut Worksheet> {
        let idx = self
            .position(name)
            .ok_or_else(|| SpillgridError::SheetNotFound(name.to_string()))?;
        self.modified = true;
        Ok(&mut self.sheets[idx])
    }

    /// Append a new empty sheet.
    ///
    /// Names are compared case-insensitively for duplicates, as spreadsheet
    /// applications do.
    pub fn create_sheet(&mut self, name: &str) -> Result<&mut Worksheet> {
        validate_sheet_name(name)?;
        if self
            .sheets
            .iter()
            .any(|s| s.name.to_lowercase() == name.to_lowercase())
        {
            return Err(SpillgridError::DuplicateSheet(name.to_string()));
        }
        self.sheets.push(Worksheet::new(name));
        self.modified = true;
        let idx = self.sheets.len() - 1;
        Ok(&mut self.sheets[idx])
    }

    /// The sheet called `name`, created when missing.
    ///
    /// An existing sheet whose name differs only in case is reused, matching
    /// the duplicate rule of [`Workbook::create_sheet`].
    pub fn get_or_create_sheet(&mut self, name: &str) -> Result<&mut Worksheet> {
        let existing = self.position(name).or_else(|| {
            self.sheets
                .iter()
                .position(|s| s.name.to_lowercase() == name.to_lowercase())
        });
        match existing {
            Some(idx) => {
                self.modified = true;
                Ok(&mut self.sheets[idx])
            }
            None => self.create_sheet(name),
        }
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_sheet_name(name: &str) -> Result<()> {
    let invalid = name.trim().is_empty()
        || name.chars().count() > MAX_SHEET_NAME_LEN
        || name.starts_with('\'')
        || name.ends_with('\'')
        || name
            .chars()
            .any(|c| matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'));
    if invalid {
        return Err(SpillgridError::InvalidSheetName(name.to_string()));
    }
    Ok(())
}
