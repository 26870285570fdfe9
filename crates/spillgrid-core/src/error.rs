//! Error types for spillgrid core.

use spillgrid_engine::EngineError;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while editing, applying spill formulas or storing a workbook.
#[derive(Error, Debug)]
pub enum SpillgridError {
    #[error("Invalid cell reference: {0}")]
    InvalidReference(String),

    #[error("Invalid range specification: start_cell must be before end_cell ({start}:{end})")]
    InvalidRange { start: String, end: String },

    #[error("Formula must start with '=': {0:?}")]
    EmptyFormula(String),

    #[error("Sheet '{0}' not found")]
    SheetNotFound(String),

    #[error("Invalid sheet name '{0}'")]
    InvalidSheetName(String),

    #[error("Sheet '{0}' already exists")]
    DuplicateSheet(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid xlsx package: {0}")]
    Xlsx(String),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("No file path set")]
    NoFilePath,
}

impl SpillgridError {
    /// Wrap an I/O error with the operation and path it came from.
    pub fn io(operation: &str, path: &Path, source: std::io::Error) -> Self {
        SpillgridError::Io {
            context: format!("Failed to {} {}", operation, path.display()),
            source,
        }
    }

    /// Attach more context (e.g. the range or sheet being written) to an I/O failure.
    pub fn with_context(self, extra: impl std::fmt::Display) -> Self {
        match self {
            SpillgridError::Io { context, source } => SpillgridError::Io {
                context: format!("{} ({})", context, extra),
                source,
            },
            other => other,
        }
    }
}

impl From<EngineError> for SpillgridError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidReference(r) => SpillgridError::InvalidReference(r),
            EngineError::InvalidRange { start, end } => SpillgridError::InvalidRange { start, end },
            EngineError::EmptyFormula(f) => SpillgridError::EmptyFormula(f),
        }
    }
}

impl From<quick_xml::events::attributes::AttrError> for SpillgridError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        SpillgridError::Xml(err.into())
    }
}

pub type Result<T> = std::result::Result<T, SpillgridError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_errors_map_to_flat_kinds() {
        let err: SpillgridError = EngineError::InvalidRange {
            start: "D5".into(),
            end: "D1".into(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Invalid range specification: start_cell must be before end_cell (D5:D1)"
        );

        let err: SpillgridError = EngineError::InvalidReference("INVALID".into()).into();
        assert!(matches!(err, SpillgridError::InvalidReference(ref r) if r == "INVALID"));
    }

    #[test]
    fn io_context_names_path_and_operation() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = SpillgridError::io("read", Path::new("/tmp/book.xlsx"), source)
            .with_context("Sheet!A1:A5");
        assert_eq!(err.to_string(), "Failed to read /tmp/book.xlsx (Sheet!A1:A5): gone");
    }
}
