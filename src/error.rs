use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, BulletinError>;

/// Error type covering the different failure cases that can occur when a
/// grade workbook is loaded, transformed, or exported.
///
/// Structural problems (files, sheets, layout) abort a load. Problems with
/// individual cells never show up here: they become undefined scores.
#[derive(Debug, Error)]
pub enum BulletinError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the spreadsheet reader (unreadable file,
    /// unrecognized format, corrupt sheet).
    #[error("spreadsheet read error: {0}")]
    ExcelRead(#[from] calamine::Error),

    /// Raised when the workbook lacks a sheet named by the layout.
    #[error("missing sheet '{0}'")]
    MissingSheet(String),

    /// Raised when a period sheet has no test label at the header origin.
    #[error("sheet '{0}' has no test in its header row")]
    EmptyHeader(String),

    /// Raised when two students share the same name.
    #[error("student '{name}' is listed more than once in sheet '{sheet}'")]
    DuplicateStudent { sheet: String, name: String },

    /// Raised when a period declares the same test label twice.
    #[error("test '{test}' appears more than once in sheet '{sheet}'")]
    DuplicateTest { sheet: String, test: String },

    /// Raised when the layout is inconsistent (date boundaries, offsets).
    #[error("invalid layout: {0}")]
    Configuration(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when an export format cannot be derived or is not supported.
    #[error("unsupported output format '{0}'")]
    UnsupportedFormat(String),

    /// Raised when a view is requested for a student absent from the table.
    #[error("unknown student '{0}'")]
    UnknownStudent(String),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
