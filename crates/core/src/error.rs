//! Error types for workbook reading.
//!
//! Only failures that make the whole document unusable are errors. Problems
//! confined to one cell's formatting or one color value are absorbed by the
//! style extractor and never reach this type.

use thiserror::Error;

/// Errors raised while opening or walking a workbook
#[derive(Debug, Error)]
pub enum SheetError {
    /// The uploaded bytes are not a spreadsheet any reader understands
    #[error("Failed to open workbook: {0}")]
    Open(String),

    /// The document parsed but declares no worksheets
    #[error("Workbook contains no sheets")]
    NoSheets,

    /// A worksheet listed in the workbook index could not be read
    #[error("Failed to read sheet '{sheet}': {message}")]
    ReadSheet { sheet: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<calamine::Error> for SheetError {
    fn from(err: calamine::Error) -> Self {
        SheetError::Open(err.to_string())
    }
}

/// Result type for workbook operations
pub type Result<T> = std::result::Result<T, SheetError>;
