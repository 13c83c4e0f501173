//! Spreadsheet cell content and style extraction
//!
//! Reads an uploaded workbook and produces, for one sheet, every non-empty
//! cell with its text, its A1 address and a CSS-shaped style record
//! (background color, font color, bold, italic, underline).
//!
//! - [`workbook`]: sheet listing and sheet analysis
//! - [`stylesheet`]: font and fill resolution from the workbook stylesheet
//! - [`color`]: color normalization to `#RRGGBB`
//! - [`address`]: A1 addressing helpers

pub mod address;
pub mod color;
pub mod error;
mod ooxml;
pub mod stylesheet;
pub mod types;
pub mod workbook;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use color::{normalize_color, normalize_color_str, ColorDescriptor, ColorSource};
pub use error::{Result, SheetError};
pub use ooxml::OoxmlError;
pub use stylesheet::{CellFormat, FillDescriptor, FontDescriptor, SheetStyles, StyleSheet};
pub use types::{CellInfo, CellStyle, FontStyle, FontWeight, SheetData, TextDecoration};
pub use workbook::{analyze_sheet, list_sheets, Workbook};
