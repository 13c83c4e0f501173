//! Sheet listing and sheet analysis
//!
//! Values come from calamine, which auto-detects xlsx/xlsm, xlsb, xls and ods.
//! Styles come from the OOXML package when there is one; any other container
//! yields unstyled cells.

use crate::address::cell_address;
use crate::error::{Result, SheetError};
use crate::ooxml::{parse_cell_style_ids, OoxmlError, Package, STYLES_PART};
use crate::stylesheet::{SheetStyles, StyleSheet};
use crate::types::{CellInfo, CellStyle, SheetData};
use calamine::{open_workbook_auto_from_rs, Data, Reader, Sheets};
use std::io::Cursor;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// An uploaded spreadsheet held in memory for the duration of one request
pub struct Workbook {
    bytes: Arc<[u8]>,
    sheets: Sheets<Cursor<Arc<[u8]>>>,
}

impl std::fmt::Debug for Workbook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workbook")
            .field("len", &self.bytes.len())
            .field("sheets", &self.sheets.sheet_names())
            .finish()
    }
}

impl Workbook {
    /// Parse a document from its raw bytes.
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Result<Self> {
        let bytes: Arc<[u8]> = bytes.into();
        let sheets = open_workbook_auto_from_rs(Cursor::new(Arc::clone(&bytes)))?;
        Ok(Self { bytes, sheets })
    }

    /// Sheet names in document order
    #[must_use]
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.sheet_names()
    }

    /// The requested sheet if the workbook has it, otherwise the first sheet.
    ///
    /// A missing or unknown name is not an error.
    pub fn resolve_sheet_name(&self, requested: Option<&str>) -> Result<String> {
        let names = self.sheet_names();
        if let Some(name) = requested.filter(|name| names.iter().any(|n| n == name)) {
            return Ok(name.to_string());
        }

        let first = names.into_iter().next().ok_or(SheetError::NoSheets)?;
        info!("Using default sheet: {}", first);
        Ok(first)
    }

    /// Walk the occupied rectangle of a sheet and collect every non-empty
    /// cell with its text and style.
    pub fn analyze(&mut self, requested: Option<&str>) -> Result<SheetData> {
        info!("Received sheet_name: {:?}", requested);
        debug!("Available sheets: {:?}", self.sheet_names());

        let name = self.resolve_sheet_name(requested)?;
        let range = self
            .sheets
            .worksheet_range(&name)
            .map_err(|e| SheetError::ReadSheet {
                sheet: name.clone(),
                message: e.to_string(),
            })?;

        let Some((start_row, start_col)) = range.start() else {
            info!("Sheet '{}' is empty", name);
            return Ok(SheetData {
                name,
                cells: Vec::new(),
            });
        };
        if let Some((end_row, end_col)) = range.end() {
            info!(
                "Processing sheet: {} (range {}:{})",
                name,
                cell_address(start_row, start_col),
                cell_address(end_row, end_col)
            );
        }

        let styles = self.load_styles(&name);
        let mut cells = Vec::new();

        for (rel_row, rel_col, value) in range.used_cells() {
            let Some(content) = cell_text(value) else {
                continue;
            };
            let row = start_row + rel_row as u32;
            let col = start_col + rel_col as u32;
            let style = styles
                .as_ref()
                .map_or_else(CellStyle::default, |s| s.style_at(row, col));

            cells.push(CellInfo {
                content,
                style,
                address: cell_address(row, col),
            });
        }

        debug!("Sheet '{}': {} non-empty cells", name, cells.len());
        Ok(SheetData { name, cells })
    }

    /// Style metadata for one sheet, or `None` when the document has none
    /// that can be read. Never fails the request.
    fn load_styles(&self, sheet: &str) -> Option<SheetStyles> {
        match self.read_styles(sheet) {
            Ok(styles) => Some(styles),
            Err(e) => {
                warn!("Styles unavailable for sheet '{}': {}", sheet, e);
                None
            }
        }
    }

    fn read_styles(&self, sheet: &str) -> std::result::Result<SheetStyles, OoxmlError> {
        let mut package = Package::open(&self.bytes)?;

        let stylesheet = match package.read_part(STYLES_PART)? {
            Some(xml) => StyleSheet::parse(&xml)?,
            None => {
                debug!("No stylesheet in package; cells use default formatting");
                StyleSheet::default()
            }
        };

        let part = package
            .sheet_part_paths()?
            .remove(sheet)
            .ok_or_else(|| OoxmlError::MissingPart(format!("worksheet for '{sheet}'")))?;
        let sheet_xml = package.require_part(&part)?;
        let cell_formats = parse_cell_style_ids(&sheet_xml, &part)?;

        Ok(SheetStyles::new(stylesheet, cell_formats))
    }
}

/// Printable text of a cell value; `None` for empty cells.
fn cell_text(value: &Data) -> Option<String> {
    let text = match value {
        Data::Empty => return None,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(true) => "True".to_string(),
        Data::Bool(false) => "False".to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            // no whole-day part: a time of day
            Some(d) if dt.as_f64() < 1.0 => d.format("%H:%M:%S").to_string(),
            Some(d) => format_datetime(&d),
            None => dt.as_f64().to_string(),
        },
        Data::Error(e) => e.to_string(),
    };
    Some(text)
}

fn format_datetime(dt: &chrono::NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Sheet names of a document, in document order.
pub fn list_sheets(bytes: impl Into<Arc<[u8]>>) -> Result<Vec<String>> {
    let workbook = Workbook::from_bytes(bytes)?;
    let names = workbook.sheet_names();
    debug!("Workbook declares {} sheets", names.len());
    Ok(names)
}

/// Analyze one sheet of a document, falling back to the first sheet when
/// `sheet_name` is missing or unknown.
pub fn analyze_sheet(bytes: impl Into<Arc<[u8]>>, sheet_name: Option<&str>) -> Result<SheetData> {
    Workbook::from_bytes(bytes)?.analyze(sheet_name)
}
