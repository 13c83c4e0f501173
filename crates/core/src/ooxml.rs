//! OOXML package access for style metadata
//!
//! calamine exposes cell values but not fonts or fills, so the stylesheet and
//! the per-cell style indices are read straight from the zip package.

use crate::address::parse_cell_address;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader as XmlReader;
use std::collections::HashMap;
use std::io::{Cursor, Read as IoRead};
use thiserror::Error;
use zip::result::ZipError;
use zip::ZipArchive;

pub(crate) const WORKBOOK_PART: &str = "xl/workbook.xml";
pub(crate) const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
pub(crate) const STYLES_PART: &str = "xl/styles.xml";

/// Failures reading style metadata from the package. These never fail a
/// request; callers log them and fall back to unstyled cells.
#[derive(Debug, Error)]
pub enum OoxmlError {
    #[error("not an OOXML package: {0}")]
    Zip(#[from] ZipError),

    #[error("malformed XML in {part}: {source}")]
    Xml {
        part: String,
        #[source]
        source: quick_xml::Error,
    },

    #[error("missing package part: {0}")]
    MissingPart(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read-only view over an in-memory xlsx package
pub(crate) struct Package<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
}

impl<'a> Package<'a> {
    pub(crate) fn open(bytes: &'a [u8]) -> Result<Self, OoxmlError> {
        Ok(Self {
            archive: ZipArchive::new(Cursor::new(bytes))?,
        })
    }

    /// Read a part as UTF-8, `Ok(None)` when the part does not exist.
    pub(crate) fn read_part(&mut self, path: &str) -> Result<Option<String>, OoxmlError> {
        let mut file = match self.archive.by_name(path) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut content = String::new();
        file.read_to_string(&mut content)?;
        Ok(Some(content))
    }

    pub(crate) fn require_part(&mut self, path: &str) -> Result<String, OoxmlError> {
        self.read_part(path)?
            .ok_or_else(|| OoxmlError::MissingPart(path.to_string()))
    }

    /// Map sheet name -> worksheet part path via the workbook relationships.
    pub(crate) fn sheet_part_paths(&mut self) -> Result<HashMap<String, String>, OoxmlError> {
        let workbook_xml = self.require_part(WORKBOOK_PART)?;
        let rels_xml = self.require_part(WORKBOOK_RELS_PART)?;

        let sheets = parse_workbook_sheets(&workbook_xml)?;
        let targets = parse_relationship_targets(&rels_xml)?;

        let mut paths = HashMap::with_capacity(sheets.len());
        for (name, rel_id) in sheets {
            if let Some(target) = targets.get(&rel_id) {
                paths.insert(name, join_part_path("xl", target));
            }
        }
        Ok(paths)
    }
}

/// Value of the attribute with the given local name (namespace prefix ignored)
pub(crate) fn attr_value(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == name)
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
}

fn xml_error(part: &str) -> impl FnOnce(quick_xml::Error) -> OoxmlError + '_ {
    move |source| OoxmlError::Xml {
        part: part.to_string(),
        source,
    }
}

/// `(sheet name, relationship id)` pairs in document order
fn parse_workbook_sheets(xml: &str) -> Result<Vec<(String, String)>, OoxmlError> {
    let mut reader = XmlReader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut sheets = Vec::new();

    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(xml_error(WORKBOOK_PART))?
        {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                if let (Some(name), Some(rel_id)) = (attr_value(&e, b"name"), attr_value(&e, b"id"))
                {
                    sheets.push((name, rel_id));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(sheets)
}

fn parse_relationship_targets(xml: &str) -> Result<HashMap<String, String>, OoxmlError> {
    let mut reader = XmlReader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut targets = HashMap::new();

    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(xml_error(WORKBOOK_RELS_PART))?
        {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) = (attr_value(&e, b"Id"), attr_value(&e, b"Target"))
                {
                    targets.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(targets)
}

/// Resolve a relationship target against the directory of its source part.
pub(crate) fn join_part_path(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Style index per 0-based `(row, col)` from a worksheet part.
///
/// Only cells with a non-zero `s` attribute are recorded; everything else
/// uses cell format 0. Cells and rows missing their `r` attribute are placed
/// by position.
pub(crate) fn parse_cell_style_ids(
    xml: &str,
    part: &str,
) -> Result<HashMap<(u32, u32), u32>, OoxmlError> {
    let mut reader = XmlReader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut ids = HashMap::new();

    let mut in_sheet_data = false;
    let mut row: u32 = 0;
    let mut next_row: u32 = 0;
    let mut next_col: u32 = 0;

    loop {
        match reader.read_event_into(&mut buf).map_err(xml_error(part))? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"sheetData" => in_sheet_data = true,
                b"row" if in_sheet_data => {
                    row = attr_value(&e, b"r")
                        .and_then(|r| r.parse::<u32>().ok())
                        .and_then(|r| r.checked_sub(1))
                        .unwrap_or(next_row);
                    next_row = row.saturating_add(1);
                    next_col = 0;
                }
                b"c" if in_sheet_data => {
                    let (cell_row, cell_col) = attr_value(&e, b"r")
                        .and_then(|r| parse_cell_address(&r))
                        .unwrap_or((row, next_col));
                    next_col = cell_col.saturating_add(1);

                    let style_id = attr_value(&e, b"s")
                        .and_then(|s| s.parse::<u32>().ok())
                        .unwrap_or(0);
                    if style_id != 0 {
                        ids.insert((cell_row, cell_col), style_id);
                    }
                }
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == b"sheetData" => in_sheet_data = false,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(ids)
}
