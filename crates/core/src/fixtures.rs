//! Minimal xlsx writer for tests
//!
//! Produces just enough of an OOXML package for calamine to read values and
//! for the style extractor to resolve fonts and fills.

use crate::address::{cell_address, parse_cell_address};
use std::collections::BTreeMap;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Value written into a fixture cell
#[derive(Debug, Clone, PartialEq)]
pub enum FixtureValue {
    Text(String),
    Number(f64),
    Bool(bool),
    /// A formula with its cached numeric result
    Formula { formula: String, cached: f64 },
    /// A styled cell without a value
    Blank,
}

/// Formatting for one `cellXfs` entry
#[derive(Debug, Clone, Default)]
pub struct StyleSpec {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    /// Raw ARGB for the font color
    pub font_rgb: Option<String>,
    /// Theme index for the font color
    pub font_theme: Option<u32>,
    /// `patternType`, e.g. `solid`
    pub fill_pattern: Option<String>,
    /// Raw ARGB for the fill foreground
    pub fill_rgb: Option<String>,
    /// Built-in `numFmtId`, e.g. 14 for dates
    pub num_fmt_id: Option<u32>,
}

#[derive(Debug, Clone, Default)]
struct FixtureSheet {
    name: String,
    cells: BTreeMap<(u32, u32), (FixtureValue, u32)>,
}

/// Builder for an in-memory `.xlsx`
#[derive(Debug, Clone)]
pub struct XlsxBuilder {
    sheets: Vec<FixtureSheet>,
    styles: Vec<StyleSpec>,
    include_styles_part: bool,
}

impl Default for XlsxBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl XlsxBuilder {
    /// Empty workbook with the default cell format at index 0
    #[must_use]
    pub fn new() -> Self {
        Self {
            sheets: Vec::new(),
            styles: vec![StyleSpec {
                font_theme: Some(1),
                ..Default::default()
            }],
            include_styles_part: true,
        }
    }

    /// Register a cell format and return its `cellXfs` index.
    pub fn add_style(&mut self, spec: StyleSpec) -> u32 {
        self.styles.push(spec);
        u32::try_from(self.styles.len() - 1).unwrap_or(u32::MAX)
    }

    /// Append a sheet and return its position.
    pub fn add_sheet(&mut self, name: &str) -> usize {
        self.sheets.push(FixtureSheet {
            name: name.to_string(),
            ..Default::default()
        });
        self.sheets.len() - 1
    }

    /// Set a cell. `style` 0 is the default format.
    ///
    /// # Panics
    /// On an invalid address or unknown sheet; fixtures are test-only.
    pub fn set(&mut self, sheet: usize, address: &str, value: FixtureValue, style: u32) -> &mut Self {
        let pos = parse_cell_address(address).expect("valid fixture address");
        self.sheets[sheet].cells.insert(pos, (value, style));
        self
    }

    pub fn text(&mut self, sheet: usize, address: &str, text: &str) -> &mut Self {
        self.set(sheet, address, FixtureValue::Text(text.to_string()), 0)
    }

    pub fn number(&mut self, sheet: usize, address: &str, value: f64) -> &mut Self {
        self.set(sheet, address, FixtureValue::Number(value), 0)
    }

    /// Leave `xl/styles.xml` out of the package.
    pub fn without_styles_part(&mut self) -> &mut Self {
        self.include_styles_part = false;
        self
    }

    /// Serialize the package.
    ///
    /// # Panics
    /// If writing to the in-memory zip fails.
    #[must_use]
    pub fn build(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();

        let mut parts = vec![
            ("[Content_Types].xml".to_string(), self.content_types_xml()),
            ("_rels/.rels".to_string(), ROOT_RELS.to_string()),
            ("xl/workbook.xml".to_string(), self.workbook_xml()),
            ("xl/_rels/workbook.xml.rels".to_string(), self.workbook_rels_xml()),
        ];
        if self.include_styles_part {
            parts.push(("xl/styles.xml".to_string(), self.styles_xml()));
        }
        for (idx, sheet) in self.sheets.iter().enumerate() {
            parts.push((
                format!("xl/worksheets/sheet{}.xml", idx + 1),
                sheet_xml(sheet),
            ));
        }

        for (name, content) in parts {
            zip.start_file(name, options).expect("start zip entry");
            zip.write_all(content.as_bytes()).expect("write zip entry");
        }

        zip.finish().expect("finish zip").into_inner()
    }

    fn content_types_xml(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
        );
        for idx in 1..=self.sheets.len() {
            xml.push_str(&format!(
                r#"<Override PartName="/xl/worksheets/sheet{idx}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
            ));
        }
        if self.include_styles_part {
            xml.push_str(r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#);
        }
        xml.push_str("</Types>");
        xml
    }

    fn workbook_xml(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#,
        );
        for (idx, sheet) in self.sheets.iter().enumerate() {
            xml.push_str(&format!(
                r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                escape(&sheet.name),
                idx + 1,
                idx + 1
            ));
        }
        xml.push_str("</sheets></workbook>");
        xml
    }

    fn workbook_rels_xml(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for idx in 1..=self.sheets.len() {
            xml.push_str(&format!(
                r#"<Relationship Id="rId{idx}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{idx}.xml"/>"#
            ));
        }
        if self.include_styles_part {
            xml.push_str(&format!(
                r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
                self.sheets.len() + 1
            ));
        }
        xml.push_str("</Relationships>");
        xml
    }

    /// One font and one fill per registered style, plus the two mandatory
    /// leading fills (`none`, `gray125`).
    fn styles_xml(&self) -> String {
        let mut fonts = String::new();
        let mut fills =
            String::from(r#"<fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill>"#);
        let mut xfs = String::new();

        for (idx, spec) in self.styles.iter().enumerate() {
            fonts.push_str("<font>");
            if spec.bold {
                fonts.push_str("<b/>");
            }
            if spec.italic {
                fonts.push_str("<i/>");
            }
            if spec.underline {
                fonts.push_str("<u/>");
            }
            fonts.push_str(r#"<sz val="11"/>"#);
            if let Some(rgb) = &spec.font_rgb {
                fonts.push_str(&format!(r#"<color rgb="{}"/>"#, escape(rgb)));
            } else if let Some(theme) = spec.font_theme {
                fonts.push_str(&format!(r#"<color theme="{theme}"/>"#));
            }
            fonts.push_str(r#"<name val="Calibri"/></font>"#);

            let fill_id = match &spec.fill_pattern {
                Some(pattern) => {
                    fills.push_str(&format!(r#"<fill><patternFill patternType="{}">"#, escape(pattern)));
                    if let Some(rgb) = &spec.fill_rgb {
                        fills.push_str(&format!(r#"<fgColor rgb="{}"/>"#, escape(rgb)));
                    }
                    fills.push_str("</patternFill></fill>");
                    fills.matches("<fill>").count() - 1
                }
                None => 0,
            };

            let num_fmt = match spec.num_fmt_id {
                Some(id) => format!(r#"numFmtId="{id}" applyNumberFormat="1""#),
                None => r#"numFmtId="0""#.to_string(),
            };
            xfs.push_str(&format!(
                r#"<xf {num_fmt} fontId="{idx}" fillId="{fill_id}" borderId="0" xfId="0"/>"#
            ));
        }

        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="{}">{fonts}</fonts><fills count="{}">{fills}</fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="{}">{xfs}</cellXfs><cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles></styleSheet>"#,
            self.styles.len(),
            fills.matches("<fill>").count(),
            self.styles.len()
        )
    }
}

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

fn sheet_xml(sheet: &FixtureSheet) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    );

    if let (Some(first), Some(last)) = (sheet.cells.keys().next(), sheet.cells.keys().next_back()) {
        let min_col = sheet.cells.keys().map(|(_, c)| *c).min().unwrap_or(first.1);
        let max_col = sheet.cells.keys().map(|(_, c)| *c).max().unwrap_or(last.1);
        xml.push_str(&format!(
            r#"<dimension ref="{}:{}"/>"#,
            cell_address(first.0, min_col),
            cell_address(last.0, max_col)
        ));
    }

    xml.push_str("<sheetData>");
    let mut current_row: Option<u32> = None;
    for (&(row, col), (value, style)) in &sheet.cells {
        if current_row != Some(row) {
            if current_row.is_some() {
                xml.push_str("</row>");
            }
            xml.push_str(&format!(r#"<row r="{}">"#, row + 1));
            current_row = Some(row);
        }

        let address = cell_address(row, col);
        let style_attr = if *style == 0 {
            String::new()
        } else {
            format!(r#" s="{style}""#)
        };
        match value {
            FixtureValue::Text(text) => xml.push_str(&format!(
                r#"<c r="{address}"{style_attr} t="inlineStr"><is><t>{}</t></is></c>"#,
                escape(text)
            )),
            FixtureValue::Number(n) => {
                xml.push_str(&format!(r#"<c r="{address}"{style_attr}><v>{n}</v></c>"#));
            }
            FixtureValue::Bool(b) => xml.push_str(&format!(
                r#"<c r="{address}"{style_attr} t="b"><v>{}</v></c>"#,
                u8::from(*b)
            )),
            FixtureValue::Formula { formula, cached } => xml.push_str(&format!(
                r#"<c r="{address}"{style_attr}><f>{}</f><v>{cached}</v></c>"#,
                escape(formula)
            )),
            FixtureValue::Blank => xml.push_str(&format!(r#"<c r="{address}"{style_attr}/>"#)),
        }
    }
    if current_row.is_some() {
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
