//! Style extraction from the workbook stylesheet
//!
//! Only the parts needed for a visual facsimile are read: font toggles, font
//! color and solid fill color. A cell points at an entry of `cellXfs`, which in
//! turn points at a font and a fill by index.

use crate::color::{normalize_descriptor, ColorDescriptor};
use crate::ooxml::{attr_value, OoxmlError, STYLES_PART};
use crate::types::{CellStyle, FontStyle, FontWeight, TextDecoration};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader as XmlReader;
use std::collections::HashMap;
use tracing::debug;

/// Font entry from `<fonts>`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontDescriptor {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub color: Option<ColorDescriptor>,
}

/// Fill entry from `<fills>`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillDescriptor {
    /// `patternType` of the pattern fill; `None` for gradient fills
    pub pattern: Option<String>,
    pub fg_color: Option<ColorDescriptor>,
}

impl FillDescriptor {
    fn is_solid(&self) -> bool {
        self.pattern.as_deref() == Some("solid")
    }
}

/// Entry from `<cellXfs>`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellFormat {
    pub font_id: usize,
    pub fill_id: usize,
}

/// Parsed stylesheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSheet {
    pub fonts: Vec<FontDescriptor>,
    pub fills: Vec<FillDescriptor>,
    pub cell_formats: Vec<CellFormat>,
}

impl StyleSheet {
    /// Parse `xl/styles.xml`.
    pub fn parse(xml: &str) -> Result<Self, OoxmlError> {
        let mut reader = XmlReader::from_str(xml);
        reader.trim_text(true);
        let mut buf = Vec::new();
        let mut parser = StyleSheetParser::default();
        let mut stack: Vec<Vec<u8>> = Vec::new();

        loop {
            let event = reader
                .read_event_into(&mut buf)
                .map_err(|source| OoxmlError::Xml {
                    part: STYLES_PART.to_string(),
                    source,
                })?;
            match event {
                Event::Start(e) => {
                    let name = e.local_name().as_ref().to_vec();
                    parser.open(stack.last().map(Vec::as_slice), &name, &e, false);
                    stack.push(name);
                }
                Event::Empty(e) => {
                    let name = e.local_name().as_ref().to_vec();
                    parser.open(stack.last().map(Vec::as_slice), &name, &e, true);
                }
                Event::End(_) => {
                    if let Some(name) = stack.pop() {
                        parser.close(stack.last().map(Vec::as_slice), &name);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(parser.sheet)
    }

    /// Resolve the visual style for a `cellXfs` index.
    ///
    /// Dangling indices degrade to an unstyled result for the affected part.
    #[must_use]
    pub fn cell_style(&self, xf_index: u32) -> CellStyle {
        let mut style = CellStyle::default();
        let Some(format) = self.cell_formats.get(xf_index as usize) else {
            if xf_index != 0 {
                debug!("Cell format {} not found in stylesheet", xf_index);
            }
            return style;
        };

        match self.fonts.get(format.font_id) {
            Some(font) => apply_font(font, &mut style),
            None => debug!(
                "Font {} referenced by cell format {} not found",
                format.font_id, xf_index
            ),
        }

        match self.fills.get(format.fill_id) {
            Some(fill) => apply_fill(fill, &mut style),
            None => debug!(
                "Fill {} referenced by cell format {} not found",
                format.fill_id, xf_index
            ),
        }

        style
    }
}

fn apply_font(font: &FontDescriptor, style: &mut CellStyle) {
    style.font_weight = font.bold.then_some(FontWeight::Bold);
    style.font_style = font.italic.then_some(FontStyle::Italic);
    style.text_decoration = font.underline.then_some(TextDecoration::Underline);
    style.color = font.color.as_ref().and_then(normalize_descriptor);
}

fn apply_fill(fill: &FillDescriptor, style: &mut CellStyle) {
    if fill.is_solid() {
        style.background_color = fill.fg_color.as_ref().and_then(normalize_descriptor);
    }
}

/// Styles for every cell of one sheet
#[derive(Debug, Clone, Default)]
pub struct SheetStyles {
    stylesheet: StyleSheet,
    cell_formats: HashMap<(u32, u32), u32>,
}

impl SheetStyles {
    #[must_use]
    pub fn new(stylesheet: StyleSheet, cell_formats: HashMap<(u32, u32), u32>) -> Self {
        Self {
            stylesheet,
            cell_formats,
        }
    }

    /// Style of the cell at 0-based `(row, col)`
    #[must_use]
    pub fn style_at(&self, row: u32, col: u32) -> CellStyle {
        let xf_index = self.cell_formats.get(&(row, col)).copied().unwrap_or(0);
        self.stylesheet.cell_style(xf_index)
    }
}

#[derive(Default)]
struct StyleSheetParser {
    sheet: StyleSheet,
    font: Option<FontDescriptor>,
    fill: Option<FillDescriptor>,
}

impl StyleSheetParser {
    fn open(&mut self, parent: Option<&[u8]>, name: &[u8], e: &BytesStart<'_>, empty: bool) {
        match (parent, name) {
            (Some(b"fonts"), b"font") => {
                self.font = Some(FontDescriptor::default());
                if empty {
                    self.close(parent, name);
                }
            }
            (Some(b"font"), _) => {
                let Some(font) = self.font.as_mut() else {
                    return;
                };
                match name {
                    b"b" => font.bold = toggle(e),
                    b"i" => font.italic = toggle(e),
                    b"u" => font.underline = underline(e),
                    b"color" => font.color = Some(color_descriptor(e)),
                    _ => {}
                }
            }
            (Some(b"fills"), b"fill") => {
                self.fill = Some(FillDescriptor::default());
                if empty {
                    self.close(parent, name);
                }
            }
            (Some(b"fill"), b"patternFill") => {
                if let Some(fill) = self.fill.as_mut() {
                    fill.pattern = attr_value(e, b"patternType");
                }
            }
            (Some(b"patternFill"), b"fgColor") => {
                if let Some(fill) = self.fill.as_mut() {
                    fill.fg_color = Some(color_descriptor(e));
                }
            }
            (Some(b"cellXfs"), b"xf") => {
                self.sheet.cell_formats.push(CellFormat {
                    font_id: index_attr(e, b"fontId"),
                    fill_id: index_attr(e, b"fillId"),
                });
            }
            _ => {}
        }
    }

    fn close(&mut self, parent: Option<&[u8]>, name: &[u8]) {
        match (parent, name) {
            (Some(b"fonts"), b"font") => {
                if let Some(font) = self.font.take() {
                    self.sheet.fonts.push(font);
                }
            }
            (Some(b"fills"), b"fill") => {
                if let Some(fill) = self.fill.take() {
                    self.sheet.fills.push(fill);
                }
            }
            _ => {}
        }
    }
}

/// `<b/>` is on, `<b val="0"/>` and `<b val="false"/>` are off
fn toggle(e: &BytesStart<'_>) -> bool {
    !matches!(attr_value(e, b"val").as_deref(), Some("0" | "false"))
}

/// `<u/>` means single underline, `<u val="none"/>` means none
fn underline(e: &BytesStart<'_>) -> bool {
    attr_value(e, b"val").as_deref() != Some("none")
}

fn index_attr(e: &BytesStart<'_>, name: &[u8]) -> usize {
    attr_value(e, name)
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0)
}

fn color_descriptor(e: &BytesStart<'_>) -> ColorDescriptor {
    ColorDescriptor {
        rgb: attr_value(e, b"rgb"),
        theme: attr_value(e, b"theme").and_then(|v| v.parse().ok()),
        indexed: attr_value(e, b"indexed").and_then(|v| v.parse().ok()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <fonts count="4">
    <font><sz val="11"/><color theme="1"/><name val="Calibri"/></font>
    <font><b/><sz val="11"/><color rgb="FFFF0000"/><name val="Calibri"/></font>
    <font><b val="0"/><i/><u val="double"/><name val="Arial"/></font>
    <font><i val="false"/><u val="none"/></font>
  </fonts>
  <fills count="4">
    <fill><patternFill patternType="none"/></fill>
    <fill><patternFill patternType="gray125"/></fill>
    <fill><patternFill patternType="solid"><fgColor rgb="FF00FF00"/><bgColor indexed="64"/></patternFill></fill>
    <fill><patternFill patternType="darkGrid"><fgColor rgb="FF0000FF"/></patternFill></fill>
  </fills>
  <cellStyleXfs count="1"><xf numFmtId="0" fontId="1" fillId="2"/></cellStyleXfs>
  <cellXfs count="5">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
    <xf numFmtId="0" fontId="1" fillId="2" borderId="0" xfId="0" applyFont="1" applyFill="1"/>
    <xf numFmtId="0" fontId="2" fillId="3" borderId="0" xfId="0"/>
    <xf numFmtId="0" fontId="3" fillId="9" borderId="0" xfId="0"/>
    <xf numFmtId="0" fontId="7" fillId="2" borderId="0" xfId="0"/>
  </cellXfs>
  <dxfs count="1">
    <dxf><font><b/></font><fill><patternFill patternType="solid"><fgColor rgb="FF123456"/></patternFill></fill></dxf>
  </dxfs>
</styleSheet>"#;

    #[test]
    fn test_parse_collections() {
        let sheet = StyleSheet::parse(STYLES).unwrap();
        // dxf font/fill and cellStyleXfs entries are not counted
        assert_eq!(sheet.fonts.len(), 4);
        assert_eq!(sheet.fills.len(), 4);
        assert_eq!(sheet.cell_formats.len(), 5);
        assert_eq!(
            sheet.cell_formats[1],
            CellFormat {
                font_id: 1,
                fill_id: 2
            }
        );
    }

    #[test]
    fn test_font_descriptors() {
        let sheet = StyleSheet::parse(STYLES).unwrap();
        assert_eq!(
            sheet.fonts[0].color,
            Some(ColorDescriptor {
                theme: Some(1),
                ..Default::default()
            })
        );
        assert!(sheet.fonts[1].bold);
        assert!(!sheet.fonts[2].bold);
        assert!(sheet.fonts[2].italic);
        assert!(sheet.fonts[2].underline);
        assert!(!sheet.fonts[3].italic);
        assert!(!sheet.fonts[3].underline);
    }

    #[test]
    fn test_default_format_is_plain() {
        let sheet = StyleSheet::parse(STYLES).unwrap();
        // theme font color has no packed hex and stays absent
        assert_eq!(sheet.cell_style(0), CellStyle::default());
    }

    #[test]
    fn test_bold_red_on_green() {
        let sheet = StyleSheet::parse(STYLES).unwrap();
        let style = sheet.cell_style(1);
        assert_eq!(style.font_weight, Some(FontWeight::Bold));
        assert_eq!(style.color.as_deref(), Some("#FF0000"));
        assert_eq!(style.background_color.as_deref(), Some("#00FF00"));
        assert_eq!(style.font_style, None);
        assert_eq!(style.text_decoration, None);
    }

    #[test]
    fn test_non_solid_pattern_has_no_background() {
        let sheet = StyleSheet::parse(STYLES).unwrap();
        let style = sheet.cell_style(2);
        assert_eq!(style.background_color, None);
        assert_eq!(style.font_style, Some(FontStyle::Italic));
        assert_eq!(style.text_decoration, Some(TextDecoration::Underline));
        assert_eq!(style.font_weight, None);
    }

    #[test]
    fn test_dangling_indices_degrade() {
        let sheet = StyleSheet::parse(STYLES).unwrap();

        // fill 9 does not exist
        let style = sheet.cell_style(3);
        assert_eq!(style, CellStyle::default());

        // font 7 does not exist; fill part still applies
        let style = sheet.cell_style(4);
        assert_eq!(style.font_weight, None);
        assert_eq!(style.background_color.as_deref(), Some("#00FF00"));

        assert_eq!(sheet.cell_style(42), CellStyle::default());
    }

    #[test]
    fn test_solid_fill_without_fg_color() {
        let xml = r#"<styleSheet>
            <fonts><font/></fonts>
            <fills><fill><patternFill patternType="solid"/></fill></fills>
            <cellXfs><xf fontId="0" fillId="0"/></cellXfs>
        </styleSheet>"#;
        let sheet = StyleSheet::parse(xml).unwrap();
        assert_eq!(sheet.fonts.len(), 1);
        assert_eq!(sheet.cell_style(0).background_color, None);
    }

    #[test]
    fn test_gradient_fill_has_no_background() {
        let xml = r#"<styleSheet>
            <fonts><font/></fonts>
            <fills><fill><gradientFill degree="90"><stop position="0"><color rgb="FFFF0000"/></stop></gradientFill></fill></fills>
            <cellXfs><xf/></cellXfs>
        </styleSheet>"#;
        let sheet = StyleSheet::parse(xml).unwrap();
        assert_eq!(sheet.fills[0].pattern, None);
        assert_eq!(sheet.cell_style(0), CellStyle::default());
    }

    #[test]
    fn test_malformed_stylesheet() {
        let err = StyleSheet::parse("<styleSheet><fonts></fills></styleSheet>").unwrap_err();
        assert!(matches!(err, OoxmlError::Xml { .. }));
    }

    #[test]
    fn test_sheet_styles_lookup() {
        let sheet = StyleSheet::parse(STYLES).unwrap();
        let styles = SheetStyles::new(sheet, HashMap::from([((0, 0), 1)]));
        assert_eq!(styles.style_at(0, 0).font_weight, Some(FontWeight::Bold));
        assert!(styles.style_at(5, 5).is_plain());
    }
}
