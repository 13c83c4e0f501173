//! Data model returned to clients
//!
//! Every value here is built fresh per request from the parsed document and
//! dropped once the response is serialized.

use serde::{Deserialize, Serialize};
use std::fmt::Write as FmtWrite;

/// Font weight flag
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Bold,
}

/// Font style flag
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    Italic,
}

/// Text decoration flag
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TextDecoration {
    Underline,
}

impl FontWeight {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            FontWeight::Bold => "bold",
        }
    }
}

impl FontStyle {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            FontStyle::Italic => "italic",
        }
    }
}

impl TextDecoration {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TextDecoration::Underline => "underline",
        }
    }
}

/// Visual style of one cell, shaped like the CSS properties a front end
/// applies directly. Fields are independent; absent fields serialize as `null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CellStyle {
    /// Solid fill color as `#RRGGBB`
    pub background_color: Option<String>,
    /// Font color as `#RRGGBB`
    pub color: Option<String>,
    pub font_weight: Option<FontWeight>,
    pub font_style: Option<FontStyle>,
    pub text_decoration: Option<TextDecoration>,
}

impl CellStyle {
    /// True when no style field is set
    #[must_use]
    pub fn is_plain(&self) -> bool {
        self == &Self::default()
    }

    /// Present fields as `(key, value)` pairs in serialization order
    #[must_use]
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        let mut out = Vec::with_capacity(5);
        if let Some(bg) = &self.background_color {
            out.push(("backgroundColor", bg.as_str()));
        }
        if let Some(color) = &self.color {
            out.push(("color", color.as_str()));
        }
        if let Some(weight) = self.font_weight {
            out.push(("fontWeight", weight.as_str()));
        }
        if let Some(style) = self.font_style {
            out.push(("fontStyle", style.as_str()));
        }
        if let Some(decoration) = self.text_decoration {
            out.push(("textDecoration", decoration.as_str()));
        }
        out
    }
}

/// One non-empty cell
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CellInfo {
    /// Cell value rendered as text
    pub content: String,
    pub style: CellStyle,
    /// A1-style address, e.g. `B7`
    pub address: String,
}

/// A sheet's non-empty cells in row-major order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SheetData {
    pub name: String,
    pub cells: Vec<CellInfo>,
}

impl SheetData {
    /// Render the sheet as a Markdown table of address, content and styles.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut markdown = format!("# Sheet: {}\n\n", self.name);
        markdown.push_str("| Cell | Content | Styles |\n");
        markdown.push_str("|------|---------|--------|\n");

        for cell in &self.cells {
            let entries = cell.style.entries();
            let styles = if entries.is_empty() {
                "None".to_string()
            } else {
                entries
                    .iter()
                    .map(|(key, value)| format!("{key}: {value}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            let _ = writeln!(
                markdown,
                "| {} | {} | {} |",
                cell.address, cell.content, styles
            );
        }

        markdown
    }
}
