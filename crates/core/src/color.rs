//! Color normalization
//!
//! Spreadsheet documents carry colors in several shapes: packed ARGB hex on a
//! structured color element, `#RRGGBB` strings, `RGB(r,g,b)` strings and bare
//! hex. Everything is reduced to a `#`-prefixed hex string or `None`.
//!
//! Alpha is always dropped, never blended. Hex case is preserved from the
//! source: `FFAABBCC` becomes `#AABBCC` and `ffaabbcc` becomes `#aabbcc`.
//! Only the `RGB(r,g,b)` form produces lowercase output, since its digits are
//! generated here.

use serde::{Deserialize, Serialize};

/// Structured color as stored in the document (`<color>`, `<fgColor>`,
/// `<bgColor>` elements).
///
/// Theme and indexed references are kept for diagnostics only; they do not
/// resolve to a hex value, so such colors normalize to `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColorDescriptor {
    /// Packed hex channels, usually 8-character ARGB
    pub rgb: Option<String>,
    pub theme: Option<u32>,
    pub indexed: Option<u32>,
}

impl ColorDescriptor {
    /// Descriptor holding a packed hex string
    #[must_use]
    pub fn from_rgb(rgb: impl Into<String>) -> Self {
        Self {
            rgb: Some(rgb.into()),
            ..Default::default()
        }
    }
}

/// Input representations accepted by [`normalize_color`], in dispatch order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorSource {
    /// Structured descriptor, checked before any string form
    Descriptor(ColorDescriptor),
    /// Free-form color string
    Text(String),
}

/// Normalize a color value to `#`-prefixed hex.
///
/// Returns `None` for absent or empty input and for anything that fails to
/// parse; this function never errors.
#[must_use]
pub fn normalize_color(source: Option<&ColorSource>) -> Option<String> {
    match source? {
        ColorSource::Descriptor(descriptor) => normalize_descriptor(descriptor),
        ColorSource::Text(text) => normalize_color_str(text),
    }
}

/// Normalize the packed hex channel string of a structured color.
#[must_use]
pub fn normalize_descriptor(descriptor: &ColorDescriptor) -> Option<String> {
    let rgb = descriptor.rgb.as_deref().filter(|s| !s.is_empty())?;
    if rgb.chars().count() == 8 {
        Some(strip_alpha(rgb))
    } else {
        Some(format!("#{rgb}"))
    }
}

/// Normalize a plain color string.
#[must_use]
pub fn normalize_color_str(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    if text.starts_with('#') {
        return Some(text.to_string());
    }
    if text.starts_with("RGB") {
        return parse_rgb_function(text);
    }
    if text.chars().count() == 8 {
        return Some(strip_alpha(text));
    }
    Some(format!("#{text}"))
}

/// `AARRGGBB` -> `#RRGGBB`
fn strip_alpha(argb: &str) -> String {
    let mut out = String::with_capacity(7);
    out.push('#');
    out.extend(argb.chars().skip(2));
    out
}

/// Parse `RGB(r,g,b)` with decimal channels in 0..=255.
fn parse_rgb_function(text: &str) -> Option<String> {
    let inner = text.trim_matches(|c| matches!(c, 'R' | 'G' | 'B' | '(' | ')'));
    let mut channels = inner.split(',').map(|part| part.trim().parse::<u8>());

    let r = channels.next()?.ok()?;
    let g = channels.next()?.ok()?;
    let b = channels.next()?.ok()?;
    if channels.next().is_some() {
        return None;
    }

    Some(format!("#{r:02x}{g:02x}{b:02x}"))
}
