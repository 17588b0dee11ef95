//! # Text Measurement
//!
//! The engine never breaks lines itself. It hands a [`MeasureRequest`] to a
//! [`TextMeasurer`] and works from the returned line geometry. Measurers
//! must be deterministic: the same request always yields the same metrics.
//!
//! All lengths crossing this boundary are device units except the font
//! size, which stays in points and is scaled by the request's resolution.

use serde::{Deserialize, Serialize};

use super::StyledText;
use crate::config::FontFamilies;
use crate::error::{QuireError, Result};
use crate::model::Resolution;
use crate::style::{Alignment, FontFace, FontStyle};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WrapMode {
    /// Break between words only. Overlong words overflow.
    Word,
    /// Break between any two characters.
    Char,
    /// Break between words, falling back to characters.
    #[default]
    WordChar,
}

/// A font resolved to a concrete family.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FontDescription {
    pub family: String,
    /// The generic face the family was resolved from.
    pub face: FontFace,
    /// Size in points.
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
}

impl FontDescription {
    pub fn resolve(font: &FontStyle, families: &FontFamilies) -> Self {
        Self {
            family: families.family(font.face).to_string(),
            face: font.face,
            size: font.size,
            bold: font.bold,
            italic: font.italic,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MeasureRequest<'a> {
    pub font: &'a FontDescription,
    pub text: &'a StyledText,
    /// Wrap width. `None` lays the text out without wrapping.
    pub width: Option<f64>,
    pub wrap: WrapMode,
    /// First-line indent. Negative values indent every line but the first.
    pub indent: f64,
    /// Extra space between consecutive lines.
    pub spacing: f64,
    /// Tab stops from the left text edge.
    pub tabs: &'a [f64],
    pub alignment: Alignment,
    pub resolution: Resolution,
}

/// Geometry of one laid-out line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineMetrics {
    /// Byte offset of the first character on the line.
    pub start: usize,
    /// Byte offset just past the last character on the line.
    pub end: usize,
    pub top: f64,
    pub bottom: f64,
    pub width: f64,
}

impl LineMetrics {
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextMetrics {
    pub lines: Vec<LineMetrics>,
    pub width: f64,
    pub height: f64,
}

impl TextMetrics {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Reject degenerate output: no lines for non-empty text, offsets
    /// outside the text or inside a character, lines that go backwards.
    pub fn validate(&self, text: &str) -> Result<()> {
        if self.lines.is_empty() && !text.is_empty() {
            return Err(QuireError::Measurement(format!(
                "no lines returned for {} bytes of text",
                text.len()
            )));
        }
        if !self.height.is_finite() || !self.width.is_finite() || self.height < 0.0 {
            return Err(QuireError::Measurement(format!(
                "invalid extents {}x{}",
                self.width, self.height
            )));
        }

        let mut previous: Option<&LineMetrics> = None;
        for (n, line) in self.lines.iter().enumerate() {
            if line.start > line.end || line.end > text.len() {
                return Err(QuireError::Measurement(format!(
                    "line {n} spans {}..{} outside a {}-byte text",
                    line.start,
                    line.end,
                    text.len()
                )));
            }
            if !text.is_char_boundary(line.start) || !text.is_char_boundary(line.end) {
                return Err(QuireError::Measurement(format!(
                    "line {n} boundary {}..{} falls inside a character",
                    line.start, line.end
                )));
            }
            if !(line.top.is_finite() && line.bottom.is_finite()) || line.bottom < line.top {
                return Err(QuireError::Measurement(format!(
                    "line {n} has inverted extents {}..{}",
                    line.top, line.bottom
                )));
            }
            if let Some(prev) = previous {
                if line.start <= prev.start || line.top < prev.top {
                    return Err(QuireError::Measurement(format!(
                        "line {n} does not advance past line {}",
                        n - 1
                    )));
                }
            }
            previous = Some(line);
        }
        Ok(())
    }
}

/// The text-measurement service.
pub trait TextMeasurer {
    fn measure(&self, request: &MeasureRequest<'_>) -> Result<TextMetrics>;
}

impl<T: TextMeasurer + ?Sized> TextMeasurer for &T {
    fn measure(&self, request: &MeasureRequest<'_>) -> Result<TextMetrics> {
        (**self).measure(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(start: usize, end: usize, top: f64) -> LineMetrics {
        LineMetrics {
            start,
            end,
            top,
            bottom: top + 10.0,
            width: 5.0,
        }
    }

    fn metrics(lines: Vec<LineMetrics>) -> TextMetrics {
        let height = lines.last().map(|l| l.bottom).unwrap_or(0.0);
        TextMetrics {
            lines,
            width: 5.0,
            height,
        }
    }

    #[test]
    fn accepts_well_formed_lines() {
        let m = metrics(vec![line(0, 6, 0.0), line(6, 11, 10.0)]);
        assert!(m.validate("hello world").is_ok());
        assert!(TextMetrics::default().validate("").is_ok());
    }

    #[test]
    fn rejects_missing_lines() {
        let err = TextMetrics::default().validate("abc").unwrap_err();
        assert!(matches!(err, QuireError::Measurement(_)));
    }

    #[test]
    fn rejects_offsets_past_the_end() {
        assert!(metrics(vec![line(0, 9, 0.0)]).validate("abc").is_err());
    }

    #[test]
    fn rejects_offsets_inside_a_character() {
        assert!(metrics(vec![line(0, 1, 0.0), line(1, 3, 10.0)]).validate("éa").is_err());
    }

    #[test]
    fn rejects_lines_that_go_backwards() {
        let m = metrics(vec![line(0, 3, 0.0), line(0, 3, 10.0)]);
        assert!(m.validate("abc").is_err());
    }
}
