//! # Metrics Measurer
//!
//! A deterministic [`TextMeasurer`] built from per-character advance widths
//! and UAX#14 break opportunities. Families registered with real font data
//! use advances parsed by `ttf-parser`; every other family falls back to an
//! approximate advance table for its generic face.
//!
//! Line breaking is greedy: a line ends at the last break opportunity
//! before the character that would overflow it.

use std::collections::{HashMap, HashSet};

use unicode_linebreak::{linebreaks, BreakOpportunity};

use super::measure::{
    FontDescription, LineMetrics, MeasureRequest, TextMeasurer, TextMetrics, WrapMode,
};
use crate::error::{QuireError, Result};
use crate::style::FontFace;

/// Line height of the built-in advance tables, in ems.
const STANDARD_LINE_HEIGHT: f64 = 1.15;

/// Advance widths and vertical metrics of one font.
#[derive(Debug, Clone)]
pub struct FontMetrics {
    pub units_per_em: u16,
    pub advance_widths: HashMap<char, u16>,
    pub default_advance: u16,
    pub ascender: i16,
    pub descender: i16,
    pub line_gap: i16,
}

impl FontMetrics {
    /// Parse metrics from TrueType/OpenType font data.
    pub fn from_font_data(data: &[u8]) -> Result<Self> {
        let face = ttf_parser::Face::parse(data, 0).map_err(|e| QuireError::Font(e.to_string()))?;
        let units_per_em = face.units_per_em();

        let mut advance_widths = HashMap::new();
        for code in 32u32..=0xFFFF {
            if let Some(ch) = char::from_u32(code) {
                if let Some(glyph_id) = face.glyph_index(ch) {
                    advance_widths.insert(ch, face.glyph_hor_advance(glyph_id).unwrap_or(0));
                }
            }
        }
        let default_advance = advance_widths
            .get(&' ')
            .copied()
            .unwrap_or(units_per_em / 2);

        Ok(Self {
            units_per_em,
            advance_widths,
            default_advance,
            ascender: face.ascender(),
            descender: face.descender(),
            line_gap: face.line_gap(),
        })
    }

    /// Advance of `ch` in ems.
    pub fn advance(&self, ch: char) -> f64 {
        let w = self.advance_widths.get(&ch).copied().unwrap_or(self.default_advance);
        w as f64 / self.units_per_em as f64
    }

    /// Line height in ems.
    pub fn line_height(&self) -> f64 {
        (self.ascender as f64 - self.descender as f64 + self.line_gap as f64)
            / self.units_per_em as f64
    }
}

/// Approximate advance of `ch` in ems for a generic face.
fn standard_advance(ch: char, face: FontFace, bold: bool) -> f64 {
    let base = match face {
        FontFace::Monospace => 0.6,
        FontFace::Serif | FontFace::SansSerif => {
            let sans = face == FontFace::SansSerif;
            match ch {
                ' ' => {
                    if sans {
                        0.278
                    } else {
                        0.25
                    }
                }
                'i' | 'j' | 'l' | '.' | ',' | ';' | ':' | '\'' | '|' | '!' => 0.278,
                'f' | 't' | 'r' | 'I' | '(' | ')' | '[' | ']' | '-' => 0.333,
                'm' | 'w' | 'M' | 'W' => 0.833,
                '0'..='9' => {
                    if sans {
                        0.556
                    } else {
                        0.5
                    }
                }
                c if c.is_uppercase() => 0.667,
                _ => {
                    if sans {
                        0.556
                    } else {
                        0.5
                    }
                }
            }
        }
    };
    if bold {
        base * 1.05
    } else {
        base
    }
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct FontKey {
    family: String,
    bold: bool,
    italic: bool,
}

/// Measurer over registered font metrics and built-in advance tables.
#[derive(Debug, Default)]
pub struct MetricsMeasurer {
    fonts: HashMap<FontKey, FontMetrics>,
}

impl MetricsMeasurer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register font data for a family/variant.
    pub fn register_font(
        &mut self,
        family: &str,
        bold: bool,
        italic: bool,
        data: &[u8],
    ) -> Result<()> {
        let metrics = FontMetrics::from_font_data(data)?;
        log::debug!(
            "registered font {family:?} (bold={bold}, italic={italic}) with {} glyph advances",
            metrics.advance_widths.len()
        );
        self.fonts.insert(
            FontKey {
                family: family.to_string(),
                bold,
                italic,
            },
            metrics,
        );
        Ok(())
    }

    fn custom(&self, font: &FontDescription) -> Option<&FontMetrics> {
        let key = FontKey {
            family: font.family.clone(),
            bold: font.bold,
            italic: font.italic,
        };
        self.fonts.get(&key).or_else(|| {
            self.fonts.get(&FontKey {
                family: font.family.clone(),
                bold: false,
                italic: false,
            })
        })
    }
}

impl TextMeasurer for MetricsMeasurer {
    fn measure(&self, request: &MeasureRequest<'_>) -> Result<TextMetrics> {
        let font = request.font;
        if !(font.size.is_finite() && font.size > 0.0) {
            return Err(QuireError::Measurement(format!("invalid font size {}", font.size)));
        }
        let custom = self.custom(font);
        let em_x = request.resolution.pt_to_x(font.size);
        let em_y = request.resolution.pt_to_y(font.size);
        let line_height = em_y * custom.map_or(STANDARD_LINE_HEIGHT, FontMetrics::line_height);
        let advance = |ch: char| -> f64 {
            em_x * match custom {
                Some(m) => m.advance(ch),
                None => standard_advance(ch, font.face, font.bold),
            }
        };

        let breaks = break_lines(request, &advance);

        let mut lines = Vec::with_capacity(breaks.len());
        let mut width: f64 = 0.0;
        for (n, (start, end, w)) in breaks.into_iter().enumerate() {
            let top = n as f64 * (line_height + request.spacing);
            width = width.max(w);
            lines.push(LineMetrics {
                start,
                end,
                top,
                bottom: top + line_height,
                width: w,
            });
        }
        let height = lines.last().map_or(0.0, |l| l.bottom);

        Ok(TextMetrics { lines, width, height })
    }
}

/// Greedy line breaking. Returns `(start, end, width)` per line in bytes.
fn break_lines(
    request: &MeasureRequest<'_>,
    advance: &dyn Fn(char) -> f64,
) -> Vec<(usize, usize, f64)> {
    let text = request.text.as_str();
    if text.is_empty() {
        return vec![(0, 0, 0.0)];
    }

    let mut mandatory = HashSet::new();
    let mut allowed = HashSet::new();
    for (offset, opp) in linebreaks(text) {
        if offset < text.len() {
            match opp {
                BreakOpportunity::Mandatory => mandatory.insert(offset),
                BreakOpportunity::Allowed => allowed.insert(offset),
            };
        }
    }

    let first_inset = request.indent.max(0.0);
    let rest_inset = (-request.indent).max(0.0);
    let limit = |first: bool| {
        request
            .width
            .map(|w| w - if first { first_inset } else { rest_inset })
    };
    let default_tab = 8.0 * advance(' ');
    let next_tab = |x: f64| -> f64 {
        request
            .tabs
            .iter()
            .copied()
            .filter(|&t| t > x)
            .fold(None, |best: Option<f64>, t| Some(best.map_or(t, |b| b.min(t))))
            .unwrap_or_else(|| {
                if default_tab > 0.0 {
                    ((x / default_tab).floor() + 1.0) * default_tab
                } else {
                    x
                }
            })
    };

    let mut lines = Vec::new();
    let mut line_start = 0;
    let mut x = 0.0;
    // Where the current line could end, and its width up to there.
    let mut last_break: Option<(usize, f64)> = None;

    for (offset, ch) in text.char_indices() {
        if offset > line_start && mandatory.contains(&offset) {
            lines.push((line_start, offset, x));
            line_start = offset;
            x = 0.0;
            last_break = None;
        }
        if matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}') {
            continue;
        }
        if offset > line_start && allowed.contains(&offset) {
            last_break = Some((offset, x));
        }

        let w = if ch == '\t' { next_tab(x) - x } else { advance(ch) };

        if let Some(max) = limit(lines.is_empty()) {
            if x + w > max && offset > line_start {
                match (request.wrap, last_break) {
                    (WrapMode::Word | WrapMode::WordChar, Some((at, at_width))) => {
                        lines.push((line_start, at, at_width));
                        line_start = at;
                        x -= at_width;
                        last_break = None;
                    }
                    (WrapMode::Char | WrapMode::WordChar, _) => {
                        lines.push((line_start, offset, x));
                        line_start = offset;
                        x = 0.0;
                        last_break = None;
                    }
                    (WrapMode::Word, None) => {}
                }
            }
        }
        x += w;
    }
    lines.push((line_start, text.len(), x));
    lines
}
