//! # Style System
//!
//! Immutable style records for the element types of the document tree.
//!
//! Physical lengths (margins, padding, indents, tab stops, frame sizes) are
//! stored in centimetres and font sizes in points, the way a report author
//! thinks about them. They are only converted into device units by the
//! layout engine, using the [`Resolution`](crate::model::Resolution) of the
//! target page.

pub mod sheet;

pub use sheet::StyleSheet;

use serde::{Deserialize, Serialize};

/// An RGB color with components in 0.0 - 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };
    /// Drop shadow color used behind shadowed boxes.
    pub const SHADOW: Color = Color {
        r: 192.0 / 255.0,
        g: 192.0 / 255.0,
        b: 192.0 / 255.0,
    };

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Build a color from 0-255 components.
    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
        }
    }

    pub fn hex(hex: &str) -> Self {
        let hex = hex.trim_start_matches('#');
        let (r, g, b) = match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).unwrap_or(0);
                let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).unwrap_or(0);
                let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).unwrap_or(0);
                (r, g, b)
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0);
                let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0);
                let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0);
                (r, g, b)
            }
            _ => (0, 0, 0),
        };
        Self::rgb8(r, g, b)
    }
}

/// Generic type faces. Resolved to a concrete family through
/// [`FontFamilies`](crate::config::FontFamilies).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFace {
    #[default]
    Serif,
    SansSerif,
    Monospace,
}

/// Font characteristics of a paragraph or label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FontStyle {
    pub face: FontFace,
    /// Size in points.
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub color: Color,
}

impl Default for FontStyle {
    fn default() -> Self {
        Self {
            face: FontFace::Serif,
            size: 12.0,
            bold: false,
            italic: false,
            underline: false,
            color: Color::BLACK,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alignment {
    #[default]
    Left,
    Right,
    Center,
    Justify,
}

/// Border flags for the four sides of a box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Borders {
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
}

impl Borders {
    pub const NONE: Borders = Borders {
        top: false,
        right: false,
        bottom: false,
        left: false,
    };
    pub const ALL: Borders = Borders {
        top: true,
        right: true,
        bottom: true,
        left: true,
    };

    pub fn any(&self) -> bool {
        self.top || self.right || self.bottom || self.left
    }
}

/// Paragraph formatting: box model, alignment, tabs, borders and font.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParagraphStyle {
    pub font: FontStyle,
    pub left_margin: f64,
    pub right_margin: f64,
    pub top_margin: f64,
    pub bottom_margin: f64,
    /// Padding inside the borders, applied on all four sides.
    pub padding: f64,
    /// First-line indent. Negative values produce a hanging indent.
    pub first_indent: f64,
    /// Tab stop positions from the left text edge.
    pub tabs: Vec<f64>,
    pub alignment: Alignment,
    pub borders: Borders,
    pub background: Option<Color>,
    /// Heading level, 0 for body text. Used by table-of-contents marks.
    pub level: u8,
}

impl Default for ParagraphStyle {
    fn default() -> Self {
        Self {
            font: FontStyle::default(),
            left_margin: 0.0,
            right_margin: 0.0,
            top_margin: 0.0,
            bottom_margin: 0.0,
            padding: 0.0,
            first_indent: 0.0,
            tabs: Vec::new(),
            alignment: Alignment::Left,
            borders: Borders::NONE,
            background: None,
            level: 0,
        }
    }
}

/// Table width and column layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableStyle {
    /// Width as a percentage of the containing width.
    pub width: f64,
    /// Width of each column as a percentage of the table width.
    pub column_widths: Vec<f64>,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            width: 100.0,
            column_widths: Vec::new(),
        }
    }
}

impl TableStyle {
    /// A table of `columns` evenly sized columns.
    pub fn even(columns: usize) -> Self {
        let share = if columns == 0 { 0.0 } else { 100.0 / columns as f64 };
        Self {
            width: 100.0,
            column_widths: vec![share; columns],
        }
    }

    pub fn columns(&self) -> usize {
        self.column_widths.len()
    }
}

/// Cell borders and padding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableCellStyle {
    pub borders: Borders,
    /// Padding inside the cell borders.
    pub padding: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HorizontalAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Spacing around a frame in centimetres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Spacing {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

/// A fixed-size frame holding vector drawings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FrameStyle {
    pub width: f64,
    pub height: f64,
    pub align: HorizontalAlign,
    pub spacing: Spacing,
}

impl FrameStyle {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl LineStyle {
    /// Dash pattern in device points, empty for solid lines.
    pub fn dash_pattern(&self) -> &'static [f64] {
        match self {
            LineStyle::Solid => &[],
            LineStyle::Dashed => &[2.0, 4.0],
            LineStyle::Dotted => &[1.0, 2.0],
        }
    }
}

/// Stroke and fill for vector drawings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DrawStyle {
    /// Line width in device points.
    pub line_width: f64,
    pub line_style: LineStyle,
    pub color: Color,
    pub fill_color: Color,
    pub shadow: bool,
    /// Offset of the drop shadow.
    pub shadow_space: f64,
    /// Paragraph style used for text attached to the drawing.
    pub paragraph_style: Option<String>,
}

impl Default for DrawStyle {
    fn default() -> Self {
        Self {
            line_width: 0.5,
            line_style: LineStyle::Solid,
            color: Color::BLACK,
            fill_color: Color::WHITE,
            shadow: false,
            shadow_space: 0.2,
            paragraph_style: None,
        }
    }
}
