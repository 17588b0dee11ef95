//! # Document Model
//!
//! The input to quire: a rooted, ordered tree of typed elements. This is
//! the contract between report code (or a JSON file) and the pagination
//! engine.
//!
//! Each element type declares which child types it accepts. Attaching
//! anything else is refused and the child is handed back unchanged, so a
//! tree that exists is always structurally valid. Parents own their
//! children; a child only remembers the *type* of its parent.

pub mod builder;
pub mod paper;

pub use builder::DocumentBuilder;
pub use paper::{Orientation, PageSetup, PaperStyle, Resolution};

use serde::{Deserialize, Serialize};

use crate::error::{Rejected, Result};
use crate::style::{
    DrawStyle, FrameStyle, HorizontalAlign, ParagraphStyle, TableCellStyle, TableStyle,
};
use crate::text::StyledText;

/// The type tag of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    Document,
    PageBreak,
    Paragraph,
    Table,
    Row,
    Cell,
    Picture,
    Frame,
    Line,
    Polygon,
    Box,
    TextLabel,
    TableOfContents,
    AlphabeticalIndex,
}

impl ElementType {
    pub fn allowed_children(self) -> &'static [ElementType] {
        use ElementType::*;
        match self {
            Document => &[
                Paragraph,
                PageBreak,
                Table,
                Picture,
                Frame,
                TableOfContents,
                AlphabeticalIndex,
            ],
            Table => &[Row],
            Row => &[Cell],
            Cell => &[Paragraph, Picture],
            Frame => &[Line, Polygon, Box, TextLabel],
            _ => &[],
        }
    }

    pub fn allows(self, child: ElementType) -> bool {
        self.allowed_children().contains(&child)
    }
}

/// Which generated listing an index mark feeds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkKind {
    #[default]
    Alphabetical,
    TableOfContents,
}

/// An entry for the alphabetical index or the table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexMark {
    pub key: String,
    #[serde(default)]
    pub kind: MarkKind,
    #[serde(default)]
    pub level: u8,
}

impl IndexMark {
    pub fn new(key: &str, kind: MarkKind, level: u8) -> Self {
        Self {
            key: key.to_string(),
            kind,
            level,
        }
    }
}

/// An index mark anchored at a byte offset of a paragraph's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedMark {
    pub offset: usize,
    pub mark: IndexMark,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VerticalAlign {
    #[default]
    Top,
    Center,
    Bottom,
}

/// What an element is, with its type-specific data.
///
/// Coordinates and sizes inside frames are centimetres from the frame's
/// top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ElementKind {
    Document,
    PageBreak,
    Paragraph {
        #[serde(default)]
        style: ParagraphStyle,
        #[serde(default)]
        text: StyledText,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        marks: Vec<PlacedMark>,
    },
    Table {
        #[serde(default)]
        style: TableStyle,
    },
    Row {
        /// Column widths in percent, copied from the table on attach.
        #[serde(default)]
        columns: Vec<f64>,
        /// Height found by the last divide, used when drawing.
        #[serde(default)]
        height: f64,
    },
    Cell {
        #[serde(default)]
        style: TableCellStyle,
        #[serde(default = "one")]
        span: u32,
    },
    Picture {
        path: String,
        width: f64,
        height: f64,
        #[serde(default)]
        align: HorizontalAlign,
        /// Crop box `[left, top, right, bottom]` in percent of the source.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        crop: Option<[f64; 4]>,
    },
    Frame {
        #[serde(default)]
        style: FrameStyle,
    },
    Line {
        #[serde(default)]
        style: DrawStyle,
        start: (f64, f64),
        end: (f64, f64),
    },
    Polygon {
        #[serde(default)]
        style: DrawStyle,
        path: Vec<(f64, f64)>,
    },
    Box {
        #[serde(default)]
        style: DrawStyle,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    TextLabel {
        #[serde(default)]
        style: ParagraphStyle,
        #[serde(default)]
        valign: VerticalAlign,
        text: String,
        x: f64,
        y: f64,
        /// Rotation in degrees.
        #[serde(default)]
        angle: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mark: Option<IndexMark>,
    },
    TableOfContents,
    AlphabeticalIndex,
}

fn one() -> u32 {
    1
}

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub kind: ElementKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<Element>,
    #[serde(skip)]
    parent: Option<ElementType>,
}

impl Element {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            parent: None,
        }
    }

    pub fn document() -> Self {
        Self::new(ElementKind::Document)
    }

    pub fn page_break() -> Self {
        Self::new(ElementKind::PageBreak)
    }

    pub fn paragraph(style: ParagraphStyle, text: impl Into<StyledText>) -> Self {
        Self::new(ElementKind::Paragraph {
            style,
            text: text.into(),
            marks: Vec::new(),
        })
    }

    pub fn table(style: TableStyle) -> Self {
        Self::new(ElementKind::Table { style })
    }

    /// A row without column widths; it takes them from the table it joins.
    pub fn row() -> Self {
        Self::row_with_columns(Vec::new())
    }

    pub fn row_with_columns(columns: Vec<f64>) -> Self {
        Self::new(ElementKind::Row { columns, height: 0.0 })
    }

    pub fn cell(style: TableCellStyle, span: u32) -> Self {
        Self::new(ElementKind::Cell { style, span })
    }

    pub fn picture(path: &str, width: f64, height: f64, align: HorizontalAlign) -> Self {
        Self::new(ElementKind::Picture {
            path: path.to_string(),
            width,
            height,
            align,
            crop: None,
        })
    }

    pub fn frame(style: FrameStyle) -> Self {
        Self::new(ElementKind::Frame { style })
    }

    pub fn line(style: DrawStyle, start: (f64, f64), end: (f64, f64)) -> Self {
        Self::new(ElementKind::Line { style, start, end })
    }

    pub fn polygon(style: DrawStyle, path: Vec<(f64, f64)>) -> Self {
        Self::new(ElementKind::Polygon { style, path })
    }

    pub fn rect(style: DrawStyle, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(ElementKind::Box {
            style,
            x,
            y,
            width,
            height,
        })
    }

    pub fn label(
        style: ParagraphStyle,
        valign: VerticalAlign,
        text: &str,
        x: f64,
        y: f64,
        angle: f64,
    ) -> Self {
        Self::new(ElementKind::TextLabel {
            style,
            valign,
            text: text.to_string(),
            x,
            y,
            angle,
            mark: None,
        })
    }

    pub fn table_of_contents() -> Self {
        Self::new(ElementKind::TableOfContents)
    }

    pub fn alphabetical_index() -> Self {
        Self::new(ElementKind::AlphabeticalIndex)
    }

    pub fn element_type(&self) -> ElementType {
        match &self.kind {
            ElementKind::Document => ElementType::Document,
            ElementKind::PageBreak => ElementType::PageBreak,
            ElementKind::Paragraph { .. } => ElementType::Paragraph,
            ElementKind::Table { .. } => ElementType::Table,
            ElementKind::Row { .. } => ElementType::Row,
            ElementKind::Cell { .. } => ElementType::Cell,
            ElementKind::Picture { .. } => ElementType::Picture,
            ElementKind::Frame { .. } => ElementType::Frame,
            ElementKind::Line { .. } => ElementType::Line,
            ElementKind::Polygon { .. } => ElementType::Polygon,
            ElementKind::Box { .. } => ElementType::Box,
            ElementKind::TextLabel { .. } => ElementType::TextLabel,
            ElementKind::TableOfContents => ElementType::TableOfContents,
            ElementKind::AlphabeticalIndex => ElementType::AlphabeticalIndex,
        }
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn parent(&self) -> Option<ElementType> {
        self.parent
    }

    /// Span of a cell, 1 for anything else.
    pub fn span(&self) -> u32 {
        match self.kind {
            ElementKind::Cell { span, .. } => span.max(1),
            _ => 1,
        }
    }

    /// Attach `child` as the last child. A child type the parent does not
    /// accept, or a cell that would overflow its row, is handed back in the
    /// error and the tree is left unchanged.
    pub fn add_child(&mut self, mut child: Element) -> std::result::Result<(), Rejected> {
        let parent_type = self.element_type();
        let child_type = child.element_type();
        if !parent_type.allows(child_type) {
            log::debug!("rejected {child_type:?} under {parent_type:?}");
            return Err(Rejected::not_allowed(child, parent_type));
        }

        match &self.kind {
            ElementKind::Row { columns, .. } => {
                let span = match child.kind {
                    ElementKind::Cell { span, .. } => span,
                    _ => 1,
                };
                let used: usize = self.children.iter().map(|c| c.span() as usize).sum();
                // Rows built outside a table are checked when they join one.
                if span == 0 || (!columns.is_empty() && used + span as usize > columns.len()) {
                    log::debug!(
                        "rejected cell spanning {span} in a row using {used} of {} columns",
                        columns.len()
                    );
                    return Err(Rejected::span_overflow(
                        child,
                        parent_type,
                        span,
                        used,
                        columns.len(),
                    ));
                }
            }
            ElementKind::Table { style } => {
                let used: usize = child.children.iter().map(|c| c.span() as usize).sum();
                if used > style.columns() {
                    let span = child.children.last().map_or(1, |c| c.span());
                    let before = used - span as usize;
                    log::debug!("rejected row using {used} of {} table columns", style.columns());
                    return Err(Rejected::span_overflow(
                        child,
                        parent_type,
                        span,
                        before,
                        style.columns(),
                    ));
                }
                if let ElementKind::Row { columns, .. } = &mut child.kind {
                    if columns.is_empty() {
                        *columns = style.column_widths.clone();
                    }
                }
            }
            _ => {}
        }

        child.parent = Some(parent_type);
        self.children.push(child);
        Ok(())
    }

    /// Detach and return all children.
    pub(crate) fn take_children(&mut self) -> Vec<Element> {
        std::mem::take(&mut self.children)
    }

    /// Replace the children wholesale. Callers guarantee the types are
    /// allowed; used when rebuilding fragments of an already valid tree.
    pub(crate) fn set_children(&mut self, children: Vec<Element>) {
        let parent_type = self.element_type();
        self.children = children;
        for child in &mut self.children {
            child.parent = Some(parent_type);
        }
    }

    pub(crate) fn set_parent(&mut self, parent: Option<ElementType>) {
        self.parent = parent;
    }

    /// A copy of this element without children, keeping style and parent.
    pub(crate) fn shallow_clone(&self) -> Element {
        Element {
            kind: self.kind.clone(),
            children: Vec::new(),
            parent: self.parent,
        }
    }

    /// Pre-order walk over this element and all its descendants.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Attach children recursively through [`Element::add_child`], so parent
    /// links and row columns are set and every edge is checked. Paragraph
    /// spans are checked too.
    fn rebuilt(mut self) -> Result<Element> {
        if let ElementKind::Paragraph { text, .. } = &self.kind {
            text.validate()?;
        }
        let children = self.take_children();
        for child in children {
            self.add_child(child.rebuilt()?)?;
        }
        Ok(self)
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        self.stack.extend(next.children.iter().rev());
        Some(next)
    }
}

/// A complete document: paper plus the root element.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub paper: PaperStyle,
    pub root: Element,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentFile {
    #[serde(default)]
    paper: PaperStyle,
    #[serde(default)]
    children: Vec<Element>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DocumentFileRef<'a> {
    paper: &'a PaperStyle,
    children: &'a [Element],
}

impl Default for Document {
    fn default() -> Self {
        Self::new(PaperStyle::default())
    }
}

impl Document {
    pub fn new(paper: PaperStyle) -> Self {
        Self {
            paper,
            root: Element::document(),
        }
    }

    /// Parse a document and check every parent/child edge.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: DocumentFile = serde_json::from_str(json)?;
        let mut root = Element::document();
        for child in file.children {
            root.add_child(child.rebuilt()?)?;
        }
        Ok(Self {
            paper: file.paper,
            root,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&DocumentFileRef {
            paper: &self.paper,
            children: self.root.children(),
        })?)
    }

    pub fn push(&mut self, element: Element) -> std::result::Result<(), Rejected> {
        self.root.add_child(element)
    }
}
