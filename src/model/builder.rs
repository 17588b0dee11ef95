//! # Document Builder
//!
//! The incremental authoring interface used by report code: styles are
//! named in a [`StyleSheet`], elements are opened with `start_*` and closed
//! with `end_*`, flow text and drawings are written into whatever element
//! is currently open.
//!
//! ```text
//! builder.start_paragraph("Title", None)?;
//! builder.write_text("Ancestors of John", None)?;
//! builder.end_paragraph()?;
//! ```
//!
//! Open elements are held on a stack and attached to their parent when
//! they are closed, so a half-built table never leaks into the document.

use super::{
    Document, Element, ElementKind, ElementType, IndexMark, PaperStyle, PlacedMark, VerticalAlign,
};
use crate::error::{QuireError, Result};
use crate::style::{Alignment, FrameStyle, HorizontalAlign, ParagraphStyle, StyleSheet};
use crate::text::{StyledText, TagKind};

/// Builds a [`Document`] from start/write/end calls.
pub struct DocumentBuilder {
    styles: StyleSheet,
    paper: PaperStyle,
    rtl: bool,
    root: Element,
    /// Open elements, innermost last.
    open: Vec<Element>,
    /// Column widths of the innermost open table, in display order.
    row_columns: Vec<f64>,
    /// Start offsets of open inline tags in the current paragraph.
    open_tags: Vec<(TagKind, usize)>,
}

impl DocumentBuilder {
    pub fn new(styles: StyleSheet, paper: PaperStyle) -> Self {
        Self {
            styles,
            paper,
            rtl: false,
            root: Element::document(),
            open: Vec::new(),
            row_columns: Vec::new(),
            open_tags: Vec::new(),
        }
    }

    /// Lay out table columns right to left.
    pub fn right_to_left(mut self, rtl: bool) -> Self {
        self.rtl = rtl;
        self
    }

    pub fn styles(&self) -> &StyleSheet {
        &self.styles
    }

    /// Usable page width in centimetres.
    pub fn usable_width(&self) -> f64 {
        self.paper.usable_width()
    }

    pub fn usable_height(&self) -> f64 {
        self.paper.usable_height()
    }

    fn active(&mut self) -> &mut Element {
        match self.open.last_mut() {
            Some(element) => element,
            None => &mut self.root,
        }
    }

    fn active_type(&self) -> ElementType {
        self.open
            .last()
            .map_or(ElementType::Document, Element::element_type)
    }

    fn check_allowed(&self, child: ElementType) -> Result<()> {
        let parent = self.active_type();
        if parent.allows(child) {
            Ok(())
        } else {
            Err(QuireError::NotAllowed { child, parent })
        }
    }

    fn open_element(&mut self, element: Element) -> Result<()> {
        self.check_allowed(element.element_type())?;
        self.open.push(element);
        Ok(())
    }

    fn attach(&mut self, element: Element) -> Result<()> {
        self.active().add_child(element)?;
        Ok(())
    }

    fn close(&mut self, expected: ElementType) -> Result<()> {
        match self.open.last().map(Element::element_type) {
            Some(found) if found == expected => {}
            found => {
                return Err(QuireError::Builder(format!(
                    "end of {expected:?} while {} is open",
                    found.map_or("nothing".to_string(), |t| format!("{t:?}"))
                )))
            }
        }
        let Some(element) = self.open.pop() else {
            return Err(QuireError::Builder(format!("no open {expected:?}")));
        };
        // A refused element stays open so the caller can still repair it
        if let Err(rejected) = self.active().add_child(element) {
            let error = rejected.error();
            self.open.push(rejected.into_child());
            return Err(error);
        }
        Ok(())
    }

    fn paragraph_parts(&mut self) -> Result<(&mut StyledText, &mut Vec<PlacedMark>)> {
        match self.open.last_mut().map(|e| &mut e.kind) {
            Some(ElementKind::Paragraph { text, marks, .. }) => Ok((text, marks)),
            _ => Err(QuireError::Builder("text written outside a paragraph".to_string())),
        }
    }

    fn draw_paragraph_style(
        &self,
        draw_style: &str,
        alignment: Alignment,
    ) -> Result<ParagraphStyle> {
        let style = self.styles.draw_style(draw_style)?;
        let Some(name) = style.paragraph_style else {
            return Err(QuireError::Builder(format!(
                "draw style {draw_style:?} names no paragraph style"
            )));
        };
        let mut paragraph = self.styles.paragraph_style(&name)?;
        paragraph.alignment = alignment;
        Ok(paragraph)
    }

    // Text flow

    pub fn page_break(&mut self) -> Result<()> {
        self.attach(Element::page_break())
    }

    /// Open a paragraph. A leader is written first, followed by a tab that
    /// jumps to the hanging indent.
    pub fn start_paragraph(&mut self, style_name: &str, leader: Option<&str>) -> Result<()> {
        let mut style = self.styles.paragraph_style(style_name)?;
        let mut text = StyledText::default();
        if let Some(leader) = leader {
            text.push_str(leader);
            text.push_str("\t");
            style.tabs = vec![-style.first_indent];
        }
        self.open_tags.clear();
        self.open_element(Element::paragraph(style, text))
    }

    pub fn end_paragraph(&mut self) -> Result<()> {
        if let Some((kind, _)) = self.open_tags.last() {
            return Err(QuireError::Builder(format!("paragraph ended with {kind:?} still open")));
        }
        self.close(ElementType::Paragraph)
    }

    pub fn write_text(&mut self, text: &str, mark: Option<IndexMark>) -> Result<()> {
        self.write_styled(StyledText::plain(text), mark)
    }

    /// Append rich text. Its spans are shifted to the current end of the
    /// paragraph.
    pub fn write_styled(&mut self, text: StyledText, mark: Option<IndexMark>) -> Result<()> {
        text.validate()?;
        if let Some(mark) = mark {
            self.add_mark(mark)?;
        }
        let (paragraph, _) = self.paragraph_parts()?;
        paragraph.push_styled(text);
        Ok(())
    }

    /// Anchor an index mark at the current end of the paragraph.
    pub fn add_mark(&mut self, mark: IndexMark) -> Result<()> {
        let (text, marks) = self.paragraph_parts()?;
        let offset = text.len();
        marks.push(PlacedMark { offset, mark });
        Ok(())
    }

    fn start_tag(&mut self, kind: TagKind) -> Result<()> {
        let (text, _) = self.paragraph_parts()?;
        let at = text.len();
        self.open_tags.push((kind, at));
        Ok(())
    }

    fn end_tag(&mut self, kind: TagKind) -> Result<()> {
        match self.open_tags.pop() {
            Some((open, start)) if open == kind => {
                let (text, _) = self.paragraph_parts()?;
                let end = text.len();
                if end > start {
                    text.add_tag(kind, None, (start, end))?;
                }
                Ok(())
            }
            other => Err(QuireError::Builder(format!(
                "end of {kind:?} does not match open {:?}",
                other.map(|(k, _)| k)
            ))),
        }
    }

    pub fn start_bold(&mut self) -> Result<()> {
        self.start_tag(TagKind::Bold)
    }

    pub fn end_bold(&mut self) -> Result<()> {
        self.end_tag(TagKind::Bold)
    }

    pub fn start_superscript(&mut self) -> Result<()> {
        self.start_tag(TagKind::Superscript)
    }

    pub fn end_superscript(&mut self) -> Result<()> {
        self.end_tag(TagKind::Superscript)
    }

    // Tables

    pub fn start_table(&mut self, style_name: &str) -> Result<()> {
        let style = self.styles.table_style(style_name)?;
        let mut columns = style.column_widths.clone();
        if self.rtl {
            columns.reverse();
        }
        self.open_element(Element::table(style))?;
        self.row_columns = columns;
        Ok(())
    }

    pub fn end_table(&mut self) -> Result<()> {
        self.close(ElementType::Table)
    }

    pub fn start_row(&mut self) -> Result<()> {
        self.open_element(Element::row_with_columns(self.row_columns.clone()))
    }

    pub fn end_row(&mut self) -> Result<()> {
        if self.rtl && self.active_type() == ElementType::Row {
            let row = self.active();
            let mut cells = row.take_children();
            cells.reverse();
            row.set_children(cells);
        }
        self.close(ElementType::Row)
    }

    pub fn start_cell(&mut self, style_name: &str, span: u32) -> Result<()> {
        let style = self.styles.cell_style(style_name)?;
        self.open_element(Element::cell(style, span))
    }

    pub fn end_cell(&mut self) -> Result<()> {
        self.close(ElementType::Cell)
    }

    /// Add a picture, optionally followed by a caption paragraph that is
    /// centered under it.
    #[allow(clippy::too_many_arguments)]
    pub fn add_media(
        &mut self,
        path: &str,
        align: HorizontalAlign,
        width_cm: f64,
        height_cm: f64,
        alt: &[&str],
        style_name: Option<&str>,
        crop: Option<[f64; 4]>,
    ) -> Result<()> {
        let mut picture = Element::picture(path, width_cm, height_cm, align);
        if let ElementKind::Picture { crop: c, .. } = &mut picture.kind {
            *c = crop;
        }
        self.attach(picture)?;

        if alt.is_empty() {
            return Ok(());
        }
        let Some(style_name) = style_name else {
            return Err(QuireError::Builder("caption text needs a paragraph style".to_string()));
        };
        let mut style = self.styles.paragraph_style(style_name)?;
        style.alignment = Alignment::Center;
        let free = self.usable_width() - width_cm;
        if align == HorizontalAlign::Right {
            style.left_margin = free;
        } else {
            style.right_margin = free;
        }
        self.attach(Element::paragraph(style, alt.join("\n")))
    }

    pub fn insert_toc(&mut self) -> Result<()> {
        self.root.add_child(Element::table_of_contents())?;
        Ok(())
    }

    pub fn insert_index(&mut self) -> Result<()> {
        self.root.add_child(Element::alphabetical_index())?;
        Ok(())
    }

    // Drawings

    /// Open a frame the size of the usable page. Every page after the
    /// first is preceded by a page break.
    pub fn start_page(&mut self) -> Result<()> {
        let needs_break = self
            .root
            .children()
            .last()
            .is_some_and(|last| last.element_type() != ElementType::PageBreak);
        if needs_break {
            self.root.add_child(Element::page_break())?;
        }
        let style = FrameStyle::new(self.usable_width(), self.usable_height());
        self.open_element(Element::frame(style))
    }

    pub fn end_page(&mut self) -> Result<()> {
        self.close(ElementType::Frame)
    }

    pub fn draw_line(
        &mut self,
        style_name: &str,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    ) -> Result<()> {
        let style = self.styles.draw_style(style_name)?;
        self.attach(Element::line(style, (x1, y1), (x2, y2)))
    }

    pub fn draw_path(&mut self, style_name: &str, path: Vec<(f64, f64)>) -> Result<()> {
        let style = self.styles.draw_style(style_name)?;
        self.attach(Element::polygon(style, path))
    }

    /// A box, plus its text as a label when the draw style names a
    /// paragraph style.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_box(
        &mut self,
        style_name: &str,
        text: &str,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        mark: Option<IndexMark>,
    ) -> Result<()> {
        let style = self.styles.draw_style(style_name)?;
        let x_offset = if style.shadow { style.shadow_space } else { 0.2 };
        let label_style = match &style.paragraph_style {
            Some(name) => {
                let mut p = self.styles.paragraph_style(name)?;
                p.alignment = Alignment::Left;
                Some(p)
            }
            None => None,
        };
        self.attach(Element::rect(style, x, y, w, h))?;

        if let Some(label_style) = label_style {
            self.attach(label(
                label_style,
                VerticalAlign::Center,
                text,
                x + x_offset,
                y + h / 2.0,
                0.0,
                mark,
            ))?;
        }
        Ok(())
    }

    pub fn draw_text(
        &mut self,
        style_name: &str,
        text: &str,
        x: f64,
        y: f64,
        mark: Option<IndexMark>,
    ) -> Result<()> {
        let style = self.draw_paragraph_style(style_name, Alignment::Left)?;
        self.attach(label(style, VerticalAlign::Top, text, x, y, 0.0, mark))
    }

    pub fn center_text(
        &mut self,
        style_name: &str,
        text: &str,
        x: f64,
        y: f64,
        mark: Option<IndexMark>,
    ) -> Result<()> {
        let style = self.draw_paragraph_style(style_name, Alignment::Center)?;
        self.attach(label(style, VerticalAlign::Top, text, x, y, 0.0, mark))
    }

    /// Centered multi-line text rotated by `angle` degrees around `(x, y)`.
    #[allow(clippy::too_many_arguments)]
    pub fn rotate_text(
        &mut self,
        style_name: &str,
        lines: &[&str],
        x: f64,
        y: f64,
        angle: f64,
        mark: Option<IndexMark>,
    ) -> Result<()> {
        let style = self.draw_paragraph_style(style_name, Alignment::Center)?;
        self.attach(label(style, VerticalAlign::Center, &lines.join("\n"), x, y, angle, mark))
    }

    /// Close the builder. Every started element must have been ended.
    pub fn finish(self) -> Result<Document> {
        if let Some(open) = self.open.last() {
            return Err(QuireError::Builder(format!(
                "{:?} was started but never ended",
                open.element_type()
            )));
        }
        Ok(Document {
            paper: self.paper,
            root: self.root,
        })
    }
}

fn label(
    style: ParagraphStyle,
    valign: VerticalAlign,
    text: &str,
    x: f64,
    y: f64,
    angle: f64,
    mark: Option<IndexMark>,
) -> Element {
    let mut element = Element::label(style, valign, text, x, y, angle);
    if let ElementKind::TextLabel { mark: m, .. } = &mut element.kind {
        *m = mark;
    }
    element
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MarkKind;
    use crate::style::{DrawStyle, TableCellStyle, TableStyle};

    fn sheet() -> StyleSheet {
        let mut sheet = StyleSheet::new("test");
        let mut normal = ParagraphStyle::default();
        normal.first_indent = -1.0;
        sheet.add_paragraph_style("Normal", normal);
        sheet.add_table_style("Two", TableStyle {
            width: 100.0,
            column_widths: vec![30.0, 70.0],
        });
        sheet.add_cell_style("Plain", TableCellStyle::default());
        let mut boxed = DrawStyle::default();
        boxed.paragraph_style = Some("Normal".to_string());
        boxed.shadow = true;
        boxed.shadow_space = 0.3;
        sheet.add_draw_style("Boxed", boxed);
        sheet.add_draw_style("Bare", DrawStyle::default());
        sheet
    }

    fn builder() -> DocumentBuilder {
        DocumentBuilder::new(sheet(), PaperStyle::default())
    }

    #[test]
    fn leaders_get_a_tab_at_the_hanging_indent() {
        let mut b = builder();
        b.start_paragraph("Normal", Some("1.")).unwrap();
        b.write_text("First entry", None).unwrap();
        b.end_paragraph().unwrap();
        let doc = b.finish().unwrap();

        match &doc.root.children()[0].kind {
            ElementKind::Paragraph { style, text, .. } => {
                assert_eq!(text.as_str(), "1.\tFirst entry");
                assert_eq!(style.tabs, vec![1.0]);
            }
            other => panic!("expected a paragraph, got {other:?}"),
        }
    }

    #[test]
    fn marks_and_bold_runs_are_anchored_at_byte_offsets() {
        let mut b = builder();
        b.start_paragraph("Normal", None).unwrap();
        b.write_text("Born ", None).unwrap();
        b.start_bold().unwrap();
        b.write_text("1850", Some(IndexMark::new("1850", MarkKind::Alphabetical, 1)))
            .unwrap();
        b.end_bold().unwrap();
        b.end_paragraph().unwrap();
        let doc = b.finish().unwrap();

        match &doc.root.children()[0].kind {
            ElementKind::Paragraph { text, marks, .. } => {
                assert_eq!(marks[0].offset, 5);
                let bold = &text.tags()[0];
                assert_eq!(bold.kind, TagKind::Bold);
                assert_eq!(bold.ranges, vec![(5, 9)]);
            }
            other => panic!("expected a paragraph, got {other:?}"),
        }
    }

    #[test]
    fn right_to_left_reverses_columns_and_cells() {
        let mut b = builder().right_to_left(true);
        b.start_table("Two").unwrap();
        b.start_row().unwrap();
        for text in ["a", "b"] {
            b.start_cell("Plain", 1).unwrap();
            b.start_paragraph("Normal", None).unwrap();
            b.write_text(text, None).unwrap();
            b.end_paragraph().unwrap();
            b.end_cell().unwrap();
        }
        b.end_row().unwrap();
        b.end_table().unwrap();
        let doc = b.finish().unwrap();

        let row = &doc.root.children()[0].children()[0];
        match &row.kind {
            ElementKind::Row { columns, .. } => assert_eq!(columns, &vec![70.0, 30.0]),
            other => panic!("expected a row, got {other:?}"),
        }
        let first = &row.children()[0].children()[0];
        match &first.kind {
            ElementKind::Paragraph { text, .. } => assert_eq!(text.as_str(), "b"),
            other => panic!("expected a paragraph, got {other:?}"),
        }
    }

    #[test]
    fn overflowing_cells_are_refused_at_end_cell() {
        let mut b = builder();
        b.start_table("Two").unwrap();
        b.start_row().unwrap();
        b.start_cell("Plain", 2).unwrap();
        b.end_cell().unwrap();
        b.start_cell("Plain", 1).unwrap();
        assert!(matches!(b.end_cell(), Err(QuireError::SpanOverflow { .. })));
    }

    #[test]
    fn refused_elements_stay_open() {
        let mut b = builder();
        b.start_table("Two").unwrap();
        b.start_row().unwrap();
        b.start_cell("Plain", 2).unwrap();
        b.end_cell().unwrap();
        b.start_cell("Plain", 1).unwrap();
        b.start_paragraph("Normal", None).unwrap();
        b.write_text("kept", None).unwrap();
        b.end_paragraph().unwrap();
        assert!(b.end_cell().is_err());

        assert_eq!(b.active_type(), ElementType::Cell);
        let cell = b.active();
        assert_eq!(cell.children().len(), 1);
        match &cell.children()[0].kind {
            ElementKind::Paragraph { text, .. } => assert_eq!(text.as_str(), "kept"),
            other => panic!("expected a paragraph, got {other:?}"),
        }
        // The row still holds the first cell
        assert_eq!(b.open.len(), 3);
        assert_eq!(b.open[1].children().len(), 1);
    }

    #[test]
    fn structure_errors_are_reported() {
        let mut b = builder();
        assert!(matches!(b.start_row(), Err(QuireError::NotAllowed { .. })));
        assert!(matches!(b.write_text("x", None), Err(QuireError::Builder(_))));
        assert!(matches!(b.end_table(), Err(QuireError::Builder(_))));
        b.start_paragraph("Normal", None).unwrap();
        assert!(matches!(b.finish(), Err(QuireError::Builder(_))));
    }

    #[test]
    fn pages_are_separated_by_breaks_and_boxes_get_labels() {
        let mut b = builder();
        b.start_page().unwrap();
        b.draw_box("Boxed", "John", 1.0, 2.0, 4.0, 1.0, None).unwrap();
        b.draw_line("Bare", 0.0, 0.0, 1.0, 1.0).unwrap();
        b.end_page().unwrap();
        b.start_page().unwrap();
        b.end_page().unwrap();
        let doc = b.finish().unwrap();

        let types: Vec<ElementType> = doc
            .root
            .children()
            .iter()
            .map(Element::element_type)
            .collect();
        assert_eq!(types, vec![ElementType::Frame, ElementType::PageBreak, ElementType::Frame]);

        let frame = &doc.root.children()[0];
        match &frame.kind {
            ElementKind::Frame { style } => assert!((style.width - (21.0 - 5.08)).abs() < 1e-9),
            other => panic!("expected a frame, got {other:?}"),
        }
        match &frame.children()[1].kind {
            ElementKind::TextLabel { x, y, valign, .. } => {
                assert!((x - 1.3).abs() < 1e-9);
                assert!((y - 2.5).abs() < 1e-9);
                assert_eq!(*valign, VerticalAlign::Center);
            }
            other => panic!("expected a label, got {other:?}"),
        }
    }

    #[test]
    fn text_needs_a_paragraph_style_on_the_draw_style() {
        let mut b = builder();
        b.start_page().unwrap();
        assert!(matches!(
            b.draw_text("Bare", "x", 0.0, 0.0, None),
            Err(QuireError::Builder(_))
        ));
    }

    #[test]
    fn media_captions_are_centered_under_the_picture() {
        let mut b = builder();
        b.add_media(
            "photo.png",
            HorizontalAlign::Right,
            5.0,
            4.0,
            &["Jane", "1901"],
            Some("Normal"),
            None,
        )
        .unwrap();
        let doc = b.finish().unwrap();
        assert_eq!(doc.root.children().len(), 2);
        match &doc.root.children()[1].kind {
            ElementKind::Paragraph { style, text, .. } => {
                assert_eq!(text.as_str(), "Jane\n1901");
                assert_eq!(style.alignment, Alignment::Center);
                assert!((style.left_margin - (21.0 - 5.08 - 5.0)).abs() < 1e-9);
            }
            other => panic!("expected a caption, got {other:?}"),
        }
    }
}
