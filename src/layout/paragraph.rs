//! # Paragraph Division
//!
//! A paragraph is measured once at its usable text width. If it does not
//! fit, it is cut at the start of the first line that does not: the head
//! keeps the text before the cut, the tail becomes a new paragraph holding
//! the rest with its spans and index marks shifted to the new origin.

use super::page_break::{decide_line_split, BreakDecision};
use super::{Division, LayoutContext};
use crate::error::Result;
use crate::model::{Element, ElementKind, ElementType, PlacedMark};
use crate::style::ParagraphStyle;
use crate::text::{FontDescription, MeasureRequest, StyledText, TextMetrics};

/// The box model of a paragraph in device units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParagraphGeometry {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
    pub h_padding: f64,
    pub v_padding: f64,
    pub indent: f64,
    /// Width handed to the measurer. A hanging indent widens it.
    pub text_width: f64,
    pub spacing: f64,
}

impl ParagraphGeometry {
    pub fn new(style: &ParagraphStyle, ctx: &LayoutContext<'_>, width: f64) -> Self {
        let res = ctx.resolution;
        let left = res.cm_to_x(style.left_margin);
        let right = res.cm_to_x(style.right_margin);
        let h_padding = res.cm_to_x(style.padding);
        let indent = res.cm_to_x(style.first_indent);

        let mut text_width = width - left - 2.0 * h_padding - right;
        if indent < 0.0 {
            text_width -= indent;
        }

        Self {
            left,
            right,
            top: res.cm_to_y(style.top_margin),
            bottom: res.cm_to_y(style.bottom_margin),
            h_padding,
            v_padding: res.cm_to_y(style.padding),
            indent,
            text_width,
            spacing: res.pt_to_y(style.font.size * ctx.config.line_spacing_fraction),
        }
    }

    /// Left edge of the text block; a hanging first line starts left of it.
    pub fn text_x(&self) -> f64 {
        let x = self.left + self.h_padding;
        if self.indent < 0.0 {
            x + self.indent
        } else {
            x
        }
    }
}

/// Measure a paragraph's text at its geometry's width.
pub fn measure(
    style: &ParagraphStyle,
    text: &StyledText,
    ctx: &LayoutContext<'_>,
    geometry: &ParagraphGeometry,
) -> Result<TextMetrics> {
    let font = FontDescription::resolve(&style.font, &ctx.config.font_families);
    let tabs: Vec<f64> = style.tabs.iter().map(|&t| ctx.resolution.cm_to_x(t)).collect();
    let request = MeasureRequest {
        font: &font,
        text,
        width: Some(geometry.text_width.max(0.0)),
        wrap: ctx.config.wrap,
        indent: geometry.indent,
        spacing: geometry.spacing,
        tabs: &tabs,
        alignment: style.alignment,
        resolution: ctx.resolution,
    };
    let metrics = ctx.measurer.measure(&request)?;
    metrics.validate(text.as_str())?;
    Ok(metrics)
}

pub(crate) fn divide(
    mut element: Element,
    ctx: &LayoutContext<'_>,
    width: f64,
    height: f64,
) -> Result<Division> {
    let in_cell = element.parent() == Some(ElementType::Cell);
    let (geometry, metrics) = match &element.kind {
        ElementKind::Paragraph { style, text, .. } => {
            let geometry = ParagraphGeometry::new(style, ctx, width);
            let metrics = measure(style, text, ctx, &geometry)?;
            (geometry, metrics)
        }
        _ => return Ok(Division::whole(element, 0.0)),
    };

    let text_height = height - geometry.top - 2.0 * geometry.v_padding;
    let min_lines = if in_cell {
        ctx.config.min_cell_split_lines
    } else {
        0
    };
    let spacing = geometry.spacing;

    match decide_line_split(&metrics, text_height, spacing, min_lines, ctx.force) {
        BreakDecision::Place => {
            let mut paragraph_height =
                metrics.height + spacing + geometry.top + 2.0 * geometry.v_padding;
            if height - paragraph_height > geometry.bottom {
                paragraph_height += geometry.bottom;
            }
            Ok(Division::whole(element, paragraph_height))
        }
        BreakDecision::MoveToNextPage => {
            log::debug!(
                "moving paragraph of {} lines to the next page ({text_height:.1} units left)",
                metrics.line_count()
            );
            Ok(Division::defer(element))
        }
        BreakDecision::Split {
            items_on_current_page,
        } => {
            let first = metrics.lines[0];
            let last_fitting = metrics.lines[items_on_current_page - 1];
            let index = metrics.lines[items_on_current_page].start;
            log::debug!(
                "splitting paragraph after {items_on_current_page} of {} lines at byte {index}",
                metrics.line_count()
            );

            let parent = element.parent();
            let tail_kind = match &mut element.kind {
                ElementKind::Paragraph { style, text, marks } => {
                    split_at(style, text, marks, index)
                }
                _ => return Ok(Division::defer(element)),
            };
            let mut tail = Element::new(tail_kind);
            tail.set_parent(parent);

            let head_height =
                last_fitting.bottom - first.top + spacing + geometry.top + 2.0 * geometry.v_padding;
            Ok(Division::split(element, tail, head_height))
        }
    }
}

/// Cut a paragraph's content at byte `index`. The fields keep the head;
/// the returned kind is the tail.
fn split_at(
    style: &mut ParagraphStyle,
    text: &mut StyledText,
    marks: &mut Vec<PlacedMark>,
    index: usize,
) -> ElementKind {
    let tail_text = text.split_off(index);

    let (head_marks, tail_marks): (Vec<PlacedMark>, Vec<PlacedMark>) =
        std::mem::take(marks).into_iter().partition(|m| m.offset < index);
    *marks = head_marks;
    let tail_marks = tail_marks
        .into_iter()
        .map(|m| PlacedMark {
            offset: m.offset - index,
            mark: m.mark,
        })
        .collect();

    // The tail continues the text as if no break happened
    let mut tail_style = style.clone();
    tail_style.top_margin = 0.0;
    tail_style.first_indent = 0.0;
    tail_style.borders.top = false;

    style.bottom_margin = 0.0;
    style.borders.bottom = false;

    ElementKind::Paragraph {
        style: tail_style,
        text: tail_text,
        marks: tail_marks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::model::{IndexMark, MarkKind, Resolution};
    use crate::style::Borders;
    use crate::text::{LineMetrics, TagKind, TextMeasurer, TextTag};

    /// Every five bytes make a 10-unit line; lines are spaced by the
    /// requested spacing.
    struct FiveByteLines;

    impl TextMeasurer for FiveByteLines {
        fn measure(&self, request: &MeasureRequest<'_>) -> Result<TextMetrics> {
            let len = request.text.len();
            let count = len.div_ceil(5).max(1);
            let lines: Vec<LineMetrics> = (0..count)
                .map(|i| {
                    let top = i as f64 * (10.0 + request.spacing);
                    LineMetrics {
                        start: i * 5,
                        end: ((i + 1) * 5).min(len),
                        top,
                        bottom: top + 10.0,
                        width: 50.0,
                    }
                })
                .collect();
            let height = lines.last().map_or(0.0, |l| l.bottom);
            Ok(TextMetrics {
                lines,
                width: 50.0,
                height,
            })
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn config() -> LayoutConfig {
        LayoutConfig {
            line_spacing_fraction: 0.0,
            ..LayoutConfig::default()
        }
    }

    fn styled() -> StyledText {
        // 20 bytes, four lines of five
        StyledText::new(
            "aaaaabbbbbcccccddddd",
            vec![TextTag::new(TagKind::Bold, vec![(3, 12)])],
        )
        .unwrap()
    }

    fn paragraph(style: ParagraphStyle) -> Element {
        let mut element = Element::paragraph(style, styled());
        if let ElementKind::Paragraph { marks, .. } = &mut element.kind {
            marks.push(PlacedMark {
                offset: 2,
                mark: IndexMark::new("a", MarkKind::Alphabetical, 1),
            });
            marks.push(PlacedMark {
                offset: 17,
                mark: IndexMark::new("d", MarkKind::Alphabetical, 1),
            });
        }
        element
    }

    #[test]
    fn whole_paragraph_adds_bottom_margin_only_with_room() {
        let cfg = config();
        let ctx = LayoutContext::new(&FiveByteLines, Resolution::uniform(2.54), &cfg);
        let style = ParagraphStyle {
            bottom_margin: 5.0,
            ..ParagraphStyle::default()
        };

        let roomy = divide(paragraph(style.clone()), &ctx, 100.0, 100.0).unwrap();
        assert!(close(roomy.height, 45.0), "{}", roomy.height);
        let tight = divide(paragraph(style), &ctx, 100.0, 42.0).unwrap();
        assert!(close(tight.height, 40.0), "{}", tight.height);
        assert!(tight.tail.is_none());
    }

    #[test]
    fn split_moves_spans_marks_and_margins() {
        let cfg = config();
        let ctx = LayoutContext::new(&FiveByteLines, Resolution::uniform(2.54), &cfg);
        let style = ParagraphStyle {
            top_margin: 2.0,
            bottom_margin: 3.0,
            first_indent: 1.0,
            borders: Borders::ALL,
            ..ParagraphStyle::default()
        };

        // 2 top margin + two lines of 10
        let division = divide(paragraph(style), &ctx, 100.0, 25.0).unwrap();
        assert!(division.is_split());
        assert!(close(division.height, 22.0), "{}", division.height);

        let head = division.head.unwrap();
        let tail = division.tail.unwrap();
        match (&head.kind, &tail.kind) {
            (
                ElementKind::Paragraph {
                    style: hs,
                    text: ht,
                    marks: hm,
                },
                ElementKind::Paragraph {
                    style: ts,
                    text: tt,
                    marks: tm,
                },
            ) => {
                assert_eq!(ht.as_str(), "aaaaabbbbb");
                assert_eq!(tt.as_str(), "cccccddddd");
                assert_eq!(ht.tags()[0].ranges, vec![(3, 10)]);
                assert_eq!(tt.tags()[0].ranges, vec![(0, 2)]);

                assert_eq!(hm.len(), 1);
                assert_eq!(tm[0].offset, 7);

                assert_eq!(hs.bottom_margin, 0.0);
                assert!(!hs.borders.bottom && hs.borders.top);
                assert_eq!(ts.top_margin, 0.0);
                assert_eq!(ts.first_indent, 0.0);
                assert_eq!(ts.bottom_margin, 3.0);
                assert!(!ts.borders.top && ts.borders.bottom);
            }
            other => panic!("expected two paragraphs, got {other:?}"),
        }
    }

    #[test]
    fn cell_paragraphs_defer_short_splits() {
        let cfg = config();
        let ctx = LayoutContext::new(&FiveByteLines, Resolution::uniform(2.54), &cfg);

        let mut cell = Element::cell(Default::default(), 1);
        cell.add_child(paragraph(ParagraphStyle::default())).unwrap();
        let para = cell.take_children().remove(0);

        let division = divide(para.clone(), &ctx, 100.0, 35.0).unwrap();
        assert!(division.head.is_none());
        assert_eq!(division.tail.unwrap(), para);

        let forced = divide(para, &ctx.with_force(true), 100.0, 35.0).unwrap();
        assert!(forced.is_split());
    }

    #[test]
    fn negative_indent_widens_the_text() {
        let cfg = config();
        let ctx = LayoutContext::new(&FiveByteLines, Resolution::uniform(2.54), &cfg);
        let style = ParagraphStyle {
            left_margin: 3.0,
            right_margin: 1.0,
            padding: 1.0,
            first_indent: -2.0,
            ..ParagraphStyle::default()
        };
        let geometry = ParagraphGeometry::new(&style, &ctx, 100.0);
        assert!(close(geometry.text_width, 96.0), "{}", geometry.text_width);
        assert!(close(geometry.text_x(), 2.0));
    }

    #[test]
    fn degenerate_measurements_are_errors() {
        struct NoLines;
        impl TextMeasurer for NoLines {
            fn measure(&self, _: &MeasureRequest<'_>) -> Result<TextMetrics> {
                Ok(TextMetrics::default())
            }
        }
        let cfg = config();
        let ctx = LayoutContext::new(&NoLines, Resolution::uniform(2.54), &cfg);
        let err = divide(paragraph(ParagraphStyle::default()), &ctx, 100.0, 100.0).unwrap_err();
        assert!(matches!(err, crate::error::QuireError::Measurement(_)));
    }
}
