//! # Drawing
//!
//! Walks a finished page and issues primitive calls on a [`DrawingSurface`].
//! Every element draws itself with its top-left corner at the current
//! origin and returns the vertical space it occupied; containers translate
//! the origin between children.
//!
//! Coordinates are device units with y growing downwards. Text is handed to
//! the surface as a whole block so the surface can lay it out with the
//! same engine that measured it.

pub mod recording;

pub use recording::{DrawOp, RecordingSurface};

use serde::Serialize;

use crate::error::Result;
use crate::layout::paragraph::{self, ParagraphGeometry};
use crate::layout::{LayoutContext, Page};
use crate::model::{Element, ElementKind, VerticalAlign};
use crate::style::{Alignment, Color, DrawStyle, HorizontalAlign, TableCellStyle};
use crate::text::{FontDescription, MeasureRequest, StyledText, WrapMode};

/// Line stroke parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stroke {
    pub width: f64,
    pub color: Color,
    /// Alternating on/off lengths; empty for a solid line.
    pub dash: Vec<f64>,
}

impl Stroke {
    pub fn solid(width: f64, color: Color) -> Self {
        Self {
            width,
            color,
            dash: Vec::new(),
        }
    }

    fn from_style(style: &DrawStyle, color: Color) -> Self {
        Self {
            width: style.line_width,
            color,
            dash: style.line_style.dash_pattern().to_vec(),
        }
    }
}

/// A filled copy of a shape painted first, offset down and right.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Shadow {
    pub dx: f64,
    pub dy: f64,
    pub color: Color,
}

/// A block of styled text for the surface to lay out and paint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    pub text: StyledText,
    pub font: FontDescription,
    pub color: Color,
    pub underline: bool,
    /// Top-left corner of the block.
    pub x: f64,
    pub y: f64,
    /// Wrap width; `None` paints the text unwrapped.
    pub width: Option<f64>,
    pub alignment: Alignment,
    pub indent: f64,
    pub spacing: f64,
    pub tabs: Vec<f64>,
    pub wrap: WrapMode,
}

/// The drawing primitives a page needs.
pub trait DrawingSurface {
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, dx: f64, dy: f64);
    /// Rotate the coordinate system clockwise by `degrees`.
    fn rotate(&mut self, degrees: f64);
    fn clip_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), stroke: &Stroke);
    fn fill_polygon(&mut self, points: &[(f64, f64)], fill: Color, stroke: &Stroke);
    #[allow(clippy::too_many_arguments)]
    fn fill_rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Color,
        stroke: Option<&Stroke>,
        shadow: Option<Shadow>,
    );
    fn draw_text(&mut self, block: &TextBlock);
    /// `crop` is `[left, top, right, bottom]` in percent of the source.
    fn draw_image(
        &mut self,
        path: &str,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        crop: Option<[f64; 4]>,
    );
}

/// Draw the elements of one page top to bottom. Returns the height used.
pub fn draw_page(
    page: &Page,
    surface: &mut dyn DrawingSurface,
    ctx: &LayoutContext<'_>,
    width: f64,
) -> Result<f64> {
    stack(page.elements(), surface, ctx, width)
}

/// Draw `element` at the current origin within `width`.
pub fn draw(
    element: &Element,
    surface: &mut dyn DrawingSurface,
    ctx: &LayoutContext<'_>,
    width: f64,
) -> Result<f64> {
    let res = ctx.resolution;
    match &element.kind {
        ElementKind::Document => stack(element.children(), surface, ctx, width),
        ElementKind::Paragraph { style, text, .. } => {
            let geometry = ParagraphGeometry::new(style, ctx, width);
            let metrics = paragraph::measure(style, text, ctx, &geometry)?;
            let height = metrics.height
                + geometry.spacing
                + geometry.top
                + 2.0 * geometry.v_padding
                + geometry.bottom;

            let (l, r, t, b) = (geometry.left, geometry.right, geometry.top, geometry.bottom);
            if let Some(background) = style.background {
                surface.fill_rect(l, t, width - l - r, height - t - b, background, None, None);
            }

            let font = FontDescription::resolve(&style.font, &ctx.config.font_families);
            surface.draw_text(&TextBlock {
                text: text.clone(),
                font,
                color: style.font.color,
                underline: style.font.underline,
                x: geometry.text_x(),
                y: t + geometry.v_padding + geometry.spacing * 0.75,
                width: Some(geometry.text_width.max(0.0)),
                alignment: style.alignment,
                indent: geometry.indent,
                spacing: geometry.spacing,
                tabs: style.tabs.iter().map(|&tab| res.cm_to_x(tab)).collect(),
                wrap: ctx.config.wrap,
            });

            let stroke = Stroke::solid(1.0, Color::BLACK);
            let borders = style.borders;
            if borders.top {
                surface.stroke_line((l, t), (width - r, t), &stroke);
            }
            if borders.right {
                surface.stroke_line((width - r, t), (width - r, height - b), &stroke);
            }
            if borders.bottom {
                surface.stroke_line((l, height - b), (width - r, height - b), &stroke);
            }
            if borders.left {
                surface.stroke_line((l, t), (l, height - b), &stroke);
            }
            Ok(height)
        }
        ElementKind::Table { style } => {
            stack(element.children(), surface, ctx, width * style.width / 100.0)
        }
        ElementKind::Row { columns, height } => {
            let mut slots = columns.iter();
            let mut x = 0.0;
            for cell in element.children() {
                let share: f64 = slots.by_ref().take(cell.span() as usize).sum();
                let cell_width = share * width / 100.0;
                surface.save();
                surface.translate(x, 0.0);
                draw_cell(cell, surface, ctx, cell_width, Some(*height))?;
                surface.restore();
                x += cell_width;
            }
            Ok(*height)
        }
        ElementKind::Cell { .. } => draw_cell(element, surface, ctx, width, None),
        ElementKind::Picture {
            path,
            width: w,
            height: h,
            align,
            crop,
        } => {
            let image_width = res.cm_to_x(*w);
            let image_height = res.cm_to_y(*h);
            let x = match align {
                HorizontalAlign::Left => 0.0,
                HorizontalAlign::Right => width - image_width,
                HorizontalAlign::Center => (width - image_width) / 2.0,
            };
            surface.draw_image(path, x, 0.0, image_width, image_height, *crop);
            Ok(image_height)
        }
        ElementKind::Frame { style } => {
            let frame_width = res.cm_to_x(style.width);
            let frame_height = res.cm_to_y(style.height);
            let left = res.cm_to_x(style.spacing.left);
            let right = res.cm_to_x(style.spacing.right);
            let top = res.cm_to_y(style.spacing.top);
            let bottom = res.cm_to_y(style.spacing.bottom);
            let x = match style.align {
                HorizontalAlign::Left => left,
                HorizontalAlign::Right => width - right - frame_width,
                HorizontalAlign::Center => (width - frame_width) / 2.0,
            };

            surface.save();
            surface.translate(x, top);
            surface.clip_rect(0.0, 0.0, frame_width, frame_height);
            // Shapes are positioned absolutely inside the frame
            for child in element.children() {
                draw(child, surface, ctx, frame_width)?;
            }
            surface.restore();
            Ok(frame_height + top + bottom)
        }
        ElementKind::Line { style, start, end } => {
            let from = (res.cm_to_x(start.0), res.cm_to_y(start.1));
            let to = (res.cm_to_x(end.0), res.cm_to_y(end.1));
            surface.stroke_line(from, to, &Stroke::from_style(style, style.color));
            Ok(0.0)
        }
        ElementKind::Polygon { style, path } => {
            let points: Vec<(f64, f64)> = path
                .iter()
                .map(|&(x, y)| (res.cm_to_x(x), res.cm_to_y(y)))
                .collect();
            let stroke = Stroke::from_style(style, style.color);
            surface.fill_polygon(&points, style.fill_color, &stroke);
            Ok(0.0)
        }
        ElementKind::Box {
            style,
            x,
            y,
            width: w,
            height: h,
        } => {
            let shadow = style.shadow.then(|| Shadow {
                dx: res.cm_to_x(style.shadow_space),
                dy: res.cm_to_y(style.shadow_space),
                color: Color::SHADOW,
            });
            surface.fill_rect(
                res.cm_to_x(*x),
                res.cm_to_y(*y),
                res.cm_to_x(*w),
                res.cm_to_y(*h),
                style.fill_color,
                Some(&Stroke::from_style(style, Color::BLACK)),
                shadow,
            );
            Ok(0.0)
        }
        ElementKind::TextLabel {
            style,
            valign,
            text,
            x,
            y,
            angle,
            ..
        } => {
            let font = FontDescription::resolve(&style.font, &ctx.config.font_families);
            let text = StyledText::plain(text);
            let metrics = ctx.measurer.measure(&MeasureRequest {
                font: &font,
                text: &text,
                width: None,
                wrap: ctx.config.wrap,
                indent: 0.0,
                spacing: 0.0,
                tabs: &[],
                alignment: style.alignment,
                resolution: res,
            })?;
            metrics.validate(text.as_str())?;

            let align_x = match style.alignment {
                Alignment::Left => 0.0,
                Alignment::Right => -metrics.width,
                Alignment::Center | Alignment::Justify => -metrics.width / 2.0,
            };
            let align_y = match valign {
                VerticalAlign::Top => 0.0,
                VerticalAlign::Center => -metrics.height / 2.0,
                VerticalAlign::Bottom => -metrics.height,
            };

            surface.save();
            surface.translate(res.cm_to_x(*x), res.cm_to_y(*y));
            if *angle != 0.0 {
                surface.rotate(*angle);
            }
            surface.draw_text(&TextBlock {
                text,
                font,
                color: style.font.color,
                underline: style.font.underline,
                x: align_x,
                y: align_y,
                width: None,
                alignment: style.alignment,
                indent: 0.0,
                spacing: 0.0,
                tabs: Vec::new(),
                wrap: ctx.config.wrap,
            });
            surface.restore();
            Ok(metrics.height)
        }
        ElementKind::PageBreak
        | ElementKind::TableOfContents
        | ElementKind::AlphabeticalIndex => Ok(0.0),
    }
}

fn stack(
    children: &[Element],
    surface: &mut dyn DrawingSurface,
    ctx: &LayoutContext<'_>,
    width: f64,
) -> Result<f64> {
    let mut y = 0.0;
    for child in children {
        surface.save();
        surface.translate(0.0, y);
        y += draw(child, surface, ctx, width)?;
        surface.restore();
    }
    Ok(y)
}

/// Draw a cell. Borders run to `row_height` when the cell sits in a row.
fn draw_cell(
    cell: &Element,
    surface: &mut dyn DrawingSurface,
    ctx: &LayoutContext<'_>,
    width: f64,
    row_height: Option<f64>,
) -> Result<f64> {
    let (borders, padding) = match &cell.kind {
        ElementKind::Cell {
            style: TableCellStyle { borders, padding },
            ..
        } => (*borders, *padding),
        _ => return Ok(0.0),
    };
    let h_padding = ctx.resolution.cm_to_x(padding);
    let v_padding = ctx.resolution.cm_to_y(padding);

    surface.save();
    surface.translate(h_padding, v_padding);
    let content = stack(cell.children(), surface, ctx, width - 2.0 * h_padding)?;
    surface.restore();

    let content_height = if content > 0.0 { content + 2.0 * v_padding } else { 0.0 };
    let height = row_height.unwrap_or(content_height);

    let stroke = Stroke::solid(1.0, Color::BLACK);
    if borders.top {
        surface.stroke_line((0.0, 0.0), (width, 0.0), &stroke);
    }
    if borders.right {
        surface.stroke_line((width, 0.0), (width, height), &stroke);
    }
    if borders.bottom {
        surface.stroke_line((0.0, height), (width, height), &stroke);
    }
    if borders.left {
        surface.stroke_line((0.0, 0.0), (0.0, height), &stroke);
    }
    Ok(height)
}
