//! A surface that records every call, for tests and for dumping draw
//! operations as JSON from the command line.

use serde::Serialize;

use super::{DrawingSurface, Shadow, Stroke, TextBlock};
use crate::style::Color;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DrawOp {
    Save,
    Restore,
    Translate {
        dx: f64,
        dy: f64,
    },
    Rotate {
        degrees: f64,
    },
    ClipRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    StrokeLine {
        from: (f64, f64),
        to: (f64, f64),
        stroke: Stroke,
    },
    FillPolygon {
        points: Vec<(f64, f64)>,
        fill: Color,
        stroke: Stroke,
    },
    FillRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Color,
        #[serde(skip_serializing_if = "Option::is_none")]
        stroke: Option<Stroke>,
        #[serde(skip_serializing_if = "Option::is_none")]
        shadow: Option<Shadow>,
    },
    DrawText(TextBlock),
    DrawImage {
        path: String,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        crop: Option<[f64; 4]>,
    },
}

#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    ops: Vec<DrawOp>,
    depth: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<DrawOp> {
        self.ops
    }

    /// Whether every save has been matched by a restore.
    pub fn is_balanced(&self) -> bool {
        self.depth == 0
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(&self.ops)?)
    }
}

impl DrawingSurface for RecordingSurface {
    fn save(&mut self) {
        self.depth += 1;
        self.ops.push(DrawOp::Save);
    }

    fn restore(&mut self) {
        if self.depth == 0 {
            log::warn!("restore without a matching save");
        }
        self.depth = self.depth.saturating_sub(1);
        self.ops.push(DrawOp::Restore);
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.ops.push(DrawOp::Translate { dx, dy });
    }

    fn rotate(&mut self, degrees: f64) {
        self.ops.push(DrawOp::Rotate { degrees });
    }

    fn clip_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ops.push(DrawOp::ClipRect { x, y, width, height });
    }

    fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), stroke: &Stroke) {
        self.ops.push(DrawOp::StrokeLine {
            from,
            to,
            stroke: stroke.clone(),
        });
    }

    fn fill_polygon(&mut self, points: &[(f64, f64)], fill: Color, stroke: &Stroke) {
        self.ops.push(DrawOp::FillPolygon {
            points: points.to_vec(),
            fill,
            stroke: stroke.clone(),
        });
    }

    fn fill_rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Color,
        stroke: Option<&Stroke>,
        shadow: Option<Shadow>,
    ) {
        self.ops.push(DrawOp::FillRect {
            x,
            y,
            width,
            height,
            fill,
            stroke: stroke.cloned(),
            shadow,
        });
    }

    fn draw_text(&mut self, block: &TextBlock) {
        self.ops.push(DrawOp::DrawText(block.clone()));
    }

    fn draw_image(
        &mut self,
        path: &str,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        crop: Option<[f64; 4]>,
    ) {
        self.ops.push(DrawOp::DrawImage {
            path: path.to_string(),
            x,
            y,
            width,
            height,
            crop,
        });
    }
}
