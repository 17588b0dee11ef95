//! # Pagination Engine
//!
//! Every element knows how to *divide* itself against a box of available
//! width and height: the part that fits (the head), the part that must go to
//! the next page (the tail), and the height the head occupies.
//!
//! ```text
//! divide(element, ctx, width, height)
//!     -> Division { head: Some(e),  tail: None,     height }   fits
//!     -> Division { head: None,     tail: Some(e),  height: 0 } deferred
//!     -> Division { head: Some(h),  tail: Some(t),  height }   split
//!     -> Division { head: None,     tail: None,     height: 0 } page break
//! ```
//!
//! `divide` consumes its input. The head and tail are new owners of the
//! original content; nothing is copied except styles.

pub mod atomic;
pub mod page_break;
pub mod paginate;
pub mod paragraph;
pub mod table;

pub use page_break::BreakDecision;
pub use paginate::{LayoutWarning, Page, Pages, PaginationStatus, Paginator};

use crate::config::LayoutConfig;
use crate::error::Result;
use crate::model::{Element, ElementKind, Resolution};
use crate::text::TextMeasurer;

/// Everything a divide or draw needs besides the element itself.
#[derive(Clone, Copy)]
pub struct LayoutContext<'a> {
    pub measurer: &'a dyn TextMeasurer,
    pub resolution: Resolution,
    pub config: &'a LayoutConfig,
    /// The element is first on an empty page: deferring it cannot help.
    pub force: bool,
}

impl<'a> LayoutContext<'a> {
    pub fn new(
        measurer: &'a dyn TextMeasurer,
        resolution: Resolution,
        config: &'a LayoutConfig,
    ) -> Self {
        Self {
            measurer,
            resolution,
            config,
            force: false,
        }
    }

    pub fn with_force(self, force: bool) -> Self {
        Self { force, ..self }
    }
}

/// The outcome of dividing one element.
#[derive(Debug, Clone, PartialEq)]
pub struct Division {
    pub head: Option<Element>,
    pub tail: Option<Element>,
    /// Height of the head in device units.
    pub height: f64,
}

impl Division {
    pub fn whole(element: Element, height: f64) -> Self {
        Self {
            head: Some(element),
            tail: None,
            height,
        }
    }

    pub fn defer(element: Element) -> Self {
        Self {
            head: None,
            tail: Some(element),
            height: 0.0,
        }
    }

    pub fn split(head: Element, tail: Element, height: f64) -> Self {
        Self {
            head: Some(head),
            tail: Some(tail),
            height,
        }
    }

    pub fn page_break() -> Self {
        Self {
            head: None,
            tail: None,
            height: 0.0,
        }
    }

    pub fn is_split(&self) -> bool {
        self.head.is_some() && self.tail.is_some()
    }
}

/// Divide `element` against the available box.
pub fn divide(
    element: Element,
    ctx: &LayoutContext<'_>,
    width: f64,
    height: f64,
) -> Result<Division> {
    log::trace!(
        "divide {:?} in {width:.1}x{height:.1}{}",
        element.element_type(),
        if ctx.force { " (forced)" } else { "" }
    );
    match &element.kind {
        ElementKind::Paragraph { .. } => paragraph::divide(element, ctx, width, height),
        ElementKind::Table { .. } => table::divide_table(element, ctx, width, height),
        ElementKind::Row { .. } => table::divide_row(element, ctx, width, height),
        ElementKind::Cell { .. } => table::divide_cell(element, ctx, width, height),
        _ => Ok(atomic::divide(element, ctx, height)),
    }
}
