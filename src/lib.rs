//! # Quire
//!
//! A flowed-document pagination engine.
//!
//! Reports are authored as a tree of paragraphs, tables, pictures and
//! fixed-size drawing frames. Quire cuts that tree into pages: every element
//! knows how to divide itself into the part that fits in the space left on
//! the current page and the part that continues on the next one. Paragraphs
//! split between lines, tables between rows, and a row splits all of its
//! cells at once so the columns stay aligned across the break.
//!
//! Quire never shapes text itself. Line breaking is delegated to a
//! [`TextMeasurer`](text::TextMeasurer), and painting to a
//! [`DrawingSurface`](draw::DrawingSurface), so the same layout can drive a
//! screen preview, a PDF writer or a test recorder.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON / DocumentBuilder)
//!       ↓
//!   [model]    Document tree, allowed children, index marks
//!       ↓
//!   [style]    Paragraph, table, cell, frame and draw styles
//!       ↓
//!   [layout]   divide() per element, Paginator assembles pages
//!       ↓            ↑ [text] measurer answers line geometry
//!   [draw]     Pages issue primitive calls on a surface
//! ```

pub mod config;
pub mod draw;
pub mod error;
pub mod layout;
pub mod model;
pub mod style;
pub mod text;

pub use config::LayoutConfig;
pub use error::{QuireError, Rejected, Result};
pub use layout::{LayoutWarning, Page, Pages, PaginationStatus, Paginator};
pub use model::{
    Document, DocumentBuilder, Element, ElementKind, ElementType, PageSetup, Resolution,
};

use text::TextMeasurer;

/// Paginate a document on its own paper at the given resolution.
pub fn paginate(
    document: Document,
    resolution: Resolution,
    measurer: &dyn TextMeasurer,
    config: &LayoutConfig,
) -> Result<(Pages, Vec<LayoutWarning>)> {
    let setup = document.paper.page_setup(resolution);
    layout::paginate::paginate(document.root, setup, measurer, config)
}
