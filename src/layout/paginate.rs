//! # Page Assembly
//!
//! Pulls top-level elements off a queue and fills pages with their heads.
//! A tail goes back to the front of the queue and closes the page; so does
//! an element that produced no head at all (a page break, or something that
//! did not fit). The first element on an empty page is divided with
//! `force` set, which guarantees every step either places content or
//! consumes a page break.
//!
//! Pagination is resumable: [`Paginator::step`] handles one element, and
//! pages assembled so far stay valid whenever the caller stops.

use std::collections::VecDeque;

use serde::Serialize;

use super::{divide, LayoutContext};
use crate::config::LayoutConfig;
use crate::error::Result;
use crate::model::{Element, ElementKind, ElementType, IndexMark, PageSetup};
use crate::text::TextMeasurer;

const OVERFLOW_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PaginationStatus {
    Paginating,
    Done,
}

/// Something pagination had to accept rather than fix.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LayoutWarning {
    /// An element taller than an empty page was placed on it anyway.
    #[serde(rename_all = "camelCase")]
    Oversized {
        page: usize,
        element: ElementType,
        height: f64,
        available: f64,
    },
}

/// One assembled page: the top-level elements placed on it, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    elements: Vec<Element>,
}

impl Page {
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Index marks on this page, in document order.
    pub fn marks(&self) -> Vec<&IndexMark> {
        let mut marks = Vec::new();
        for element in self.elements.iter().flat_map(Element::descendants) {
            match &element.kind {
                ElementKind::Paragraph { marks: placed, .. } => {
                    marks.extend(placed.iter().map(|p| &p.mark));
                }
                ElementKind::TextLabel { mark: Some(mark), .. } => marks.push(mark),
                _ => {}
            }
        }
        marks
    }

    pub fn has_toc(&self) -> bool {
        self.elements
            .iter()
            .any(|e| e.element_type() == ElementType::TableOfContents)
    }

    pub fn has_index(&self) -> bool {
        self.elements
            .iter()
            .any(|e| e.element_type() == ElementType::AlphabeticalIndex)
    }
}

/// The finished pages of a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pages {
    pages: Vec<Page>,
}

impl Pages {
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Page> {
        self.pages.iter()
    }

    /// Every index mark with the zero-based page it landed on.
    pub fn marks(&self) -> Vec<(usize, &IndexMark)> {
        self.pages
            .iter()
            .enumerate()
            .flat_map(|(i, page)| page.marks().into_iter().map(move |m| (i, m)))
            .collect()
    }

    pub fn has_toc(&self) -> bool {
        self.pages.iter().any(Page::has_toc)
    }

    pub fn has_index(&self) -> bool {
        self.pages.iter().any(Page::has_index)
    }

    pub fn into_vec(self) -> Vec<Page> {
        self.pages
    }
}

impl IntoIterator for Pages {
    type Item = Page;
    type IntoIter = std::vec::IntoIter<Page>;

    fn into_iter(self) -> Self::IntoIter {
        self.pages.into_iter()
    }
}

impl<'p> IntoIterator for &'p Pages {
    type Item = &'p Page;
    type IntoIter = std::slice::Iter<'p, Page>;

    fn into_iter(self) -> Self::IntoIter {
        self.pages.iter()
    }
}

/// Resumable page assembler.
pub struct Paginator<'a> {
    root: Option<Element>,
    queue: VecDeque<Element>,
    setup: PageSetup,
    ctx: LayoutContext<'a>,
    pages: Vec<Page>,
    available: f64,
    warnings: Vec<LayoutWarning>,
    status: PaginationStatus,
}

impl<'a> Paginator<'a> {
    /// Paginate the children of `root`, usually a document root element.
    pub fn new(
        root: Element,
        setup: PageSetup,
        measurer: &'a dyn TextMeasurer,
        config: &'a LayoutConfig,
    ) -> Self {
        Self {
            root: Some(root),
            queue: VecDeque::new(),
            setup,
            ctx: LayoutContext::new(measurer, setup.resolution, config),
            pages: Vec::new(),
            available: setup.height,
            warnings: Vec::new(),
            status: PaginationStatus::Paginating,
        }
    }

    pub fn status(&self) -> PaginationStatus {
        self.status
    }

    /// Pages assembled so far. The last one may still be filling.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn warnings(&self) -> &[LayoutWarning] {
        &self.warnings
    }

    /// Place (part of) the next element.
    pub fn step(&mut self) -> Result<PaginationStatus> {
        if let Some(mut root) = self.root.take() {
            self.queue = root.take_children().into();
            log::debug!(
                "paginating {} elements on {:.1}x{:.1} pages",
                self.queue.len(),
                self.setup.width,
                self.setup.height
            );
            self.open_page();
        }

        let Some(element) = self.queue.pop_front() else {
            self.status = PaginationStatus::Done;
            return Ok(self.status);
        };

        let page_empty = self.current_page_is_empty();
        let element_type = element.element_type();
        let ctx = self.ctx.with_force(page_empty);
        let division = divide(element, &ctx, self.setup.width, self.available)?;

        let placed = division.head.is_some();
        if let Some(head) = division.head {
            if division.height > self.available + OVERFLOW_TOLERANCE {
                let warning = LayoutWarning::Oversized {
                    page: self.pages.len().saturating_sub(1),
                    element: element_type,
                    height: division.height,
                    available: self.available,
                };
                log::warn!(
                    "{element_type:?} of height {:.1} overflows page {} ({:.1} available)",
                    division.height,
                    self.pages.len(),
                    self.available
                );
                self.warnings.push(warning);
            }
            self.available -= division.height;
            if let Some(page) = self.pages.last_mut() {
                page.elements.push(head);
            }
        }

        let continues = division.tail.is_some();
        if let Some(tail) = division.tail {
            self.queue.push_front(tail);
        }
        if continues || !placed {
            self.open_page();
        }

        if self.queue.is_empty() {
            self.status = PaginationStatus::Done;
        }
        Ok(self.status)
    }

    /// Step until every element is placed.
    pub fn run(&mut self) -> Result<()> {
        while self.step()? == PaginationStatus::Paginating {}
        log::debug!("paginated into {} pages", self.pages.len());
        Ok(())
    }

    pub fn into_pages(self) -> Pages {
        Pages { pages: self.pages }
    }

    fn open_page(&mut self) {
        self.pages.push(Page::default());
        self.available = self.setup.height;
    }

    fn current_page_is_empty(&self) -> bool {
        self.pages.last().map_or(true, Page::is_empty)
    }
}

/// Paginate `root` to completion.
pub fn paginate(
    root: Element,
    setup: PageSetup,
    measurer: &dyn TextMeasurer,
    config: &LayoutConfig,
) -> Result<(Pages, Vec<LayoutWarning>)> {
    let mut paginator = Paginator::new(root, setup, measurer, config);
    paginator.run()?;
    let warnings = paginator.warnings.clone();
    Ok((paginator.into_pages(), warnings))
}
