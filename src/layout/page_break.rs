//! # Page Break Decisions
//!
//! Where to cut a measured paragraph. The rules here are what keep a lone
//! line from being stranded at the bottom of a page or a table cell.

use crate::text::TextMetrics;

/// What to do with a paragraph against the space left on the page.
#[derive(Debug, Clone, PartialEq)]
pub enum BreakDecision {
    /// Place the whole paragraph here.
    Place,
    /// Move the whole paragraph to the next page.
    MoveToNextPage,
    /// Keep the first lines here, continue on the next page.
    Split {
        /// How many lines fit on the current page.
        items_on_current_page: usize,
    },
}

/// Decide how a paragraph with the given line geometry meets
/// `available` units of text height.
///
/// The whole paragraph fits when `height + spacing <= available`, the
/// height it then occupies. A line range fits when
/// `bottom - first.top + 2 * spacing <= available`. With `min_lines > 0` a
/// split keeping fewer lines than that is refused. Under `force` the
/// paragraph is never deferred: at least its first line is kept.
pub fn decide_line_split(
    metrics: &TextMetrics,
    available: f64,
    spacing: f64,
    min_lines: usize,
    force: bool,
) -> BreakDecision {
    // Easy case: everything fits
    if metrics.height + spacing <= available {
        return BreakDecision::Place;
    }

    let deferred = if force {
        BreakDecision::Place
    } else {
        BreakDecision::MoveToNextPage
    };

    let lines = &metrics.lines;
    let Some(first) = lines.first() else {
        return deferred;
    };
    // A single line cannot be divided
    if lines.len() == 1 {
        return deferred;
    }

    // The last line always goes to the next page: the whole did not fit
    let fit_count = lines
        .iter()
        .take(lines.len() - 1)
        .take_while(|line| line.bottom - first.top + 2.0 * spacing <= available)
        .count();

    if fit_count == 0 {
        if force {
            return BreakDecision::Split {
                items_on_current_page: 1,
            };
        }
        return BreakDecision::MoveToNextPage;
    }

    if fit_count < min_lines && !force {
        return BreakDecision::MoveToNextPage;
    }

    BreakDecision::Split {
        items_on_current_page: fit_count,
    }
}
