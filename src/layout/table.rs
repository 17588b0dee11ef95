//! # Table Division
//!
//! Tables divide row by row, rows divide every cell at the same height and
//! cells divide their children top to bottom. A row that does not fit
//! whole splits into two rows of the same shape: each cell of the
//! continuation row is either the real tail of its cell or an empty
//! placeholder with the cell's span and borders, so columns stay aligned on
//! the next page.

use super::{divide, Division, LayoutContext};
use crate::error::Result;
use crate::model::{Element, ElementKind};
use crate::style::TableCellStyle;

fn cell_style_mut(element: &mut Element) -> Option<&mut TableCellStyle> {
    match &mut element.kind {
        ElementKind::Cell { style, .. } => Some(style),
        _ => None,
    }
}

/// Whether any cell of a row holds content.
fn has_content(row: &Element) -> bool {
    row.children().iter().any(|cell| !cell.children().is_empty())
}

pub(crate) fn divide_table(
    mut element: Element,
    ctx: &LayoutContext<'_>,
    width: f64,
    height: f64,
) -> Result<Division> {
    let table_width = match &element.kind {
        ElementKind::Table { style } => width * style.width / 100.0,
        _ => return Ok(Division::whole(element, 0.0)),
    };

    let mut rows = element.take_children().into_iter();
    let mut placed = Vec::new();
    let mut table_height = 0.0;
    let mut available = height;
    let mut continuation = None;

    while let Some(row) = rows.next() {
        let row_ctx = ctx.with_force(ctx.force && table_height == 0.0);
        let division = divide_row(row, &row_ctx, table_width, available)?;
        let row_height = division.height;

        match division.tail {
            None => {
                placed.extend(division.head);
                table_height += row_height;
                available -= row_height;
            }
            Some(tail) => {
                // A head row holding nothing is not worth drawing
                let head = division.head.filter(|head| row_height > 0.0 || has_content(head));
                if let Some(head) = head {
                    placed.push(head);
                    table_height += row_height;
                }
                let mut rest = vec![tail];
                rest.extend(rows.by_ref());
                continuation = Some(rest);
                break;
            }
        }
    }

    let Some(rest) = continuation else {
        element.set_children(placed);
        return Ok(Division::whole(element, table_height));
    };

    let mut next = element.shallow_clone();
    next.set_children(rest);

    if placed.is_empty() {
        log::debug!("moving table of {} rows to the next page", next.children().len());
        return Ok(Division::defer(next));
    }

    log::debug!(
        "splitting table after {} rows, {} continue",
        placed.len(),
        next.children().len()
    );
    element.set_children(placed);
    Ok(Division::split(element, next, table_height))
}

pub(crate) fn divide_row(
    mut element: Element,
    ctx: &LayoutContext<'_>,
    width: f64,
    height: f64,
) -> Result<Division> {
    let columns = match &element.kind {
        ElementKind::Row { columns, .. } => columns.clone(),
        _ => return Ok(Division::whole(element, 0.0)),
    };

    let mut slots = columns.iter();
    let mut heads = Vec::new();
    let mut tails = Vec::new();
    let mut divided = false;
    let mut row_height: f64 = 0.0;

    for cell in element.take_children() {
        let span = cell.span() as usize;
        let share: f64 = slots.by_ref().take(span).sum();
        let cell_width = share * width / 100.0;

        let placeholder = cell.shallow_clone();
        let division = divide_cell(cell, ctx, cell_width, height)?;
        row_height = row_height.max(division.height);

        match division.tail {
            Some(tail) => {
                divided = true;
                tails.push(tail);
            }
            None => tails.push(placeholder),
        }
        heads.extend(division.head);
    }

    if let ElementKind::Row { height: stored, .. } = &mut element.kind {
        *stored = row_height;
    }

    if !divided {
        element.set_children(heads);
        return Ok(Division::whole(element, row_height));
    }

    if row_height == 0.0 {
        // Nothing of this row is visible here: no stray borders either
        for cell in &mut heads {
            if let Some(style) = cell_style_mut(cell) {
                style.borders.top = false;
                style.borders.left = false;
                style.borders.right = false;
            }
        }
    }

    let mut next = element.shallow_clone();
    if let ElementKind::Row { height: stored, .. } = &mut next.kind {
        *stored = 0.0;
    }
    next.set_children(tails);
    element.set_children(heads);
    Ok(Division::split(element, next, row_height))
}

/// Divide a cell. The head cell is always returned, possibly empty.
pub(crate) fn divide_cell(
    mut element: Element,
    ctx: &LayoutContext<'_>,
    width: f64,
    height: f64,
) -> Result<Division> {
    let padding = match &element.kind {
        ElementKind::Cell { style, .. } => style.padding,
        _ => return Ok(Division::whole(element, 0.0)),
    };
    let h_padding = ctx.resolution.cm_to_x(padding);
    let v_padding = ctx.resolution.cm_to_y(padding);
    let inner_width = width - 2.0 * h_padding;
    let mut available = height - 2.0 * v_padding;

    let mut children = element.take_children().into_iter();
    let mut placed = Vec::new();
    let mut cell_height = 0.0;
    let mut continuation = None;

    while let Some(child) = children.next() {
        // Zero-height content does not use up the force
        let child_ctx = ctx.with_force(ctx.force && cell_height == 0.0);
        let division = divide(child, &child_ctx, inner_width, available)?;
        cell_height += division.height;
        available -= division.height;
        placed.extend(division.head);

        if let Some(tail) = division.tail {
            let mut rest = vec![tail];
            rest.extend(children.by_ref());
            continuation = Some(rest);
            break;
        }
    }

    if cell_height != 0.0 {
        cell_height += 2.0 * v_padding;
    }

    let Some(rest) = continuation else {
        element.set_children(placed);
        return Ok(Division::whole(element, cell_height));
    };

    let mut next = element.shallow_clone();
    if !placed.is_empty() {
        if let Some(style) = cell_style_mut(&mut next) {
            style.borders.top = false;
        }
    }
    if let Some(style) = cell_style_mut(&mut element) {
        style.borders.bottom = false;
    }
    next.set_children(rest);
    element.set_children(placed);
    Ok(Division::split(element, next, cell_height))
}
