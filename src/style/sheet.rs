//! Named style collections.
//!
//! Report code refers to styles by name ("Title", "Normal", "CellBorder");
//! the sheet maps those names onto style records. Lookups hand out clones
//! because elements own their styles: splitting a paragraph adjusts the
//! margins of each fragment independently.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{DrawStyle, ParagraphStyle, TableCellStyle, TableStyle};
use crate::error::{QuireError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleSheet {
    pub name: String,
    pub paragraph: BTreeMap<String, ParagraphStyle>,
    pub table: BTreeMap<String, TableStyle>,
    pub cell: BTreeMap<String, TableCellStyle>,
    pub draw: BTreeMap<String, DrawStyle>,
}

impl StyleSheet {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn add_paragraph_style(&mut self, name: &str, style: ParagraphStyle) {
        self.paragraph.insert(name.to_string(), style);
    }

    pub fn add_table_style(&mut self, name: &str, style: TableStyle) {
        self.table.insert(name.to_string(), style);
    }

    pub fn add_cell_style(&mut self, name: &str, style: TableCellStyle) {
        self.cell.insert(name.to_string(), style);
    }

    pub fn add_draw_style(&mut self, name: &str, style: DrawStyle) {
        self.draw.insert(name.to_string(), style);
    }

    pub fn paragraph_style(&self, name: &str) -> Result<ParagraphStyle> {
        lookup(&self.paragraph, "paragraph", name)
    }

    pub fn table_style(&self, name: &str) -> Result<TableStyle> {
        lookup(&self.table, "table", name)
    }

    pub fn cell_style(&self, name: &str) -> Result<TableCellStyle> {
        lookup(&self.cell, "cell", name)
    }

    pub fn draw_style(&self, name: &str) -> Result<DrawStyle> {
        lookup(&self.draw, "draw", name)
    }
}

fn lookup<T: Clone>(map: &BTreeMap<String, T>, kind: &'static str, name: &str) -> Result<T> {
    map.get(name).cloned().ok_or_else(|| QuireError::MissingStyle {
        kind,
        name: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_returns_independent_copies() {
        let mut sheet = StyleSheet::new("default");
        sheet.add_paragraph_style("Normal", ParagraphStyle::default());

        let mut a = sheet.paragraph_style("Normal").unwrap();
        a.top_margin = 3.0;
        let b = sheet.paragraph_style("Normal").unwrap();
        assert_eq!(b.top_margin, 0.0);
    }

    #[test]
    fn missing_styles_name_the_kind() {
        let sheet = StyleSheet::new("empty");
        let err = sheet.cell_style("Header").unwrap_err();
        assert_eq!(err.to_string(), "no cell style named \"Header\"");
    }
}
