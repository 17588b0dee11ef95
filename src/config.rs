//! # Layout Configuration
//!
//! Tunables of the pagination engine. Every field has a default, so a
//! configuration file only needs to name what it changes:
//!
//! ```json
//! { "minCellSplitLines": 2, "fontFamilies": "freeFont" }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::style::FontFace;
use crate::text::WrapMode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    /// A paragraph inside a table cell is only split when at least this
    /// many of its lines fit on the current page.
    pub min_cell_split_lines: usize,
    /// Line spacing as a fraction of the font size.
    pub line_spacing_fraction: f64,
    /// Wrap mode requested from the text measurer.
    pub wrap: WrapMode,
    pub font_families: FontFamilies,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_cell_split_lines: 4,
            line_spacing_fraction: 0.2,
            wrap: WrapMode::WordChar,
            font_families: FontFamilies::default(),
        }
    }
}

impl LayoutConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Concrete family names for the three generic faces.
///
/// Deserializes either from a preset name (`"gnome"`, `"freeFont"`,
/// `"msTrueType"`) or from an explicit table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "FamiliesRepr")]
pub struct FontFamilies {
    pub serif: String,
    pub sans_serif: String,
    pub monospace: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FamiliesRepr {
    Preset(FamilyPreset),
    #[serde(rename_all = "camelCase")]
    Table {
        serif: String,
        sans_serif: String,
        monospace: String,
    },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
enum FamilyPreset {
    Gnome,
    FreeFont,
    MsTrueType,
}

impl From<FamiliesRepr> for FontFamilies {
    fn from(repr: FamiliesRepr) -> Self {
        match repr {
            FamiliesRepr::Preset(FamilyPreset::Gnome) => FontFamilies::gnome(),
            FamiliesRepr::Preset(FamilyPreset::FreeFont) => FontFamilies::free_font(),
            FamiliesRepr::Preset(FamilyPreset::MsTrueType) => FontFamilies::ms_truetype(),
            FamiliesRepr::Table {
                serif,
                sans_serif,
                monospace,
            } => FontFamilies {
                serif,
                sans_serif,
                monospace,
            },
        }
    }
}

impl Default for FontFamilies {
    fn default() -> Self {
        FontFamilies::gnome()
    }
}

impl FontFamilies {
    /// Fontconfig aliases, available on any desktop Linux.
    pub fn gnome() -> Self {
        Self::named("Serif", "Sans", "Monospace")
    }

    /// GNU FreeFont.
    pub fn free_font() -> Self {
        Self::named("FreeSerif", "FreeSans", "FreeMono")
    }

    /// Microsoft core fonts.
    pub fn ms_truetype() -> Self {
        Self::named("Times New Roman", "Arial", "Courier New")
    }

    fn named(serif: &str, sans_serif: &str, monospace: &str) -> Self {
        Self {
            serif: serif.to_string(),
            sans_serif: sans_serif.to_string(),
            monospace: monospace.to_string(),
        }
    }

    pub fn family(&self, face: FontFace) -> &str {
        match face {
            FontFace::Serif => &self.serif,
            FontFace::SansSerif => &self.sans_serif,
            FontFace::Monospace => &self.monospace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = LayoutConfig::default();
        assert_eq!(cfg.min_cell_split_lines, 4);
        assert!((cfg.line_spacing_fraction - 0.2).abs() < 1e-12);
        assert_eq!(cfg.wrap, WrapMode::WordChar);
        assert_eq!(cfg.font_families.family(FontFace::SansSerif), "Sans");
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let cfg = LayoutConfig::from_json(r#"{ "minCellSplitLines": 2 }"#).unwrap();
        assert_eq!(cfg.min_cell_split_lines, 2);
        assert_eq!(cfg.wrap, WrapMode::WordChar);
    }

    #[test]
    fn families_accept_presets_and_tables() {
        let cfg = LayoutConfig::from_json(r#"{ "fontFamilies": "msTrueType" }"#).unwrap();
        assert_eq!(cfg.font_families.family(FontFace::Monospace), "Courier New");

        let cfg = LayoutConfig::from_json(
            r#"{ "fontFamilies": { "serif": "A", "sansSerif": "B", "monospace": "C" } }"#,
        )
        .unwrap();
        assert_eq!(cfg.font_families.family(FontFace::SansSerif), "B");
    }

    #[test]
    fn bad_config_reports_a_parse_error() {
        let err = LayoutConfig::from_json(r#"{ "wrap": 3 }"#).unwrap_err();
        assert!(err.to_string().starts_with("failed to parse input"));
    }
}
