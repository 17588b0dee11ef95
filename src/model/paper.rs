//! Page geometry and unit conversion.

use serde::{Deserialize, Serialize};

/// Device resolution. Converts physical lengths into device units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub dpi_x: f64,
    pub dpi_y: f64,
}

impl Default for Resolution {
    fn default() -> Self {
        // One device unit per point.
        Resolution::uniform(72.0)
    }
}

impl Resolution {
    pub fn uniform(dpi: f64) -> Self {
        Self { dpi_x: dpi, dpi_y: dpi }
    }

    pub fn cm_to_x(&self, cm: f64) -> f64 {
        cm * self.dpi_x / 2.54
    }

    pub fn cm_to_y(&self, cm: f64) -> f64 {
        cm * self.dpi_y / 2.54
    }

    pub fn pt_to_x(&self, pt: f64) -> f64 {
        pt * self.dpi_x / 72.0
    }

    pub fn pt_to_y(&self, pt: f64) -> f64 {
        pt * self.dpi_y / 72.0
    }
}

/// Usable page area in device units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSetup {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub resolution: Resolution,
}

impl PageSetup {
    pub fn new(width: f64, height: f64, resolution: Resolution) -> Self {
        Self {
            width,
            height,
            resolution,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Paper size, orientation and margins, all in centimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaperStyle {
    pub width: f64,
    pub height: f64,
    pub orientation: Orientation,
    pub left_margin: f64,
    pub right_margin: f64,
    pub top_margin: f64,
    pub bottom_margin: f64,
}

impl Default for PaperStyle {
    fn default() -> Self {
        // A4, 2.54 cm margins.
        Self {
            width: 21.0,
            height: 29.7,
            orientation: Orientation::Portrait,
            left_margin: 2.54,
            right_margin: 2.54,
            top_margin: 2.54,
            bottom_margin: 2.54,
        }
    }
}

impl PaperStyle {
    pub fn letter() -> Self {
        Self {
            width: 21.59,
            height: 27.94,
            ..Default::default()
        }
    }

    /// Usable width in centimetres, after orientation and margins.
    pub fn usable_width(&self) -> f64 {
        let (w, _) = self.oriented();
        (w - self.left_margin - self.right_margin).max(0.0)
    }

    pub fn usable_height(&self) -> f64 {
        let (_, h) = self.oriented();
        (h - self.top_margin - self.bottom_margin).max(0.0)
    }

    fn oriented(&self) -> (f64, f64) {
        match self.orientation {
            Orientation::Portrait => (self.width, self.height),
            Orientation::Landscape => (self.height, self.width),
        }
    }

    pub fn page_setup(&self, resolution: Resolution) -> PageSetup {
        PageSetup::new(
            resolution.cm_to_x(self.usable_width()),
            resolution.cm_to_y(self.usable_height()),
            resolution,
        )
    }
}
