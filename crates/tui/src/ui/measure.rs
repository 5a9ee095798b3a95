//! Text measurement in terminal cells.

use engine::table::{Font, TextMeasurer};
use ratatui::text::Line;

/// Measures display width in cells and scales it to pixels, so layout
/// widths stay comparable with the ones the web client stores.
#[derive(Debug, Clone, Copy)]
pub struct CellMeasurer {
    cell_width_px: u16,
}

impl CellMeasurer {
    pub fn new(cell_width_px: u16) -> Self {
        Self {
            cell_width_px: cell_width_px.max(1),
        }
    }

    pub fn font(&self) -> Font {
        Font {
            family: "terminal".to_string(),
            size_px: f64::from(self.cell_width_px) * 2.0,
            bold: false,
        }
    }

    /// Terminal columns needed to show `width_px`; at least one.
    pub fn cells(&self, width_px: u32) -> u16 {
        let cells = width_px.div_ceil(u32::from(self.cell_width_px));
        u16::try_from(cells).unwrap_or(u16::MAX).max(1)
    }
}

impl TextMeasurer for CellMeasurer {
    /// Bold text takes the same cells as regular text.
    fn measure(&self, text: &str, _font: &Font) -> f64 {
        Line::from(text).width() as f64 * f64::from(self.cell_width_px)
    }
}
