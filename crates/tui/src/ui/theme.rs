use ratatui::style::Color;

/// Palette shared by every page.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    /// Highlighted table row.
    pub panel: Color,
    pub text: Color,
    pub dim: Color,
    pub accent: Color,
    pub border: Color,
    pub positive: Color,
    pub error: Color,
    /// Text drawn over a user-picked cell background. The palette is light.
    pub on_color: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            panel: Color::Rgb(28, 36, 48),
            text: Color::Rgb(222, 226, 230),
            dim: Color::Rgb(134, 142, 150),
            accent: Color::Rgb(77, 171, 247),
            border: Color::Rgb(73, 80, 87),
            positive: Color::Rgb(81, 207, 102),
            error: Color::Rgb(255, 107, 107),
            on_color: Color::Rgb(33, 37, 41),
        }
    }
}
