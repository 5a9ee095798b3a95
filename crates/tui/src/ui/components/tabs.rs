use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::{app::Page, ui::theme::Theme};

/// Page tabs, numbered by the digit that opens them.
pub fn render_tabs(frame: &mut Frame<'_>, area: Rect, active: Page, theme: &Theme) {
    let spans: Vec<Span> = Page::ALL
        .into_iter()
        .zip(1..)
        .flat_map(|(page, digit)| {
            let style = if page == active {
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else {
                Style::default().fg(theme.dim)
            };
            [
                Span::raw(" "),
                Span::styled(format!("{digit}"), Style::default().fg(theme.border)),
                Span::styled(format!(" {} ", page.label()), style),
            ]
        })
        .collect();

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(theme.border));
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}
