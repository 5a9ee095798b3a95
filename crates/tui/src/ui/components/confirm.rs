use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::ui::theme::Theme;

/// Centered yes/no dialog for destructive actions.
pub fn render(frame: &mut Frame<'_>, area: Rect, prompt: &str, theme: &Theme) {
    let width = area.width.min(64);
    let height = 7u16.min(area.height);
    let rect = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };

    let lines = vec![
        Line::from(prompt.to_string()),
        Line::from(""),
        Line::from(vec![
            Span::styled("y", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)),
            Span::raw(" да    "),
            Span::styled("Esc", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)),
            Span::raw(" отмена"),
        ]),
    ];

    let block = Block::default()
        .title("Подтверждение")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.error));
    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        rect,
    );
}
