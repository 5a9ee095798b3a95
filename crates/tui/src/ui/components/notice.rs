use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::Style,
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::ui::theme::Theme;

/// Full-page message shown instead of data when the client is not usable.
pub fn render(frame: &mut Frame<'_>, area: Rect, message: &str, theme: &Theme) {
    let lines = vec![
        Line::from(""),
        Line::styled(message.to_string(), Style::default().fg(theme.error)),
        Line::from(""),
        Line::styled(
            "Укажите telegram_id в config/tbcparcer.toml, TBCPARCER__TELEGRAM_ID или --telegram-id",
            Style::default().fg(theme.dim),
        ),
    ];
    let block = Block::default()
        .title("Конфигурация")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.error));
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        area,
    );
}
