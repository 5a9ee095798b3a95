use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::{
    app::{ToastLevel, ToastState},
    ui::theme::Theme,
};

const MAX_WIDTH: u16 = 60;

/// Notification box above the bottom bar, right-aligned.
pub fn render(frame: &mut Frame<'_>, area: Rect, toast: Option<&ToastState>, theme: &Theme) {
    let Some(toast) = toast else {
        return;
    };
    let (title, color) = match toast.level {
        ToastLevel::Info => ("", theme.text),
        ToastLevel::Success => (" Готово ", theme.positive),
        ToastLevel::Error => (" Ошибка ", theme.error),
    };

    let inner = MAX_WIDTH.min(area.width).saturating_sub(2).max(1);
    let text_width = Line::from(toast.message.as_str()).width() as u16;
    let rows = text_width.div_ceil(inner).max(1);
    let width = (text_width.min(inner) + 2).max(title.chars().count() as u16 + 2);
    let height = (rows + 2).min(area.height);
    let rect = Rect {
        x: area.x + area.width.saturating_sub(width + 1),
        y: area.y + area.height.saturating_sub(height + 1),
        width: width.min(area.width),
        height,
    };

    let style = Style::default().fg(color);
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(style);
    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(toast.message.as_str())
            .style(style)
            .wrap(Wrap { trim: true })
            .block(block),
        rect,
    );
}
