use engine::{datetime, table::format_number};
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::{app::AppState, ui::theme::Theme};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let trash = &state.trash;
    let title = format!("Корзина ({})", trash.items.len());
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border));

    if trash.items.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::styled("Корзина пуста", Style::default().fg(theme.dim)))
                .alignment(Alignment::Center)
                .block(block),
            area,
        );
        return;
    }

    let items = trash
        .items
        .iter()
        .map(|tx| {
            let when = tx
                .date_time
                .as_deref()
                .map(datetime::format_date_time)
                .unwrap_or_default();
            let amount = format!("{} {}", format_number(tx.amount), tx.currency);
            let text = format!(
                "{when:<16}  {amount:>18}  {:<20}  {}",
                tx.operator_seller, tx.description
            );
            ListItem::new(Line::from(text))
        })
        .collect::<Vec<_>>();

    let mut list_state = ListState::default();
    list_state.select(Some(trash.selected));

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("» ");

    frame.render_stateful_widget(list, area, &mut list_state);
}
