use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::{
    app::{AppState, OperatorField, SettingsMode},
    ui::theme::Theme,
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(0)])
        .split(columns[1]);

    render_operators(frame, columns[0], state, theme);
    render_editor(frame, right[0], state, theme);
    render_categories(frame, right[1], state, theme);
}

fn render_operators(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let settings = &state.settings;
    let items = settings
        .operators
        .iter()
        .map(|op| {
            let mut spans = vec![Span::raw(op.name.clone())];
            if let Some(description) = op.description.as_deref().filter(|d| !d.is_empty()) {
                spans.push(Span::styled(
                    format!("  {description}"),
                    Style::default().fg(theme.dim),
                ));
            }
            if op.is_global == Some(true) {
                spans.push(Span::styled("  общий", Style::default().fg(theme.accent)));
            }
            ListItem::new(Line::from(spans))
        })
        .collect::<Vec<_>>();

    let mut list_state = ListState::default();
    if !items.is_empty() {
        list_state.select(Some(settings.selected));
    }

    let list = List::new(items)
        .block(
            Block::default()
                .title(format!("Операторы ({})", settings.operators.len()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border)),
        )
        .highlight_style(
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("» ");
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn render_editor(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let settings = &state.settings;
    let title = match settings.mode {
        SettingsMode::List => {
            let hint = Line::styled(
                "n: новый оператор, e: изменить выбранного",
                Style::default().fg(theme.dim),
            );
            let block = Block::default()
                .title("Оператор")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border));
            frame.render_widget(Paragraph::new(hint).block(block), area);
            return;
        }
        SettingsMode::Create => "Новый оператор",
        SettingsMode::Edit(_) => "Изменение оператора",
    };

    let field = |label: &'static str, value: &str, focused: bool| {
        let style = if focused {
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.dim)
        };
        let cursor = if focused { "▏" } else { "" };
        Line::from(vec![
            Span::styled(format!("{label:<10}"), style),
            Span::raw(format!("{value}{cursor}")),
        ])
    };

    let mut lines = vec![
        field(
            "Название",
            &settings.name,
            settings.focus == OperatorField::Name,
        ),
        field(
            "Описание",
            &settings.description,
            settings.focus == OperatorField::Description,
        ),
    ];
    if let Some(error) = &settings.error {
        lines.push(Line::from(""));
        lines.push(Line::styled(error.as_str(), Style::default().fg(theme.error)));
    }

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_categories(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let items = state
        .settings
        .categories
        .iter()
        .map(|category| {
            let mut spans = vec![Span::raw(category.name.clone())];
            if let Some(description) = category.description.as_deref().filter(|d| !d.is_empty()) {
                spans.push(Span::styled(
                    format!("  {description}"),
                    Style::default().fg(theme.dim),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect::<Vec<_>>();

    let list = List::new(items).block(
        Block::default()
            .title("Категории")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border)),
    );
    frame.render_widget(list, area);
}
