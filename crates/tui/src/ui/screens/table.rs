use api_types::formatting::Alignment as ColumnAlignment;
use engine::{Column, FilterField, Transaction, table::format_cell};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};

use crate::{
    app::{AppState, TableMode, is_choice_filter},
    ui::theme::Theme,
};

const COLUMN_SPACING: u16 = 1;
const FILTER_PANEL_WIDTH: u16 = 42;

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let edit_height = if state.table.mode == TableMode::Edit { 3 } else { 0 };
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(edit_height),
        ])
        .split(area);

    render_filter_bar(frame, layout[0], state, theme);

    let body = if state.table.mode == TableMode::Filter {
        let split = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(FILTER_PANEL_WIDTH)])
            .split(layout[1]);
        render_filter_panel(frame, split[1], state, theme);
        split[0]
    } else {
        layout[1]
    };

    render_table(frame, body, state, theme);
    if state.table.mode == TableMode::Edit {
        render_edit_line(frame, layout[2], state, theme);
    }
}

fn render_filter_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let filters = state.list.filters();
    let cursor = if state.table.mode == TableMode::Search {
        "▏"
    } else {
        ""
    };
    let mut spans = vec![
        Span::styled("Поиск", Style::default().fg(theme.dim)),
        Span::raw(format!(": {}{cursor}   ", filters.search)),
        Span::styled("Показано", Style::default().fg(theme.dim)),
        Span::raw(format!(
            ": {} из {}",
            state.list.visible().len(),
            state.list.all().len()
        )),
    ];
    if filters.is_active() {
        spans.push(Span::styled(
            "   фильтры активны (Esc сброс)",
            Style::default().fg(theme.accent),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_filter_panel(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let filters = state.list.filters();
    let focused = state.table.focused_filter();
    let lines: Vec<Line> = FilterField::ALL
        .into_iter()
        .map(|field| {
            let value = filters.get(field);
            let shown = match (value.is_empty(), is_choice_filter(field)) {
                (true, true) => "все".to_string(),
                (true, false) => String::new(),
                (false, true) => format!("◀ {value} ▶"),
                (false, false) => value.to_string(),
            };
            let style = if field == focused {
                Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.text)
            };
            Line::from(vec![
                Span::styled(format!("{:<15}", field.label()), style),
                Span::raw(shown),
            ])
        })
        .collect();

    let block = Block::default()
        .title("Фильтры")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_table(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border));
    let rows = state.list.visible();
    if rows.is_empty() {
        let text = if state.list.all().is_empty() {
            "Нет транзакций"
        } else {
            "Нет транзакций, подходящих под фильтры"
        };
        frame.render_widget(
            Paragraph::new(Line::styled(text, Style::default().fg(theme.dim)))
                .alignment(Alignment::Center)
                .block(block),
            area,
        );
        return;
    }

    let order = state.layout.order();
    let cells: Vec<u16> = order
        .iter()
        .map(|column| state.measurer.cells(state.layout.width(*column)))
        .collect();
    let inner_width = area.width.saturating_sub(2);
    let selected_col = state.table.selected_col.min(order.len().saturating_sub(1));
    let (start, end) = visible_columns(&cells, selected_col, inner_width);
    let columns = &order[start..end];

    let header = Row::new(columns.iter().map(|column| {
        Cell::from(Text::from(column.label()).alignment(text_alignment(state, *column)))
    }))
    .style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD));

    let body = rows.iter().enumerate().map(|(idx, tx)| {
        let selected_row = idx == state.table.selected_row;
        Row::new(columns.iter().map(|column| {
            let focused = selected_row && order.get(selected_col) == Some(column);
            body_cell(state, tx, *column, focused, theme)
        }))
    });

    let widths = cells[start..end].iter().map(|w| Constraint::Length(*w));
    let table = Table::new(body, widths)
        .header(header)
        .column_spacing(COLUMN_SPACING)
        .block(block)
        .row_highlight_style(Style::default().bg(theme.panel));

    let mut table_state = TableState::default();
    table_state.select(Some(state.table.selected_row));
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn body_cell<'a>(
    state: &AppState,
    tx: &Transaction,
    column: Column,
    focused: bool,
    theme: &Theme,
) -> Cell<'a> {
    let value = if column.is_action() {
        "e ✎  d ✕".to_string()
    } else {
        format_cell(tx, column)
    };
    let mut style = Style::default().fg(theme.text);
    if let Some(bg) = state
        .layout
        .cell_color(tx.id, column)
        .and_then(|color| color.parse::<Color>().ok())
    {
        style = style.bg(bg).fg(theme.on_color);
    }
    if focused {
        style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
    }
    Cell::from(Text::from(value).alignment(text_alignment(state, column))).style(style)
}

fn text_alignment(state: &AppState, column: Column) -> Alignment {
    match state.layout.alignment(column) {
        ColumnAlignment::Left => Alignment::Left,
        ColumnAlignment::Center => Alignment::Center,
        ColumnAlignment::Right => Alignment::Right,
    }
}

fn render_edit_line(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let Some(edit) = &state.table.edit else {
        return;
    };
    let mut lines = vec![Line::from(vec![
        Span::styled(edit.column.label(), Style::default().fg(theme.accent)),
        Span::raw(format!(": {}▏", edit.input)),
    ])];
    if let Some(error) = &edit.error {
        lines.push(Line::styled(error.as_str(), Style::default().fg(theme.error)));
    }
    let block = Block::default()
        .title("Редактирование")
        .borders(Borders::TOP)
        .border_style(Style::default().fg(theme.accent));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Range of columns to draw so that `selected` is on screen. Scrolls right
/// only as far as needed and always keeps at least one column.
fn visible_columns(cells: &[u16], selected: usize, available: u16) -> (usize, usize) {
    if cells.is_empty() {
        return (0, 0);
    }
    let span = |from: usize, to: usize| -> u32 {
        cells[from..=to]
            .iter()
            .map(|w| u32::from(*w) + u32::from(COLUMN_SPACING))
            .sum()
    };

    let mut start = 0;
    while start < selected && span(start, selected) > u32::from(available) {
        start += 1;
    }
    let mut end = start + 1;
    while end < cells.len() && span(start, end) <= u32::from(available) {
        end += 1;
    }
    (start, end)
}
