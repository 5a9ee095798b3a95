pub mod components;
pub mod keymap;
pub mod measure;
pub mod screens;

mod terminal;
mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::{AddMode, AppState, Page, SettingsMode, TableMode};
use components::hints::{KeyHint, hint_separator, hints_to_spans};

pub use terminal::{Terminal, restore_terminal, setup_terminal};
pub use theme::Theme;

pub fn render(frame: &mut Frame<'_>, state: &AppState) {
    let area = frame.area();
    let theme = Theme::default();

    // Info bar, tabs, content, bottom bar
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_info_bar(frame, layout[0], state, &theme);
    components::tabs::render_tabs(frame, layout[1], state.page, &theme);

    let content = layout[2];
    if let Some(message) = &state.config_error {
        components::notice::render(frame, content, message, &theme);
    } else {
        match state.page {
            Page::Table => screens::table::render(frame, content, state, &theme),
            Page::Trash => screens::trash::render(frame, content, state, &theme),
            Page::Add => screens::add::render(frame, content, state, &theme),
            Page::Settings => screens::settings::render(frame, content, state, &theme),
        }
    }

    render_bottom_bar(frame, layout[3], state, &theme);
    if let Some(pending) = state.confirm {
        components::confirm::render(frame, area, pending.prompt(), &theme);
    }
    components::toast::render(frame, area, state.toast.as_ref(), &theme);
}

fn render_info_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let refresh = state
        .last_refresh
        .map(|dt| dt.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());
    let (status, status_style) = if state.connection_ok {
        ("OK", Style::default().fg(theme.positive))
    } else {
        ("ERR", Style::default().fg(theme.error))
    };

    let line = Line::from(vec![
        Span::styled("Пользователь", Style::default().fg(theme.dim)),
        Span::raw(format!(": {}  ", state.user)),
        Span::styled("Сервер", Style::default().fg(theme.dim)),
        Span::raw(format!(": {}  ", state.base_url)),
        Span::styled("Обновлено", Style::default().fg(theme.dim)),
        Span::raw(format!(": {refresh}  ")),
        Span::styled(status, status_style),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

fn render_bottom_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let mut parts = Vec::new();
    if !state.typing() {
        parts.extend(hints_to_spans(&[KeyHint::new("1-4", "pages")], theme));
        parts.push(hint_separator(theme));
    }

    let context = context_hints(state);
    if !context.is_empty() {
        parts.extend(hints_to_spans(&context, theme));
        parts.push(hint_separator(theme));
    }

    let quit = if state.typing() { "Ctrl+C" } else { "q" };
    parts.extend(hints_to_spans(&[KeyHint::new(quit, "quit")], theme));

    frame.render_widget(Paragraph::new(Line::from(parts)), area);
}

/// Hints for the focused page and mode.
fn context_hints(state: &AppState) -> Vec<KeyHint> {
    if state.confirm.is_some() {
        return vec![KeyHint::new("y/Enter", "confirm"), KeyHint::new("Esc", "cancel")];
    }
    match state.page {
        Page::Table => match state.table.mode {
            TableMode::Browse => vec![
                KeyHint::new("←→", "column"),
                KeyHint::new("S-←→", "move"),
                KeyHint::new("<>", "width"),
                KeyHint::new("a/z", "align"),
                KeyHint::new("c", "color"),
                KeyHint::new("w", "fit"),
                KeyHint::new("x", "reset"),
                KeyHint::new("/", "search"),
                KeyHint::new("f", "filters"),
                KeyHint::new("e", "edit"),
                KeyHint::new("d", "delete"),
                KeyHint::new("r", "reload"),
            ],
            TableMode::Search => vec![KeyHint::new("Enter", "done"), KeyHint::new("Esc", "clear")],
            TableMode::Filter => vec![
                KeyHint::new("↑↓", "field"),
                KeyHint::new("←→", "value"),
                KeyHint::new("Del", "clear all"),
                KeyHint::new("Enter", "close"),
            ],
            TableMode::Edit => vec![KeyHint::new("Enter", "save"), KeyHint::new("Esc", "cancel")],
        },
        Page::Trash => vec![
            KeyHint::new("↑↓", "select"),
            KeyHint::new("u", "restore"),
            KeyHint::new("D", "delete"),
            KeyHint::new("E", "empty"),
            KeyHint::new("r", "reload"),
        ],
        Page::Add => match state.add.mode {
            AddMode::Browse => vec![
                KeyHint::new("↑↓", "field"),
                KeyHint::new("Enter", "edit"),
                KeyHint::new("←→", "option"),
                KeyHint::new("n", "now"),
                KeyHint::new("s", "save"),
                KeyHint::new("c", "clear"),
                KeyHint::new("p", "parse text"),
            ],
            AddMode::Editing => vec![
                KeyHint::new("Tab", "next"),
                KeyHint::new("Enter", "done"),
            ],
            AddMode::Parse => vec![
                KeyHint::new("Enter", "recognize"),
                KeyHint::new("Esc", "back"),
            ],
        },
        Page::Settings => match state.settings.mode {
            SettingsMode::List => vec![
                KeyHint::new("n", "new"),
                KeyHint::new("e", "edit"),
                KeyHint::new("d", "delete"),
                KeyHint::new("r", "reload"),
            ],
            SettingsMode::Create | SettingsMode::Edit(_) => vec![
                KeyHint::new("Tab", "next"),
                KeyHint::new("Enter", "save"),
                KeyHint::new("Esc", "cancel"),
            ],
        },
    }
}
