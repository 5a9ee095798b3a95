use engine::form::{FieldSpec, FormMessage, FormStatus, schema::FIELD_GROUPS};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::{
    app::{AddMode, AddState, AppState, is_choice},
    ui::theme::Theme,
};

const LABEL_WIDTH: usize = 26;

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let add = &state.add;
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);
    render_banner(frame, layout[0], add, theme);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(layout[1]);
    render_form(frame, columns[0], add, theme);
    render_parse_panel(frame, columns[1], add, theme);
}

fn render_banner(frame: &mut Frame<'_>, area: Rect, add: &AddState, theme: &Theme) {
    let line = match (add.form.status(), add.form.message()) {
        (FormStatus::Submitting, _) => {
            Line::styled("Сохранение...", Style::default().fg(theme.dim))
        }
        (_, Some(FormMessage::Success(text))) => {
            Line::styled(text.as_str(), Style::default().fg(theme.positive))
        }
        (_, Some(FormMessage::Error(text))) => {
            Line::styled(text.as_str(), Style::default().fg(theme.error))
        }
        (_, None) => Line::styled(
            "Ручное добавление транзакции",
            Style::default().fg(theme.dim),
        ),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_form(frame: &mut Frame<'_>, area: Rect, add: &AddState, theme: &Theme) {
    let focused_name = add.focused_field().map(|f| f.name);
    let editing = add.mode == AddMode::Editing;
    let mut lines = Vec::new();
    let mut focus_line = 0;

    for group in FIELD_GROUPS {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.push(Line::styled(
            group.title,
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ));
        for field in group.fields {
            let focused = focused_name == Some(field.name);
            if focused {
                focus_line = lines.len();
            }
            lines.push(field_line(add, field, focused, focused && editing, theme));
            if let Some(error) = add.form.error(field.name) {
                lines.push(Line::styled(
                    format!("{:LABEL_WIDTH$}{error}", ""),
                    Style::default().fg(theme.error),
                ));
            } else if focused {
                if let Some(helper) = field.helper_text {
                    lines.push(Line::styled(
                        format!("{:LABEL_WIDTH$}{helper}", ""),
                        Style::default().fg(theme.dim),
                    ));
                }
            }
        }
    }

    // Keep the focused field on screen.
    let visible = area.height.saturating_sub(2) as usize;
    let scroll = (focus_line + 2).saturating_sub(visible) as u16;

    let block = Block::default()
        .title("Новая транзакция")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if add.mode == AddMode::Parse {
            theme.border
        } else {
            theme.accent
        }));
    frame.render_widget(Paragraph::new(lines).block(block).scroll((scroll, 0)), area);
}

fn field_line(
    add: &AddState,
    field: &'static FieldSpec,
    focused: bool,
    editing: bool,
    theme: &Theme,
) -> Line<'static> {
    let marker = if field.required { " *" } else { "" };
    let label = format!("{}{marker}", field.label);
    let label_style = if focused {
        Style::default()
            .fg(theme.accent)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.text)
    };

    let raw = add.form.value(field.name);
    let value = if is_choice(field) {
        let shown = add
            .form
            .options(field)
            .into_iter()
            .find(|option| option.value == raw)
            .map(|option| option.label)
            .unwrap_or_else(|| raw.to_string());
        let shown = if shown.is_empty() {
            field.placeholder.unwrap_or("—").to_string()
        } else {
            shown
        };
        if focused {
            Span::raw(format!("◀ {shown} ▶"))
        } else {
            Span::raw(shown)
        }
    } else if raw.is_empty() && !editing {
        Span::styled(
            field.placeholder.unwrap_or("").to_string(),
            Style::default().fg(theme.dim),
        )
    } else {
        let cursor = if editing { "▏" } else { "" };
        Span::raw(format!("{raw}{cursor}"))
    };

    Line::from(vec![
        Span::styled(format!("{label:<LABEL_WIDTH$}"), label_style),
        value,
    ])
}

fn render_parse_panel(frame: &mut Frame<'_>, area: Rect, add: &AddState, theme: &Theme) {
    let active = add.mode == AddMode::Parse;
    let cursor = if active { "▏" } else { "" };
    let mut lines = vec![
        Line::styled(
            "Вставьте текст SMS или уведомления, сервер распознает и сохранит транзакцию.",
            Style::default().fg(theme.dim),
        ),
        Line::from(""),
        Line::from(format!("{}{cursor}", add.parse_text)),
    ];

    if !add.preview.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::styled(
            "Распознано:",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ));
        for (key, value) in &add.preview {
            lines.push(Line::from(vec![
                Span::styled(format!("{key:<16}"), Style::default().fg(theme.dim)),
                Span::raw(value.clone()),
            ]));
        }
    }

    let block = Block::default()
        .title("Распознать текст (p)")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if active { theme.accent } else { theme.border }));
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false }),
        area,
    );
}
