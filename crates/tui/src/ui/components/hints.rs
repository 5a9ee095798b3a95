use ratatui::{style::Style, text::Span};

use crate::ui::theme::Theme;

/// Key and what it does, shown in the bottom bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyHint {
    pub key: &'static str,
    pub action: &'static str,
}

impl KeyHint {
    pub const fn new(key: &'static str, action: &'static str) -> Self {
        Self { key, action }
    }
}

pub fn hints_to_spans(hints: &[KeyHint], theme: &Theme) -> Vec<Span<'static>> {
    let key_style = Style::default().fg(theme.accent);
    let action_style = Style::default().fg(theme.text);
    hints
        .iter()
        .enumerate()
        .flat_map(|(idx, hint)| {
            let gap = if idx == 0 { "" } else { "  " };
            [
                Span::raw(gap),
                Span::styled(hint.key, key_style),
                Span::styled(format!(" {}", hint.action), action_style),
            ]
        })
        .collect()
}

pub fn hint_separator(theme: &Theme) -> Span<'static> {
    Span::styled("  │  ", Style::default().fg(theme.border))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hints_render_key_then_action() {
        let theme = Theme::default();
        let spans = hints_to_spans(
            &[KeyHint::new("u", "restore"), KeyHint::new("D", "delete")],
            &theme,
        );
        let text: String = spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "u restore  D delete");
    }
}
