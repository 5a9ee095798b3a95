use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Quit,
    Cancel,
    NextField,
    PrevField,
    Submit,
    Backspace,
    Delete,
    Up,
    Down,
    Left,
    Right,
    /// Shift+Left / Shift+Right: drag the focused column onto its neighbour.
    MoveLeft,
    MoveRight,
    Input(char),
    None,
}

/// Maps a key press. While `typing`, printable keys (including `q`) are text.
pub fn map_key(key: KeyEvent, typing: bool) -> AppAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if let KeyCode::Char('c') = key.code {
            return AppAction::Quit;
        }
        return AppAction::None;
    }

    let shift = key.modifiers.contains(KeyModifiers::SHIFT);
    match key.code {
        KeyCode::Char('q') if !typing => AppAction::Quit,
        KeyCode::Esc => AppAction::Cancel,
        KeyCode::Tab => AppAction::NextField,
        KeyCode::BackTab => AppAction::PrevField,
        KeyCode::Enter => AppAction::Submit,
        KeyCode::Backspace => AppAction::Backspace,
        KeyCode::Delete => AppAction::Delete,
        KeyCode::Up => AppAction::Up,
        KeyCode::Down => AppAction::Down,
        KeyCode::Left if shift => AppAction::MoveLeft,
        KeyCode::Right if shift => AppAction::MoveRight,
        KeyCode::Left => AppAction::Left,
        KeyCode::Right => AppAction::Right,
        KeyCode::Char(ch) => AppAction::Input(ch),
        _ => AppAction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn q_quits_only_outside_text_input() {
        let q = press(KeyCode::Char('q'), KeyModifiers::NONE);
        assert_eq!(map_key(q, false), AppAction::Quit);
        assert_eq!(map_key(q, true), AppAction::Input('q'));
    }

    #[test]
    fn shift_arrows_move_columns() {
        assert_eq!(
            map_key(press(KeyCode::Left, KeyModifiers::SHIFT), false),
            AppAction::MoveLeft
        );
        assert_eq!(
            map_key(press(KeyCode::Right, KeyModifiers::NONE), false),
            AppAction::Right
        );
    }

    #[test]
    fn ctrl_c_always_quits() {
        let key = press(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(key, true), AppAction::Quit);
    }
}
