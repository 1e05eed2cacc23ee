use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use expense_client::ViewState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Quit,
    Logout,
    ToggleRegister,
    Open(ViewState),
    Refresh,
    DetachImage,
    Cancel,
    NextField,
    PrevField,
    Submit,
    Backspace,
    Up,
    Down,
    Input(char),
    None,
}

/// Global shortcuts use Ctrl or function keys so they never collide with text input.
pub fn map_key(key: KeyEvent) -> AppAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => AppAction::Quit,
            KeyCode::Char('l') => AppAction::Logout,
            KeyCode::Char('n') => AppAction::ToggleRegister,
            KeyCode::Char('r') => AppAction::Refresh,
            KeyCode::Char('x') => AppAction::DetachImage,
            _ => AppAction::None,
        };
    }

    match key.code {
        KeyCode::F(1) => AppAction::Open(ViewState::Create),
        KeyCode::F(2) => AppAction::Open(ViewState::All),
        KeyCode::F(3) => AppAction::Open(ViewState::Search),
        KeyCode::F(4) => AppAction::Open(ViewState::Delete),
        KeyCode::F(5) => AppAction::Refresh,
        KeyCode::Esc => AppAction::Cancel,
        KeyCode::Tab => AppAction::NextField,
        KeyCode::BackTab => AppAction::PrevField,
        KeyCode::Enter => AppAction::Submit,
        KeyCode::Backspace => AppAction::Backspace,
        KeyCode::Up => AppAction::Up,
        KeyCode::Down => AppAction::Down,
        KeyCode::Char(ch) => AppAction::Input(ch),
        _ => AppAction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    #[test]
    fn plain_characters_are_input() {
        assert_eq!(map_key(key(KeyCode::Char('q'))), AppAction::Input('q'));
        assert_eq!(map_key(key(KeyCode::Char('2'))), AppAction::Input('2'));
    }

    #[test]
    fn control_shortcuts() {
        assert_eq!(map_key(ctrl('c')), AppAction::Quit);
        assert_eq!(map_key(ctrl('l')), AppAction::Logout);
        assert_eq!(map_key(ctrl('z')), AppAction::None);
    }

    #[test]
    fn function_keys_open_views() {
        assert_eq!(
            map_key(key(KeyCode::F(1))),
            AppAction::Open(ViewState::Create)
        );
        assert_eq!(
            map_key(key(KeyCode::F(4))),
            AppAction::Open(ViewState::Delete)
        );
        assert_eq!(map_key(key(KeyCode::F(5))), AppAction::Refresh);
    }
}
