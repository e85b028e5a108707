use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Keys that reach the text field, possibly rewritten by autoformatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKey {
    Char(char),
    Enter,
    Tab,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    ExtendLeft,
    ExtendRight,
}

impl EditorKey {
    /// Keys the host field would turn into a buffer change by default.
    pub fn is_input(&self) -> bool {
        matches!(
            self,
            EditorKey::Char(_)
                | EditorKey::Enter
                | EditorKey::Tab
                | EditorKey::Backspace
                | EditorKey::Delete
        )
    }
}

/// Keys handled by the application rather than the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    Quit,
    Download,
    CopyToClipboard,
    ToggleLineLength,
    ToggleSpellCheck,
    ToggleAutoList,
    ToggleAutoClosure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Edit(EditorKey),
    Command(AppCommand),
}

pub struct KeyHandler;

impl KeyHandler {
    pub fn parse_key(key_event: &KeyEvent) -> Option<KeyAction> {
        let key = key_event.code;
        let modifiers = key_event.modifiers;

        if modifiers.contains(KeyModifiers::CONTROL) {
            return Self::parse_control_key(key).map(KeyAction::Command);
        }
        if modifiers.contains(KeyModifiers::ALT) {
            return None;
        }

        let editor_key = match key {
            KeyCode::Left if modifiers.contains(KeyModifiers::SHIFT) => EditorKey::ExtendLeft,
            KeyCode::Right if modifiers.contains(KeyModifiers::SHIFT) => EditorKey::ExtendRight,
            KeyCode::Char(c) => EditorKey::Char(c),
            KeyCode::Enter => EditorKey::Enter,
            KeyCode::Tab => EditorKey::Tab,
            KeyCode::Backspace => EditorKey::Backspace,
            KeyCode::Delete => EditorKey::Delete,
            KeyCode::Left => EditorKey::Left,
            KeyCode::Right => EditorKey::Right,
            KeyCode::Up => EditorKey::Up,
            KeyCode::Down => EditorKey::Down,
            KeyCode::Home => EditorKey::Home,
            KeyCode::End => EditorKey::End,
            _ => return None,
        };

        Some(KeyAction::Edit(editor_key))
    }

    fn parse_control_key(key: KeyCode) -> Option<AppCommand> {
        match key {
            KeyCode::Char('q') => Some(AppCommand::Quit),
            KeyCode::Char('s') => Some(AppCommand::Download),
            KeyCode::Char('y') => Some(AppCommand::CopyToClipboard),
            KeyCode::Char('l') => Some(AppCommand::ToggleLineLength),
            KeyCode::Char('p') => Some(AppCommand::ToggleSpellCheck),
            KeyCode::Char('t') => Some(AppCommand::ToggleAutoList),
            KeyCode::Char('b') => Some(AppCommand::ToggleAutoClosure),
            _ => None,
        }
    }

    /// One-line key reference for the status bar.
    pub fn help_text() -> &'static str {
        "^Q quit  ^S export  ^Y copy  ^L width  ^P spell  ^T lists  ^B pairs"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_text_keys() {
        assert_eq!(
            KeyHandler::parse_key(&key(KeyCode::Char('a'), KeyModifiers::NONE)),
            Some(KeyAction::Edit(EditorKey::Char('a')))
        );
        assert_eq!(
            KeyHandler::parse_key(&key(KeyCode::Char('('), KeyModifiers::SHIFT)),
            Some(KeyAction::Edit(EditorKey::Char('(')))
        );
        assert_eq!(
            KeyHandler::parse_key(&key(KeyCode::Enter, KeyModifiers::NONE)),
            Some(KeyAction::Edit(EditorKey::Enter))
        );
    }

    #[test]
    fn test_shift_arrows_extend_selection() {
        assert_eq!(
            KeyHandler::parse_key(&key(KeyCode::Left, KeyModifiers::SHIFT)),
            Some(KeyAction::Edit(EditorKey::ExtendLeft))
        );
        assert_eq!(
            KeyHandler::parse_key(&key(KeyCode::Right, KeyModifiers::NONE)),
            Some(KeyAction::Edit(EditorKey::Right))
        );
    }

    #[test]
    fn test_control_commands() {
        assert_eq!(
            KeyHandler::parse_key(&key(KeyCode::Char('q'), KeyModifiers::CONTROL)),
            Some(KeyAction::Command(AppCommand::Quit))
        );
        assert_eq!(
            KeyHandler::parse_key(&key(KeyCode::Char('s'), KeyModifiers::CONTROL)),
            Some(KeyAction::Command(AppCommand::Download))
        );
        assert_eq!(
            KeyHandler::parse_key(&key(KeyCode::Char('z'), KeyModifiers::CONTROL)),
            None
        );
    }

    #[test]
    fn test_unmapped_keys() {
        assert_eq!(
            KeyHandler::parse_key(&key(KeyCode::PageDown, KeyModifiers::NONE)),
            None
        );
        assert_eq!(
            KeyHandler::parse_key(&key(KeyCode::Char('x'), KeyModifiers::ALT)),
            None
        );
    }

    #[test]
    fn test_is_input() {
        assert!(EditorKey::Char('x').is_input());
        assert!(EditorKey::Backspace.is_input());
        assert!(!EditorKey::Left.is_input());
        assert!(!EditorKey::ExtendRight.is_input());
    }
}
