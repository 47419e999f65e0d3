use crate::runtime::command::Command;
use crate::terminal::{KeyCode, KeyEvent, KeyModifiers};
use crate::widgets::traits::TextAction;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub fn key(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::CONTROL)
    }

    pub fn from_event(event: KeyEvent) -> Self {
        Self {
            code: event.code,
            modifiers: event.modifiers,
        }
    }
}

#[derive(Default)]
pub struct KeyBindings {
    bindings: HashMap<KeyBinding, Command>,
}

impl KeyBindings {
    pub fn new() -> Self {
        let mut manager = Self::default();
        manager.install_defaults();
        manager
    }

    pub fn bind(&mut self, key: KeyBinding, command: Command) {
        self.bindings.insert(key, command);
    }

    pub fn unbind(&mut self, key: &KeyBinding) {
        self.bindings.remove(key);
    }

    pub fn resolve(&self, event: KeyEvent) -> Option<Command> {
        self.bindings.get(&KeyBinding::from_event(event)).cloned()
    }

    /// Keys not listed here go to the focused input.
    pub fn help(&self) -> &'static str {
        "Ctrl+G generate · Ctrl+S save · Ctrl+T/Ctrl+Y pick template · Ctrl+L load · Ctrl+D delete · Ctrl+R submit · Tab focus · Esc dismiss · Ctrl+C quit"
    }

    fn install_defaults(&mut self) {
        self.bind(KeyBinding::ctrl(KeyCode::Char('c')), Command::Exit);
        self.bind(KeyBinding::ctrl(KeyCode::Char('g')), Command::Generate);
        self.bind(KeyBinding::ctrl(KeyCode::Char('s')), Command::SaveTemplate);
        self.bind(KeyBinding::ctrl(KeyCode::Char('t')), Command::NextTemplate);
        self.bind(KeyBinding::ctrl(KeyCode::Char('y')), Command::PrevTemplate);
        self.bind(KeyBinding::ctrl(KeyCode::Char('l')), Command::LoadTemplate);
        self.bind(KeyBinding::ctrl(KeyCode::Char('d')), Command::DeleteTemplate);
        self.bind(KeyBinding::ctrl(KeyCode::Char('r')), Command::SubmitForm);
        self.bind(KeyBinding::key(KeyCode::Esc), Command::Dismiss);
        self.bind(KeyBinding::key(KeyCode::Tab), Command::NextFocus);
        self.bind(KeyBinding::key(KeyCode::BackTab), Command::PrevFocus);
        self.bind(
            KeyBinding::new(KeyCode::BackTab, KeyModifiers::SHIFT),
            Command::PrevFocus,
        );
        self.bind(
            KeyBinding::ctrl(KeyCode::Backspace),
            Command::TextAction(TextAction::DeleteWordLeft),
        );
        self.bind(
            KeyBinding::ctrl(KeyCode::Char('w')),
            Command::TextAction(TextAction::DeleteWordLeft),
        );
        self.bind(
            KeyBinding::ctrl(KeyCode::Delete),
            Command::TextAction(TextAction::DeleteWordRight),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyBinding, KeyBindings};
    use crate::runtime::command::Command;
    use crate::terminal::{KeyCode, KeyEvent, KeyModifiers};

    #[test]
    fn resolves_session_shortcuts() {
        let bindings = KeyBindings::new();
        assert_eq!(bindings.resolve(KeyEvent::ctrl('g')), Some(Command::Generate));
        assert_eq!(bindings.resolve(KeyEvent::ctrl('r')), Some(Command::SubmitForm));
        assert_eq!(
            bindings.resolve(KeyEvent {
                code: KeyCode::BackTab,
                modifiers: KeyModifiers::SHIFT,
            }),
            Some(Command::PrevFocus)
        );
    }

    #[test]
    fn plain_characters_are_left_to_inputs() {
        let mut bindings = KeyBindings::new();
        assert_eq!(bindings.resolve(KeyEvent::plain(KeyCode::Char('g'))), None);

        bindings.unbind(&KeyBinding::key(KeyCode::Esc));
        assert_eq!(bindings.resolve(KeyEvent::plain(KeyCode::Esc)), None);
    }
}
