//! Key events as submitted by the host.

use crate::{Key, Mods};

/// Phase of a key event. Discriminants are the wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum KeyAction {
    Release = 0,
    #[default]
    Press = 1,
    Repeat = 2,
}

impl KeyAction {
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Release),
            1 => Some(Self::Press),
            2 => Some(Self::Repeat),
            _ => None,
        }
    }
}

/// One physical key event.
///
/// Hosts fill in what their platform gives them. `key`, `text`,
/// `consumed_mods` and `unshifted_codepoint` may be left empty: the
/// translator derives them from `keycode` and the active layout.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyEvent {
    pub action: KeyAction,
    /// Native scancode; mapped to `key` through the keycode table.
    pub keycode: u32,
    pub key: Key,
    pub mods: Mods,
    /// Modifiers absorbed while producing `text` (e.g. Shift for `A`).
    pub consumed_mods: Mods,
    pub text: String,
    /// Layout-independent identity used for unicode triggers.
    pub unshifted_codepoint: Option<char>,
    /// IME or dead-key composition is in progress.
    pub composing: bool,
}

impl KeyEvent {
    pub fn press(keycode: u32) -> Self {
        Self {
            keycode,
            ..Default::default()
        }
    }

    pub fn key(key: Key) -> Self {
        Self {
            key,
            ..Default::default()
        }
    }

    pub fn with_action(mut self, action: KeyAction) -> Self {
        self.action = action;
        self
    }

    pub fn with_mods(mut self, mods: Mods) -> Self {
        self.mods = mods;
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_unshifted(mut self, codepoint: char) -> Self {
        self.unshifted_codepoint = Some(codepoint);
        self
    }

    pub fn with_composing(mut self, composing: bool) -> Self {
        self.composing = composing;
        self
    }

    /// The single codepoint this event produced, if it produced exactly one.
    pub fn single_codepoint(&self) -> Option<char> {
        let mut chars = self.text.chars();
        let first = chars.next()?;
        chars.next().is_none().then_some(first)
    }

    /// Modifiers that were not absorbed by text production.
    pub fn effective_mods(&self) -> Mods {
        self.mods - self.consumed_mods
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn key_action_wire_values() {
        assert_eq!(KeyAction::Release as u32, 0);
        assert_eq!(KeyAction::Press as u32, 1);
        assert_eq!(KeyAction::Repeat as u32, 2);
        assert_eq!(KeyAction::from_raw(3), None);
    }

    #[test]
    fn single_codepoint() {
        assert_eq!(KeyEvent::default().with_text("a").single_codepoint(), Some('a'));
        assert_eq!(KeyEvent::default().with_text("ab").single_codepoint(), None);
        assert_eq!(KeyEvent::default().single_codepoint(), None);
    }

    #[test]
    fn effective_mods_removes_consumed() {
        let mut event = KeyEvent::key(Key::KeyA).with_mods(Mods::SHIFT | Mods::CTRL);
        event.consumed_mods = Mods::SHIFT;
        assert_eq!(event.effective_mods(), Mods::CTRL);
    }
}
