//! Keyboard layouts: what text a physical key produces.

use std::fmt::Debug;

use crate::{Key, Mods};

/// Text produced by a key press and the modifiers spent producing it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Translated {
    pub text: String,
    pub consumed: Mods,
}

/// Maps physical keys to characters.
///
/// Implementations must be pure: the same key and modifiers always produce
/// the same result.
pub trait KeyboardLayout: Debug {
    fn name(&self) -> &str;

    /// Character the key produces with no modifiers held.
    fn unshifted(&self, key: Key) -> Option<char>;

    /// Text for `key` under `mods` (already adjusted for option-as-alt).
    fn translate(&self, key: Key, mods: Mods) -> Translated;
}

/// (key, unshifted, shifted) for the US ANSI layout.
const US_WRITING_KEYS: &[(Key, char, char)] = &[
    (Key::Backquote, '`', '~'),
    (Key::Backslash, '\\', '|'),
    (Key::BracketLeft, '[', '{'),
    (Key::BracketRight, ']', '}'),
    (Key::Comma, ',', '<'),
    (Key::Digit0, '0', ')'),
    (Key::Digit1, '1', '!'),
    (Key::Digit2, '2', '@'),
    (Key::Digit3, '3', '#'),
    (Key::Digit4, '4', '$'),
    (Key::Digit5, '5', '%'),
    (Key::Digit6, '6', '^'),
    (Key::Digit7, '7', '&'),
    (Key::Digit8, '8', '*'),
    (Key::Digit9, '9', '('),
    (Key::Equal, '=', '+'),
    (Key::Minus, '-', '_'),
    (Key::Period, '.', '>'),
    (Key::Quote, '\'', '"'),
    (Key::Semicolon, ';', ':'),
    (Key::Slash, '/', '?'),
    (Key::Space, ' ', ' '),
];

const US_NUMPAD_KEYS: &[(Key, char)] = &[
    (Key::Numpad0, '0'),
    (Key::Numpad1, '1'),
    (Key::Numpad2, '2'),
    (Key::Numpad3, '3'),
    (Key::Numpad4, '4'),
    (Key::Numpad5, '5'),
    (Key::Numpad6, '6'),
    (Key::Numpad7, '7'),
    (Key::Numpad8, '8'),
    (Key::Numpad9, '9'),
    (Key::NumpadAdd, '+'),
    (Key::NumpadSubtract, '-'),
    (Key::NumpadMultiply, '*'),
    (Key::NumpadDivide, '/'),
    (Key::NumpadDecimal, '.'),
    (Key::NumpadEqual, '='),
    (Key::NumpadComma, ','),
];

fn letter(key: Key) -> Option<char> {
    if key >= Key::KeyA && key <= Key::KeyZ {
        let offset = key.to_raw() - Key::KeyA.to_raw();
        char::from_u32('a' as u32 + offset)
    } else {
        None
    }
}

/// The physical key that produces `c` on a US ANSI keyboard, shifted or not.
pub fn physical_key_for_char(c: char) -> Option<Key> {
    if c.is_ascii_lowercase() {
        let offset = c as u32 - 'a' as u32;
        return Key::from_raw(Key::KeyA.to_raw() + offset);
    }
    US_WRITING_KEYS
        .iter()
        .find(|(_, unshifted, shifted)| *unshifted == c || *shifted == c)
        .map(|(key, _, _)| *key)
}

/// US ANSI layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsLayout;

impl KeyboardLayout for UsLayout {
    fn name(&self) -> &str {
        "us"
    }

    fn unshifted(&self, key: Key) -> Option<char> {
        if let Some(c) = letter(key) {
            return Some(c);
        }
        if let Some((_, unshifted, _)) = US_WRITING_KEYS.iter().find(|(k, _, _)| *k == key) {
            return Some(*unshifted);
        }
        US_NUMPAD_KEYS
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, c)| *c)
    }

    fn translate(&self, key: Key, mods: Mods) -> Translated {
        // Control and command chords are encoded by the terminal, not typed.
        if mods.intersects(Mods::CTRL | Mods::SUPER) {
            return Translated::default();
        }

        let shift = mods.contains(Mods::SHIFT);

        if let Some(c) = letter(key) {
            let upper = shift ^ mods.contains(Mods::CAPS);
            return Translated {
                text: if upper { c.to_ascii_uppercase() } else { c }.to_string(),
                consumed: if shift { Mods::SHIFT } else { Mods::empty() },
            };
        }

        if let Some((_, unshifted, shifted)) = US_WRITING_KEYS.iter().find(|(k, _, _)| *k == key)
        {
            let consumed = if shift && unshifted != shifted {
                Mods::SHIFT
            } else {
                Mods::empty()
            };
            return Translated {
                text: if shift { *shifted } else { *unshifted }.to_string(),
                consumed,
            };
        }

        if mods.contains(Mods::NUM) {
            if let Some((_, c)) = US_NUMPAD_KEYS.iter().find(|(k, _)| *k == key) {
                return Translated {
                    text: c.to_string(),
                    consumed: Mods::empty(),
                };
            }
        }

        let text = match key {
            Key::Enter | Key::NumpadEnter => "\r",
            Key::Tab => "\t",
            Key::Backspace => "\x7f",
            Key::Escape => "\x1b",
            _ => "",
        };
        Translated {
            text: text.to_string(),
            consumed: Mods::empty(),
        }
    }
}

/// The layout of the running system.
///
/// Only the US layout ships today; hosts with other layouts send resolved
/// text and unshifted codepoints with each event.
pub fn system_layout() -> Box<dyn KeyboardLayout> {
    Box::new(UsLayout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case(Key::KeyA, Mods::empty(), "a", Mods::empty() ; "lowercase letter")]
    #[test_case(Key::KeyA, Mods::SHIFT, "A", Mods::SHIFT ; "shifted letter consumes shift")]
    #[test_case(Key::KeyA, Mods::CAPS, "A", Mods::empty() ; "caps lock")]
    #[test_case(Key::KeyA, Mods::CAPS | Mods::SHIFT, "a", Mods::SHIFT ; "caps and shift cancel")]
    #[test_case(Key::Digit1, Mods::SHIFT, "!", Mods::SHIFT ; "shifted digit")]
    #[test_case(Key::Space, Mods::SHIFT, " ", Mods::empty() ; "shift space not consumed")]
    #[test_case(Key::Enter, Mods::empty(), "\r", Mods::empty() ; "enter")]
    #[test_case(Key::KeyC, Mods::CTRL, "", Mods::empty() ; "ctrl chord has no text")]
    #[test_case(Key::KeyC, Mods::SUPER, "", Mods::empty() ; "super chord has no text")]
    #[test_case(Key::KeyC, Mods::ALT, "c", Mods::empty() ; "alt left for the encoder")]
    #[test_case(Key::Numpad5, Mods::NUM, "5", Mods::empty() ; "numpad with num lock")]
    #[test_case(Key::Numpad5, Mods::empty(), "", Mods::empty() ; "numpad without num lock")]
    #[test_case(Key::ArrowUp, Mods::empty(), "", Mods::empty() ; "arrow")]
    fn us_translate(key: Key, mods: Mods, text: &str, consumed: Mods) {
        let translated = UsLayout.translate(key, mods);
        assert_eq!(translated.text, text);
        assert_eq!(translated.consumed, consumed);
    }

    #[test]
    fn unshifted_codepoints() {
        assert_eq!(UsLayout.unshifted(Key::KeyK), Some('k'));
        assert_eq!(UsLayout.unshifted(Key::Digit1), Some('1'));
        assert_eq!(UsLayout.unshifted(Key::Equal), Some('='));
        assert_eq!(UsLayout.unshifted(Key::ArrowUp), None);
    }

    #[test]
    fn physical_keys_for_chars() {
        assert_eq!(physical_key_for_char('z'), Some(Key::KeyZ));
        assert_eq!(physical_key_for_char('!'), Some(Key::Digit1));
        assert_eq!(physical_key_for_char('/'), Some(Key::Slash));
        assert_eq!(physical_key_for_char('é'), None);
    }

    #[test]
    fn every_letter_has_a_char() {
        for c in 'a'..='z' {
            let key = physical_key_for_char(c).unwrap();
            assert_eq!(UsLayout.unshifted(key), Some(c));
        }
    }
}
