//! Binding triggers and their text syntax.
//!
//! A trigger is written as modifiers and one key joined by `+`:
//! `ctrl+shift+k`, `super+arrow_up`, `physical:a`, `catch_all`. Single
//! characters are unicode triggers, W3C key names are physical triggers.

use std::fmt;
use std::str::FromStr;

use crate::layout::physical_key_for_char;
use crate::{Key, Mods};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerKey {
    /// A physical key position.
    Physical(Key),
    /// The unshifted codepoint the layout assigns to the key.
    Unicode(char),
    /// Any key not matched by a more specific trigger.
    CatchAll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Trigger {
    pub key: TriggerKey,
    pub mods: Mods,
}

impl Trigger {
    /// Build a trigger. Lock keys and side hints are dropped from `mods`.
    pub fn new(key: TriggerKey, mods: Mods) -> Self {
        Self {
            key,
            mods: mods.binding(),
        }
    }

    pub fn physical(key: Key, mods: Mods) -> Self {
        Self::new(TriggerKey::Physical(key), mods)
    }

    pub fn unicode(c: char, mods: Mods) -> Self {
        Self::new(TriggerKey::Unicode(c), mods)
    }

    pub fn catch_all(mods: Mods) -> Self {
        Self::new(TriggerKey::CatchAll, mods)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TriggerParseError {
    #[error("empty trigger")]
    Empty,
    #[error("trigger {0:?} has no key")]
    MissingKey(String),
    #[error("unknown key {0:?}")]
    UnknownKey(String),
    #[error("modifier {0:?} given more than once")]
    DuplicateModifier(String),
    #[error("trigger {0:?} names more than one key")]
    MultipleKeys(String),
}

fn parse_modifier(token: &str) -> Option<Mods> {
    match token {
        "shift" => Some(Mods::SHIFT),
        "ctrl" | "control" => Some(Mods::CTRL),
        "alt" | "opt" | "option" => Some(Mods::ALT),
        "super" | "cmd" | "command" => Some(Mods::SUPER),
        _ => None,
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    let c = chars.next()?;
    chars.next().is_none().then_some(c)
}

fn parse_key(token: &str) -> Result<TriggerKey, TriggerParseError> {
    if token == "catch_all" {
        return Ok(TriggerKey::CatchAll);
    }

    if let Some(physical) = token.strip_prefix("physical:") {
        if let Some(key) = Key::from_name(physical) {
            return Ok(TriggerKey::Physical(key));
        }
        return single_char(physical)
            .and_then(|c| physical_key_for_char(c.to_ascii_lowercase()))
            .map(TriggerKey::Physical)
            .ok_or_else(|| TriggerParseError::UnknownKey(token.to_string()));
    }

    if let Some(key) = Key::from_name(token) {
        return Ok(TriggerKey::Physical(key));
    }

    match single_char(token) {
        Some(c) => {
            // Unshifted codepoints are lowercase; `ctrl+K` means `ctrl+k`.
            let mut lower = c.to_lowercase();
            match (lower.next(), lower.next()) {
                (Some(l), None) => Ok(TriggerKey::Unicode(l)),
                _ => Ok(TriggerKey::Unicode(c)),
            }
        }
        None => Err(TriggerParseError::UnknownKey(token.to_string())),
    }
}

impl FromStr for Trigger {
    type Err = TriggerParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TriggerParseError::Empty);
        }

        // A literal `+` key: `+` alone or `ctrl++`.
        let (mod_part, plus_key) = if s == "+" {
            ("", true)
        } else if let Some(prefix) = s.strip_suffix("++") {
            (prefix, true)
        } else {
            (s, false)
        };

        let mut tokens: Vec<&str> = if mod_part.is_empty() {
            Vec::new()
        } else {
            mod_part.split('+').collect()
        };
        if plus_key {
            tokens.push("+");
        }

        let mut mods = Mods::empty();
        let mut key = None;
        for token in tokens {
            if token.is_empty() {
                return Err(TriggerParseError::MissingKey(s.to_string()));
            }
            if let Some(modifier) = parse_modifier(token) {
                if mods.contains(modifier) {
                    return Err(TriggerParseError::DuplicateModifier(token.to_string()));
                }
                mods |= modifier;
                continue;
            }
            if key.is_some() {
                return Err(TriggerParseError::MultipleKeys(s.to_string()));
            }
            key = Some(parse_key(token)?);
        }

        let key = key.ok_or_else(|| TriggerParseError::MissingKey(s.to_string()))?;
        Ok(Trigger::new(key, mods))
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (flag, name) in [
            (Mods::SUPER, "super"),
            (Mods::CTRL, "ctrl"),
            (Mods::ALT, "alt"),
            (Mods::SHIFT, "shift"),
        ] {
            if self.mods.contains(flag) {
                write!(f, "{name}+")?;
            }
        }
        match self.key {
            TriggerKey::Physical(key) => f.write_str(key.name()),
            TriggerKey::Unicode(c) => write!(f, "{c}"),
            TriggerKey::CatchAll => f.write_str("catch_all"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use test_case::test_case;

    // === Parsing ===

    #[test_case("ctrl+shift+k", Trigger::unicode('k', Mods::CTRL | Mods::SHIFT) ; "unicode with mods")]
    #[test_case("ctrl+K", Trigger::unicode('k', Mods::CTRL) ; "uppercase folds")]
    #[test_case("super+arrow_up", Trigger::physical(Key::ArrowUp, Mods::SUPER) ; "named key")]
    #[test_case("physical:a", Trigger::physical(Key::KeyA, Mods::empty()) ; "physical char")]
    #[test_case("cmd+physical:digit_1", Trigger::physical(Key::Digit1, Mods::SUPER) ; "physical name")]
    #[test_case("catch_all", Trigger::catch_all(Mods::empty()) ; "catch all")]
    #[test_case("ctrl+catch_all", Trigger::catch_all(Mods::CTRL) ; "catch all with mods")]
    #[test_case("opt+control+x", Trigger::unicode('x', Mods::ALT | Mods::CTRL) ; "aliases")]
    #[test_case("ctrl++", Trigger::unicode('+', Mods::CTRL) ; "plus key")]
    #[test_case("+", Trigger::unicode('+', Mods::empty()) ; "bare plus")]
    #[test_case("ctrl+=", Trigger::unicode('=', Mods::CTRL) ; "equal sign")]
    fn parses(src: &str, expected: Trigger) {
        assert_eq!(src.parse::<Trigger>(), Ok(expected));
    }

    #[test_case("", TriggerParseError::Empty ; "empty")]
    #[test_case("ctrl+shift", TriggerParseError::MissingKey("ctrl+shift".into()) ; "mods only")]
    #[test_case("ctrl+ctrl+a", TriggerParseError::DuplicateModifier("ctrl".into()) ; "duplicate modifier")]
    #[test_case("a+b", TriggerParseError::MultipleKeys("a+b".into()) ; "two keys")]
    #[test_case("ctrl+nope", TriggerParseError::UnknownKey("nope".into()) ; "unknown name")]
    #[test_case("physical:é", TriggerParseError::UnknownKey("physical:é".into()) ; "physical without us position")]
    fn rejects(src: &str, expected: TriggerParseError) {
        assert_eq!(src.parse::<Trigger>(), Err(expected));
    }

    // === Display ===

    #[test]
    fn display_orders_modifiers() {
        let trigger = Trigger::unicode('t', Mods::SHIFT | Mods::SUPER);
        assert_eq!(trigger.to_string(), "super+shift+t");
    }

    #[test]
    fn new_drops_side_and_lock_bits() {
        let trigger = Trigger::unicode('a', Mods::CTRL | Mods::CTRL_RIGHT | Mods::CAPS);
        assert_eq!(trigger.mods, Mods::CTRL);
    }

    fn arb_trigger() -> impl Strategy<Value = Trigger> {
        let key = prop_oneof![
            (0..Key::ALL.len()).prop_map(|i| TriggerKey::Physical(Key::ALL[i])),
            proptest::char::range('!', '~')
                .prop_filter("lowercase only", |c| !c.is_ascii_uppercase())
                .prop_map(TriggerKey::Unicode),
            Just(TriggerKey::CatchAll),
        ];
        (key, 0u32..16).prop_map(|(key, bits)| Trigger::new(key, Mods::from_bits_truncate(bits)))
    }

    proptest! {
        /// Property: every trigger's text form parses back to the same trigger.
        #[test]
        fn prop_display_parses_back(trigger in arb_trigger()) {
            let text = trigger.to_string();
            prop_assert_eq!(text.parse::<Trigger>(), Ok(trigger), "text was {}", text);
        }
    }
}
