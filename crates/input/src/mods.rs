//! Modifier state.

use bitflags::bitflags;
use serde::Deserialize;

bitflags! {
    /// Modifier keys held during a key event.
    ///
    /// Bit layout is part of the embedding wire format. The `*_RIGHT` bits
    /// are side hints: they are only meaningful alongside their base bit.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
    pub struct Mods: u32 {
        const SHIFT = 1 << 0;
        const CTRL = 1 << 1;
        const ALT = 1 << 2;
        const SUPER = 1 << 3;
        const CAPS = 1 << 4;
        const NUM = 1 << 5;
        const SHIFT_RIGHT = 1 << 6;
        const CTRL_RIGHT = 1 << 7;
        const ALT_RIGHT = 1 << 8;
        const SUPER_RIGHT = 1 << 9;
    }
}

impl Mods {
    /// The modifiers that take part in binding matching.
    pub const BINDING: Mods = Mods::SHIFT
        .union(Mods::CTRL)
        .union(Mods::ALT)
        .union(Mods::SUPER);

    /// Strip lock keys and side hints, leaving what triggers compare against.
    pub fn binding(self) -> Mods {
        self & Self::BINDING
    }

    /// Modifiers to hand to the layout when producing text.
    ///
    /// When option-as-alt applies to the pressed Alt key, Alt is removed so
    /// the layout produces the plain character and Alt is left for the
    /// terminal encoder.
    pub fn translation(self, option_as_alt: OptionAsAlt) -> Mods {
        if !self.contains(Mods::ALT) {
            return self;
        }

        let right = self.contains(Mods::ALT_RIGHT);
        let strip = match option_as_alt {
            OptionAsAlt::False => false,
            OptionAsAlt::True => true,
            OptionAsAlt::Left => !right,
            OptionAsAlt::Right => right,
        };

        if strip {
            self - Mods::ALT - Mods::ALT_RIGHT
        } else {
            self
        }
    }
}

/// Which Option keys behave as Alt instead of composing characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OptionAsAlt {
    #[default]
    False,
    True,
    Left,
    Right,
}

impl<'de> Deserialize<'de> for OptionAsAlt {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Bool(bool),
            Str(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Bool(true) => Ok(Self::True),
            Raw::Bool(false) => Ok(Self::False),
            Raw::Str(s) => match s.as_str() {
                "true" => Ok(Self::True),
                "false" => Ok(Self::False),
                "left" => Ok(Self::Left),
                "right" => Ok(Self::Right),
                other => Err(serde::de::Error::custom(format!(
                    "expected true, false, left or right, got {other:?}"
                ))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test]
    fn wire_bits() {
        assert_eq!(Mods::SHIFT.bits(), 1);
        assert_eq!(Mods::CTRL.bits(), 2);
        assert_eq!(Mods::ALT.bits(), 4);
        assert_eq!(Mods::SUPER.bits(), 8);
        assert_eq!(Mods::CAPS.bits(), 16);
        assert_eq!(Mods::NUM.bits(), 32);
        assert_eq!(Mods::SUPER_RIGHT.bits(), 512);
    }

    #[test]
    fn binding_strips_locks_and_sides() {
        let mods = Mods::CTRL | Mods::CTRL_RIGHT | Mods::CAPS | Mods::NUM | Mods::SHIFT;
        assert_eq!(mods.binding(), Mods::CTRL | Mods::SHIFT);
    }

    #[test_case(OptionAsAlt::False, Mods::ALT, Mods::ALT ; "disabled keeps alt")]
    #[test_case(OptionAsAlt::True, Mods::ALT, Mods::empty() ; "enabled strips alt")]
    #[test_case(OptionAsAlt::Left, Mods::ALT, Mods::empty() ; "left strips left alt")]
    #[test_case(OptionAsAlt::Left, Mods::ALT | Mods::ALT_RIGHT, Mods::ALT | Mods::ALT_RIGHT ; "left keeps right alt")]
    #[test_case(OptionAsAlt::Right, Mods::ALT | Mods::ALT_RIGHT, Mods::empty() ; "right strips right alt")]
    #[test_case(OptionAsAlt::Right, Mods::ALT, Mods::ALT ; "right keeps left alt")]
    fn translation_mods(policy: OptionAsAlt, mods: Mods, expected: Mods) {
        assert_eq!(mods.translation(policy), expected);
    }

    #[test]
    fn translation_leaves_other_mods() {
        let mods = Mods::ALT | Mods::SHIFT | Mods::CTRL;
        assert_eq!(mods.translation(OptionAsAlt::True), Mods::SHIFT | Mods::CTRL);
    }

    #[derive(Deserialize)]
    struct Wrapper {
        value: OptionAsAlt,
    }

    #[test_case("value = true", OptionAsAlt::True ; "bool true")]
    #[test_case("value = false", OptionAsAlt::False ; "bool false")]
    #[test_case(r#"value = "left""#, OptionAsAlt::Left ; "left")]
    #[test_case(r#"value = "right""#, OptionAsAlt::Right ; "right")]
    fn option_as_alt_deserializes(src: &str, expected: OptionAsAlt) {
        let parsed: Wrapper = toml::from_str(src).unwrap();
        assert_eq!(parsed.value, expected);
    }

    #[test]
    fn option_as_alt_rejects_unknown() {
        let parsed: Result<Wrapper, _> = toml::from_str(r#"value = "both""#);
        assert!(parsed.is_err());
    }
}
