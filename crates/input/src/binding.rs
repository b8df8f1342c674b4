//! The binding table.
//!
//! A keybind line reads `[prefix:]*trigger=action`. Prefixes adjust the
//! binding's flags:
//!
//! - `global:` fires even when the application is not focused
//! - `all:` performs the action on every surface
//! - `unconsumed:` performs the action and still forwards the key
//! - `performable:` marks the binding for UI affordances

use std::fmt;

use bitflags::bitflags;
use collections::IndexMap;

use crate::action::ActionParseError;
use crate::trigger::TriggerParseError;
use crate::{BindingAction, Trigger, TriggerKey};

bitflags! {
    /// Flags of a resolved binding. Bit layout is part of the wire format.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BindingFlags: u32 {
        /// The key is absorbed and not forwarded to the terminal.
        const CONSUMED = 1 << 0;
        /// Performed on every surface, not just the focused one.
        const ALL = 1 << 1;
        /// Fires through the application entry point without focus.
        const GLOBAL = 1 << 2;
        /// Advisory: hosts may use it to enable menu items.
        const PERFORMABLE = 1 << 3;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub action: BindingAction,
    pub flags: BindingFlags,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingParseError {
    #[error("keybind {0:?} is missing '='")]
    MissingSeparator(String),
    #[error(transparent)]
    Trigger(#[from] TriggerParseError),
    #[error(transparent)]
    Action(#[from] ActionParseError),
}

/// One parsed keybind line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBinding {
    pub trigger: Trigger,
    pub action: BindingAction,
    pub flags: BindingFlags,
}

/// Split `trigger=action`, letting `=` itself be the trigger key
/// (`ctrl+==reset_font_size`, `==text:x`).
fn split_assignment(line: &str) -> Option<(&str, &str)> {
    let bytes = line.as_bytes();
    (1..bytes.len())
        .find(|&i| bytes[i] == b'=' && bytes[i - 1] != b'+')
        .map(|i| (&line[..i], &line[i + 1..]))
}

pub fn parse_binding(line: &str) -> Result<ParsedBinding, BindingParseError> {
    let mut rest = line.trim();
    let mut flags = BindingFlags::CONSUMED;

    loop {
        if let Some(tail) = rest.strip_prefix("global:") {
            flags |= BindingFlags::GLOBAL;
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix("all:") {
            flags |= BindingFlags::ALL;
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix("unconsumed:") {
            flags -= BindingFlags::CONSUMED;
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix("performable:") {
            flags |= BindingFlags::PERFORMABLE;
            rest = tail;
        } else {
            break;
        }
    }

    let (trigger, action) =
        split_assignment(rest).ok_or_else(|| BindingParseError::MissingSeparator(line.into()))?;

    Ok(ParsedBinding {
        trigger: trigger.parse()?,
        action: action.parse()?,
        flags,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingSet {
    bindings: IndexMap<Trigger, Binding>,
}

impl BindingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    pub fn put(&mut self, trigger: Trigger, binding: Binding) {
        self.bindings.insert(trigger, binding);
    }

    pub fn remove(&mut self, trigger: &Trigger) -> Option<Binding> {
        self.bindings.shift_remove(trigger)
    }

    pub fn get(&self, trigger: &Trigger) -> Option<&Binding> {
        self.bindings.get(trigger)
    }

    /// Parse one keybind line and apply it. `unbind` removes the trigger.
    pub fn parse_and_put(&mut self, line: &str) -> Result<(), BindingParseError> {
        let parsed = parse_binding(line)?;
        if parsed.action == BindingAction::Unbind {
            self.remove(&parsed.trigger);
        } else {
            self.put(
                parsed.trigger,
                Binding {
                    action: parsed.action,
                    flags: parsed.flags,
                },
            );
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Trigger, &Binding)> {
        self.bindings.iter()
    }

    /// First trigger bound to `action`, for menu accelerators.
    pub fn trigger_for(&self, action: &BindingAction) -> Option<Trigger> {
        self.bindings
            .iter()
            .find(|(trigger, binding)| {
                binding.action == *action && trigger.key != TriggerKey::CatchAll
            })
            .map(|(trigger, _)| *trigger)
    }

    pub fn has_global(&self) -> bool {
        self.bindings
            .values()
            .any(|binding| binding.flags.contains(BindingFlags::GLOBAL))
    }
}

impl fmt::Display for ParsedBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.flags.contains(BindingFlags::GLOBAL) {
            f.write_str("global:")?;
        }
        if self.flags.contains(BindingFlags::ALL) {
            f.write_str("all:")?;
        }
        if !self.flags.contains(BindingFlags::CONSUMED) {
            f.write_str("unconsumed:")?;
        }
        if self.flags.contains(BindingFlags::PERFORMABLE) {
            f.write_str("performable:")?;
        }
        write!(f, "{}={}", self.trigger, self.action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Key, Mods};
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    // === Line parsing ===

    #[test]
    fn plain_binding_is_consumed() {
        let parsed = parse_binding("ctrl+shift+k=new_tab").unwrap();
        assert_eq!(parsed.trigger, Trigger::unicode('k', Mods::CTRL | Mods::SHIFT));
        assert_eq!(parsed.action, BindingAction::NewTab);
        assert_eq!(parsed.flags, BindingFlags::CONSUMED);
    }

    #[test_case("global:super+t=new_window", BindingFlags::CONSUMED | BindingFlags::GLOBAL ; "global")]
    #[test_case("all:ctrl+l=text:x", BindingFlags::CONSUMED | BindingFlags::ALL ; "all")]
    #[test_case("unconsumed:ctrl+a=new_tab", BindingFlags::empty() ; "unconsumed")]
    #[test_case("performable:super+c=copy_to_clipboard", BindingFlags::CONSUMED | BindingFlags::PERFORMABLE ; "performable")]
    #[test_case("global:all:unconsumed:a=ignore", BindingFlags::GLOBAL | BindingFlags::ALL ; "stacked prefixes")]
    fn prefixes_set_flags(line: &str, flags: BindingFlags) {
        assert_eq!(parse_binding(line).unwrap().flags, flags);
    }

    #[test_case("ctrl+==new_tab", Trigger::unicode('=', Mods::CTRL) ; "equal with modifier")]
    #[test_case("==new_tab", Trigger::unicode('=', Mods::empty()) ; "bare equal")]
    fn equal_sign_trigger(line: &str, trigger: Trigger) {
        assert_eq!(parse_binding(line).unwrap().trigger, trigger);
    }

    #[test]
    fn missing_separator() {
        assert_eq!(
            parse_binding("ctrl+a"),
            Err(BindingParseError::MissingSeparator("ctrl+a".into()))
        );
    }

    #[test]
    fn errors_carry_their_source() {
        assert!(matches!(
            parse_binding("ctrl+nope=new_tab"),
            Err(BindingParseError::Trigger(_))
        ));
        assert!(matches!(
            parse_binding("ctrl+a=fly"),
            Err(BindingParseError::Action(_))
        ));
    }

    #[test]
    fn parsed_binding_display_round_trips() {
        let line = "global:unconsumed:super+shift+t=new_split:right";
        assert_eq!(parse_binding(line).unwrap().to_string(), line);
    }

    // === BindingSet ===

    #[test]
    fn later_binding_replaces_earlier() {
        let mut set = BindingSet::new();
        set.parse_and_put("ctrl+a=new_tab").unwrap();
        set.parse_and_put("ctrl+a=new_window").unwrap();
        assert_eq!(set.len(), 1);
        let binding = set.get(&Trigger::unicode('a', Mods::CTRL)).unwrap();
        assert_eq!(binding.action, BindingAction::NewWindow);
    }

    #[test]
    fn unbind_removes() {
        let mut set = BindingSet::new();
        set.parse_and_put("ctrl+a=new_tab").unwrap();
        set.parse_and_put("ctrl+a=unbind").unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn unbind_of_missing_trigger_is_harmless() {
        let mut set = BindingSet::new();
        set.parse_and_put("ctrl+a=unbind").unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn trigger_for_skips_catch_all() {
        let mut set = BindingSet::new();
        set.parse_and_put("catch_all=ignore").unwrap();
        set.parse_and_put("physical:escape=ignore").unwrap();
        assert_eq!(
            set.trigger_for(&BindingAction::Ignore),
            Some(Trigger::physical(Key::Escape, Mods::empty()))
        );
        assert_eq!(set.trigger_for(&BindingAction::Quit), None);
    }

    #[test]
    fn has_global() {
        let mut set = BindingSet::new();
        set.parse_and_put("ctrl+a=new_tab").unwrap();
        assert!(!set.has_global());
        set.parse_and_put("global:ctrl+`=toggle_quick_terminal").unwrap();
        assert!(set.has_global());
    }
}
