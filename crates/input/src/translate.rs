//! Key event translation and binding lookup.

use smallvec::SmallVec;

use crate::keycodes::KeycodeTable;
use crate::layout::KeyboardLayout;
use crate::{
    Binding, BindingAction, BindingFlags, BindingSet, KeyAction, KeyEvent, Mods, OptionAsAlt,
    Trigger,
};

/// A binding that matched an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingMatch {
    pub trigger: Trigger,
    pub action: BindingAction,
    pub flags: BindingFlags,
}

impl BindingMatch {
    fn new(trigger: Trigger, binding: &Binding) -> Self {
        Self {
            trigger,
            action: binding.action.clone(),
            flags: binding.flags,
        }
    }

    pub fn consumed(&self) -> bool {
        self.flags.contains(BindingFlags::CONSUMED)
    }
}

/// Outcome of translating one key event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    /// Composition is in progress; the event belongs to the IME.
    Composing(KeyEvent),
    /// A binding matched.
    Binding {
        event: KeyEvent,
        binding: BindingMatch,
    },
    /// Nothing matched; the event goes to the terminal.
    Forward(KeyEvent),
}

impl Translation {
    pub fn event(&self) -> &KeyEvent {
        match self {
            Self::Composing(event) | Self::Forward(event) => event,
            Self::Binding { event, .. } => event,
        }
    }

    pub fn binding(&self) -> Option<&BindingMatch> {
        match self {
            Self::Binding { binding, .. } => Some(binding),
            _ => None,
        }
    }
}

/// Everything translation depends on. Holding only borrowed, immutable
/// inputs keeps [`KeyTranslator::translate`] a pure function.
#[derive(Debug, Clone, Copy)]
pub struct KeyTranslator<'a> {
    pub layout: &'a dyn KeyboardLayout,
    pub keycodes: KeycodeTable,
    pub option_as_alt: OptionAsAlt,
    pub bindings: &'a BindingSet,
}

impl<'a> KeyTranslator<'a> {
    pub fn new(
        layout: &'a dyn KeyboardLayout,
        keycodes: KeycodeTable,
        option_as_alt: OptionAsAlt,
        bindings: &'a BindingSet,
    ) -> Self {
        Self {
            layout,
            keycodes,
            option_as_alt,
            bindings,
        }
    }

    /// Mods the layout sees when producing text for `mods`.
    pub fn translation_mods(&self, mods: Mods) -> Mods {
        mods.translation(self.option_as_alt)
    }

    /// Fill in whatever the host left empty.
    pub fn normalize(&self, mut event: KeyEvent) -> KeyEvent {
        if event.key == crate::Key::Unidentified && event.keycode != 0 {
            event.key = self.keycodes.key(event.keycode);
        }

        if event.unshifted_codepoint.is_none() {
            event.unshifted_codepoint = self.layout.unshifted(event.key);
        }

        let produces_text = !event.composing && event.action != KeyAction::Release;
        if produces_text && event.text.is_empty() {
            let translated = self
                .layout
                .translate(event.key, self.translation_mods(event.mods));
            event.text = translated.text;
            event.consumed_mods = translated.consumed;
        }

        event
    }

    pub fn translate(&self, event: KeyEvent) -> Translation {
        let event = self.normalize(event);
        if event.composing {
            return Translation::Composing(event);
        }
        match self.probe(&event) {
            Some(binding) => Translation::Binding { event, binding },
            None => Translation::Forward(event),
        }
    }

    /// Triggers to try for `event`, most specific first.
    fn candidates(event: &KeyEvent) -> SmallVec<[Trigger; 4]> {
        let mods = event.mods.binding();
        let mut candidates = SmallVec::new();

        if event.key != crate::Key::Unidentified {
            candidates.push(Trigger::physical(event.key, mods));
        }

        let codepoint = event.unshifted_codepoint.or_else(|| {
            event
                .single_codepoint()
                .and_then(|c| c.to_lowercase().next())
        });
        if let Some(c) = codepoint {
            candidates.push(Trigger::unicode(c, mods));
        }

        candidates.push(Trigger::catch_all(mods));
        if !mods.is_empty() {
            candidates.push(Trigger::catch_all(Mods::empty()));
        }
        candidates
    }

    /// Look the event up in the binding table without acting on it.
    /// Composing and release events never match.
    pub fn probe(&self, event: &KeyEvent) -> Option<BindingMatch> {
        if event.composing || event.action == KeyAction::Release {
            return None;
        }
        Self::candidates(event).into_iter().find_map(|trigger| {
            self.bindings
                .get(&trigger)
                .map(|binding| BindingMatch::new(trigger, binding))
        })
    }

    /// Normalize then probe.
    pub fn lookup(&self, event: KeyEvent) -> Option<BindingMatch> {
        self.probe(&self.normalize(event))
    }
}
