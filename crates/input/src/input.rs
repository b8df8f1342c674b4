//! Keyboard input: keys, modifiers, triggers, the binding table and the
//! translation pipeline from raw key events to bindings or terminal input.

mod action;
mod binding;
mod event;
mod key;
pub mod keycodes;
pub mod layout;
mod mods;
mod translate;
mod trigger;

pub use action::{
    ActionParseError, BindingAction, CloseTabMode, GotoSplit, GotoTab, GotoWindow, InspectorMode,
    PromptTitle, ResizeDirection, SplitDirection,
};
pub use binding::{
    parse_binding, Binding, BindingFlags, BindingParseError, BindingSet, ParsedBinding,
};
pub use event::{KeyAction, KeyEvent};
pub use key::Key;
pub use keycodes::KeycodeTable;
pub use layout::{KeyboardLayout, Translated, UsLayout};
pub use mods::{Mods, OptionAsAlt};
pub use translate::{BindingMatch, KeyTranslator, Translation};
pub use trigger::{Trigger, TriggerKey, TriggerParseError};
