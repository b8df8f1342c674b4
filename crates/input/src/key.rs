//! Physical key identities.
//!
//! Based on the W3C UI Events `code` values. The declaration order is the
//! wire order: the discriminant of each variant is the value exchanged with
//! embedders, so new keys are only ever appended.

use std::fmt;
use std::str::FromStr;

macro_rules! keys {
    ($($variant:ident => $name:literal,)*) => {
        /// A physical key, independent of the active keyboard layout.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u32)]
        pub enum Key {
            $($variant,)*
        }

        impl Key {
            /// Every key in wire order.
            pub const ALL: &'static [Key] = &[$(Key::$variant,)*];

            /// Config-file name, e.g. `arrow_up` or `key_a`.
            pub fn name(self) -> &'static str {
                match self {
                    $(Key::$variant => $name,)*
                }
            }

            pub fn from_name(name: &str) -> Option<Key> {
                match name {
                    $($name => Some(Key::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

keys! {
    Unidentified => "unidentified",
    Backquote => "backquote",
    Backslash => "backslash",
    BracketLeft => "bracket_left",
    BracketRight => "bracket_right",
    Comma => "comma",
    Digit0 => "digit_0",
    Digit1 => "digit_1",
    Digit2 => "digit_2",
    Digit3 => "digit_3",
    Digit4 => "digit_4",
    Digit5 => "digit_5",
    Digit6 => "digit_6",
    Digit7 => "digit_7",
    Digit8 => "digit_8",
    Digit9 => "digit_9",
    Equal => "equal",
    IntlBackslash => "intl_backslash",
    IntlRo => "intl_ro",
    IntlYen => "intl_yen",
    KeyA => "key_a",
    KeyB => "key_b",
    KeyC => "key_c",
    KeyD => "key_d",
    KeyE => "key_e",
    KeyF => "key_f",
    KeyG => "key_g",
    KeyH => "key_h",
    KeyI => "key_i",
    KeyJ => "key_j",
    KeyK => "key_k",
    KeyL => "key_l",
    KeyM => "key_m",
    KeyN => "key_n",
    KeyO => "key_o",
    KeyP => "key_p",
    KeyQ => "key_q",
    KeyR => "key_r",
    KeyS => "key_s",
    KeyT => "key_t",
    KeyU => "key_u",
    KeyV => "key_v",
    KeyW => "key_w",
    KeyX => "key_x",
    KeyY => "key_y",
    KeyZ => "key_z",
    Minus => "minus",
    Period => "period",
    Quote => "quote",
    Semicolon => "semicolon",
    Slash => "slash",
    AltLeft => "alt_left",
    AltRight => "alt_right",
    Backspace => "backspace",
    CapsLock => "caps_lock",
    ContextMenu => "context_menu",
    ControlLeft => "control_left",
    ControlRight => "control_right",
    Enter => "enter",
    MetaLeft => "meta_left",
    MetaRight => "meta_right",
    ShiftLeft => "shift_left",
    ShiftRight => "shift_right",
    Space => "space",
    Tab => "tab",
    Convert => "convert",
    KanaMode => "kana_mode",
    NonConvert => "non_convert",
    Delete => "delete",
    End => "end",
    Help => "help",
    Home => "home",
    Insert => "insert",
    PageDown => "page_down",
    PageUp => "page_up",
    ArrowDown => "arrow_down",
    ArrowLeft => "arrow_left",
    ArrowRight => "arrow_right",
    ArrowUp => "arrow_up",
    NumLock => "num_lock",
    Numpad0 => "numpad_0",
    Numpad1 => "numpad_1",
    Numpad2 => "numpad_2",
    Numpad3 => "numpad_3",
    Numpad4 => "numpad_4",
    Numpad5 => "numpad_5",
    Numpad6 => "numpad_6",
    Numpad7 => "numpad_7",
    Numpad8 => "numpad_8",
    Numpad9 => "numpad_9",
    NumpadAdd => "numpad_add",
    NumpadBackspace => "numpad_backspace",
    NumpadClear => "numpad_clear",
    NumpadClearEntry => "numpad_clear_entry",
    NumpadComma => "numpad_comma",
    NumpadDecimal => "numpad_decimal",
    NumpadDivide => "numpad_divide",
    NumpadEnter => "numpad_enter",
    NumpadEqual => "numpad_equal",
    NumpadMemoryAdd => "numpad_memory_add",
    NumpadMemoryClear => "numpad_memory_clear",
    NumpadMemoryRecall => "numpad_memory_recall",
    NumpadMemoryStore => "numpad_memory_store",
    NumpadMemorySubtract => "numpad_memory_subtract",
    NumpadMultiply => "numpad_multiply",
    NumpadParenLeft => "numpad_paren_left",
    NumpadParenRight => "numpad_paren_right",
    NumpadSubtract => "numpad_subtract",
    NumpadSeparator => "numpad_separator",
    NumpadUp => "numpad_up",
    NumpadDown => "numpad_down",
    NumpadRight => "numpad_right",
    NumpadLeft => "numpad_left",
    NumpadBegin => "numpad_begin",
    NumpadHome => "numpad_home",
    NumpadEnd => "numpad_end",
    NumpadInsert => "numpad_insert",
    NumpadDelete => "numpad_delete",
    NumpadPageUp => "numpad_page_up",
    NumpadPageDown => "numpad_page_down",
    Escape => "escape",
    F1 => "f1",
    F2 => "f2",
    F3 => "f3",
    F4 => "f4",
    F5 => "f5",
    F6 => "f6",
    F7 => "f7",
    F8 => "f8",
    F9 => "f9",
    F10 => "f10",
    F11 => "f11",
    F12 => "f12",
    F13 => "f13",
    F14 => "f14",
    F15 => "f15",
    F16 => "f16",
    F17 => "f17",
    F18 => "f18",
    F19 => "f19",
    F20 => "f20",
    F21 => "f21",
    F22 => "f22",
    F23 => "f23",
    F24 => "f24",
    F25 => "f25",
    Fn => "fn",
    FnLock => "fn_lock",
    PrintScreen => "print_screen",
    ScrollLock => "scroll_lock",
    Pause => "pause",
    BrowserBack => "browser_back",
    BrowserFavorites => "browser_favorites",
    BrowserForward => "browser_forward",
    BrowserHome => "browser_home",
    BrowserRefresh => "browser_refresh",
    BrowserSearch => "browser_search",
    BrowserStop => "browser_stop",
    Eject => "eject",
    LaunchApp1 => "launch_app_1",
    LaunchApp2 => "launch_app_2",
    LaunchMail => "launch_mail",
    MediaPlayPause => "media_play_pause",
    MediaSelect => "media_select",
    MediaStop => "media_stop",
    MediaTrackNext => "media_track_next",
    MediaTrackPrevious => "media_track_previous",
    Power => "power",
    Sleep => "sleep",
    AudioVolumeDown => "audio_volume_down",
    AudioVolumeMute => "audio_volume_mute",
    AudioVolumeUp => "audio_volume_up",
    WakeUp => "wake_up",
    Copy => "copy",
    Cut => "cut",
    Paste => "paste",
}

impl Default for Key {
    fn default() -> Self {
        Key::Unidentified
    }
}

impl Key {
    /// Wire value of this key.
    pub fn to_raw(self) -> u32 {
        self as u32
    }

    /// Decode a wire value. Values from a newer engine map to `None`.
    pub fn from_raw(raw: u32) -> Option<Key> {
        Self::ALL.get(raw as usize).copied()
    }

    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            Key::ShiftLeft
                | Key::ShiftRight
                | Key::ControlLeft
                | Key::ControlRight
                | Key::AltLeft
                | Key::AltRight
                | Key::MetaLeft
                | Key::MetaRight
                | Key::CapsLock
                | Key::NumLock
        )
    }

    /// True for keys whose produced character depends on the layout.
    pub fn is_writing_system(self) -> bool {
        self >= Key::Backquote && self <= Key::Slash
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Key {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Key::from_name(s).ok_or(())
    }
}
