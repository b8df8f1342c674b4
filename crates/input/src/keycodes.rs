//! Native scancode tables.
//!
//! Hosts pass the platform's raw keycode; the active table maps it to a
//! physical [`Key`]. Unknown codes map to [`Key::Unidentified`].

use collections::FxHashMap;
use once_cell::sync::Lazy;

use crate::Key;

/// Which native numbering the host's keycodes use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeycodeTable {
    /// The table of the platform this library was built for.
    #[default]
    Native,
    /// XKB keycodes (evdev + 8), as delivered by X11 and Wayland.
    Xkb,
    /// macOS virtual keycodes (`kVK_*`).
    Mac,
    /// Keycodes are already [`Key`] wire values.
    W3c,
}

const XKB: &[(u32, Key)] = &[
    (9, Key::Escape),
    (10, Key::Digit1),
    (11, Key::Digit2),
    (12, Key::Digit3),
    (13, Key::Digit4),
    (14, Key::Digit5),
    (15, Key::Digit6),
    (16, Key::Digit7),
    (17, Key::Digit8),
    (18, Key::Digit9),
    (19, Key::Digit0),
    (20, Key::Minus),
    (21, Key::Equal),
    (22, Key::Backspace),
    (23, Key::Tab),
    (24, Key::KeyQ),
    (25, Key::KeyW),
    (26, Key::KeyE),
    (27, Key::KeyR),
    (28, Key::KeyT),
    (29, Key::KeyY),
    (30, Key::KeyU),
    (31, Key::KeyI),
    (32, Key::KeyO),
    (33, Key::KeyP),
    (34, Key::BracketLeft),
    (35, Key::BracketRight),
    (36, Key::Enter),
    (37, Key::ControlLeft),
    (38, Key::KeyA),
    (39, Key::KeyS),
    (40, Key::KeyD),
    (41, Key::KeyF),
    (42, Key::KeyG),
    (43, Key::KeyH),
    (44, Key::KeyJ),
    (45, Key::KeyK),
    (46, Key::KeyL),
    (47, Key::Semicolon),
    (48, Key::Quote),
    (49, Key::Backquote),
    (50, Key::ShiftLeft),
    (51, Key::Backslash),
    (52, Key::KeyZ),
    (53, Key::KeyX),
    (54, Key::KeyC),
    (55, Key::KeyV),
    (56, Key::KeyB),
    (57, Key::KeyN),
    (58, Key::KeyM),
    (59, Key::Comma),
    (60, Key::Period),
    (61, Key::Slash),
    (62, Key::ShiftRight),
    (63, Key::NumpadMultiply),
    (64, Key::AltLeft),
    (65, Key::Space),
    (66, Key::CapsLock),
    (67, Key::F1),
    (68, Key::F2),
    (69, Key::F3),
    (70, Key::F4),
    (71, Key::F5),
    (72, Key::F6),
    (73, Key::F7),
    (74, Key::F8),
    (75, Key::F9),
    (76, Key::F10),
    (77, Key::NumLock),
    (78, Key::ScrollLock),
    (79, Key::Numpad7),
    (80, Key::Numpad8),
    (81, Key::Numpad9),
    (82, Key::NumpadSubtract),
    (83, Key::Numpad4),
    (84, Key::Numpad5),
    (85, Key::Numpad6),
    (86, Key::NumpadAdd),
    (87, Key::Numpad1),
    (88, Key::Numpad2),
    (89, Key::Numpad3),
    (90, Key::Numpad0),
    (91, Key::NumpadDecimal),
    (94, Key::IntlBackslash),
    (95, Key::F11),
    (96, Key::F12),
    (97, Key::IntlRo),
    (104, Key::NumpadEnter),
    (105, Key::ControlRight),
    (106, Key::NumpadDivide),
    (107, Key::PrintScreen),
    (108, Key::AltRight),
    (110, Key::Home),
    (111, Key::ArrowUp),
    (112, Key::PageUp),
    (113, Key::ArrowLeft),
    (114, Key::ArrowRight),
    (115, Key::End),
    (116, Key::ArrowDown),
    (117, Key::PageDown),
    (118, Key::Insert),
    (119, Key::Delete),
    (125, Key::NumpadEqual),
    (127, Key::Pause),
    (132, Key::IntlYen),
    (133, Key::MetaLeft),
    (134, Key::MetaRight),
    (135, Key::ContextMenu),
];

const MAC: &[(u32, Key)] = &[
    (0x00, Key::KeyA),
    (0x01, Key::KeyS),
    (0x02, Key::KeyD),
    (0x03, Key::KeyF),
    (0x04, Key::KeyH),
    (0x05, Key::KeyG),
    (0x06, Key::KeyZ),
    (0x07, Key::KeyX),
    (0x08, Key::KeyC),
    (0x09, Key::KeyV),
    (0x0A, Key::IntlBackslash),
    (0x0B, Key::KeyB),
    (0x0C, Key::KeyQ),
    (0x0D, Key::KeyW),
    (0x0E, Key::KeyE),
    (0x0F, Key::KeyR),
    (0x10, Key::KeyY),
    (0x11, Key::KeyT),
    (0x12, Key::Digit1),
    (0x13, Key::Digit2),
    (0x14, Key::Digit3),
    (0x15, Key::Digit4),
    (0x16, Key::Digit6),
    (0x17, Key::Digit5),
    (0x18, Key::Equal),
    (0x19, Key::Digit9),
    (0x1A, Key::Digit7),
    (0x1B, Key::Minus),
    (0x1C, Key::Digit8),
    (0x1D, Key::Digit0),
    (0x1E, Key::BracketRight),
    (0x1F, Key::KeyO),
    (0x20, Key::KeyU),
    (0x21, Key::BracketLeft),
    (0x22, Key::KeyI),
    (0x23, Key::KeyP),
    (0x24, Key::Enter),
    (0x25, Key::KeyL),
    (0x26, Key::KeyJ),
    (0x27, Key::Quote),
    (0x28, Key::KeyK),
    (0x29, Key::Semicolon),
    (0x2A, Key::Backslash),
    (0x2B, Key::Comma),
    (0x2C, Key::Slash),
    (0x2D, Key::KeyN),
    (0x2E, Key::KeyM),
    (0x2F, Key::Period),
    (0x30, Key::Tab),
    (0x31, Key::Space),
    (0x32, Key::Backquote),
    (0x33, Key::Backspace),
    (0x35, Key::Escape),
    (0x36, Key::MetaRight),
    (0x37, Key::MetaLeft),
    (0x38, Key::ShiftLeft),
    (0x39, Key::CapsLock),
    (0x3A, Key::AltLeft),
    (0x3B, Key::ControlLeft),
    (0x3C, Key::ShiftRight),
    (0x3D, Key::AltRight),
    (0x3E, Key::ControlRight),
    (0x3F, Key::Fn),
    (0x40, Key::F17),
    (0x41, Key::NumpadDecimal),
    (0x43, Key::NumpadMultiply),
    (0x45, Key::NumpadAdd),
    (0x47, Key::NumLock),
    (0x48, Key::AudioVolumeUp),
    (0x49, Key::AudioVolumeDown),
    (0x4A, Key::AudioVolumeMute),
    (0x4B, Key::NumpadDivide),
    (0x4C, Key::NumpadEnter),
    (0x4E, Key::NumpadSubtract),
    (0x4F, Key::F18),
    (0x50, Key::F19),
    (0x51, Key::NumpadEqual),
    (0x52, Key::Numpad0),
    (0x53, Key::Numpad1),
    (0x54, Key::Numpad2),
    (0x55, Key::Numpad3),
    (0x56, Key::Numpad4),
    (0x57, Key::Numpad5),
    (0x58, Key::Numpad6),
    (0x59, Key::Numpad7),
    (0x5A, Key::F20),
    (0x5B, Key::Numpad8),
    (0x5C, Key::Numpad9),
    (0x5D, Key::IntlYen),
    (0x5E, Key::IntlRo),
    (0x5F, Key::NumpadComma),
    (0x60, Key::F5),
    (0x61, Key::F6),
    (0x62, Key::F7),
    (0x63, Key::F3),
    (0x64, Key::F8),
    (0x65, Key::F9),
    (0x67, Key::F11),
    (0x69, Key::F13),
    (0x6A, Key::F16),
    (0x6B, Key::F14),
    (0x6D, Key::F10),
    (0x6E, Key::ContextMenu),
    (0x6F, Key::F12),
    (0x71, Key::F15),
    (0x72, Key::Insert),
    (0x73, Key::Home),
    (0x74, Key::PageUp),
    (0x75, Key::Delete),
    (0x76, Key::F4),
    (0x77, Key::End),
    (0x78, Key::F2),
    (0x79, Key::PageDown),
    (0x7A, Key::F1),
    (0x7B, Key::ArrowLeft),
    (0x7C, Key::ArrowRight),
    (0x7D, Key::ArrowDown),
    (0x7E, Key::ArrowUp),
];

static XKB_MAP: Lazy<FxHashMap<u32, Key>> = Lazy::new(|| XKB.iter().copied().collect());
static MAC_MAP: Lazy<FxHashMap<u32, Key>> = Lazy::new(|| MAC.iter().copied().collect());

impl KeycodeTable {
    /// Resolve `Native` to the concrete table for this platform.
    pub fn resolve(self) -> Self {
        match self {
            Self::Native if cfg!(target_os = "macos") => Self::Mac,
            Self::Native if cfg!(any(target_os = "linux", target_os = "freebsd")) => Self::Xkb,
            Self::Native => Self::W3c,
            other => other,
        }
    }

    pub fn key(self, keycode: u32) -> Key {
        let key = match self.resolve() {
            Self::Xkb => XKB_MAP.get(&keycode).copied(),
            Self::Mac => MAC_MAP.get(&keycode).copied(),
            Self::W3c | Self::Native => Key::from_raw(keycode),
        };
        key.unwrap_or(Key::Unidentified)
    }

    /// Reverse lookup, for hosts and tests that synthesize events.
    pub fn keycode(self, key: Key) -> Option<u32> {
        let table = match self.resolve() {
            Self::Xkb => XKB,
            Self::Mac => MAC,
            Self::W3c | Self::Native => return Some(key.to_raw()),
        };
        table.iter().find(|(_, k)| *k == key).map(|(code, _)| *code)
    }
}
