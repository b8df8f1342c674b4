//! Fixed-layout records shared with the host.
//!
//! Field order is part of the ABI. Enumerations travel as `u32` wire values
//! so a host built against a newer header can never hand us an invalid Rust
//! enum.

use std::ffi::{c_char, c_void, CStr, CString};
use std::ptr;

use input::{KeyAction, KeyEvent, Key, Mods, Trigger, TriggerKey};

use crate::{TbApp, TbSurface};

// =============================================================================
// TARGET
// =============================================================================

pub const TARGET_APP: u32 = 0;
pub const TARGET_SURFACE: u32 = 1;

/// Recipient of an action. `surface` is null for the app target.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TbTarget {
    pub tag: u32,
    pub surface: *mut TbSurface,
}

impl TbTarget {
    pub fn app() -> Self {
        Self {
            tag: TARGET_APP,
            surface: ptr::null_mut(),
        }
    }

    pub fn surface(surface: *mut TbSurface) -> Self {
        Self {
            tag: TARGET_SURFACE,
            surface,
        }
    }
}

// =============================================================================
// INPUT
// =============================================================================

/// One key event. The same record is used for handling a key and for asking
/// whether it is a binding.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TbInputKey {
    pub action: u32,
    pub mods: u32,
    pub consumed_mods: u32,
    /// Native scancode.
    pub keycode: u32,
    /// UTF-8 text the key produced, or null.
    pub text: *const c_char,
    /// Zero when unknown.
    pub unshifted_codepoint: u32,
    pub composing: bool,
}

impl TbInputKey {
    /// Decode the record. An unknown action value rejects the whole event.
    ///
    /// # Safety
    ///
    /// `text` must be null or point to a NUL-terminated string.
    pub unsafe fn to_event(&self) -> Option<KeyEvent> {
        let Some(action) = KeyAction::from_raw(self.action) else {
            tracing::warn!(action = self.action, "Key event with unknown action dropped");
            return None;
        };
        Some(KeyEvent {
            action,
            keycode: self.keycode,
            key: Key::default(),
            mods: Mods::from_bits_truncate(self.mods),
            consumed_mods: Mods::from_bits_truncate(self.consumed_mods),
            text: unsafe { read_cstr(self.text) },
            unshifted_codepoint: char::from_u32(self.unshifted_codepoint).filter(|c| *c != '\0'),
            composing: self.composing,
        })
    }

    /// Encode `event`. `text` must outlive the returned record.
    pub fn from_event(event: &KeyEvent, text: &CString) -> Self {
        Self {
            action: event.action as u32,
            mods: event.mods.bits(),
            consumed_mods: event.consumed_mods.bits(),
            keycode: event.keycode,
            text: if event.text.is_empty() {
                ptr::null()
            } else {
                text.as_ptr()
            },
            unshifted_codepoint: event.unshifted_codepoint.map_or(0, u32::from),
            composing: event.composing,
        }
    }
}

pub const TRIGGER_PHYSICAL: u32 = 0;
pub const TRIGGER_UNICODE: u32 = 1;
pub const TRIGGER_CATCH_ALL: u32 = 2;

#[repr(C)]
#[derive(Clone, Copy)]
pub union TbTriggerKey {
    pub physical: u32,
    pub unicode: u32,
}

/// A binding trigger. Only the union member named by `tag` is meaningful.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct TbTrigger {
    pub tag: u32,
    pub key: TbTriggerKey,
    pub mods: u32,
}

impl TbTrigger {
    /// The "no trigger" record.
    pub fn zeroed() -> Self {
        Self {
            tag: TRIGGER_PHYSICAL,
            key: TbTriggerKey { physical: 0 },
            mods: 0,
        }
    }

    pub fn decode(&self) -> Option<Trigger> {
        let mods = Mods::from_bits_truncate(self.mods);
        let key = match self.tag {
            TRIGGER_PHYSICAL => TriggerKey::Physical(Key::from_raw(unsafe { self.key.physical })?),
            TRIGGER_UNICODE => TriggerKey::Unicode(char::from_u32(unsafe { self.key.unicode })?),
            TRIGGER_CATCH_ALL => TriggerKey::CatchAll,
            _ => return None,
        };
        Some(Trigger::new(key, mods))
    }
}

impl From<Trigger> for TbTrigger {
    fn from(trigger: Trigger) -> Self {
        let (tag, key) = match trigger.key {
            TriggerKey::Physical(key) => (
                TRIGGER_PHYSICAL,
                TbTriggerKey {
                    physical: key.to_raw(),
                },
            ),
            TriggerKey::Unicode(c) => (TRIGGER_UNICODE, TbTriggerKey { unicode: u32::from(c) }),
            TriggerKey::CatchAll => (TRIGGER_CATCH_ALL, TbTriggerKey { physical: 0 }),
        };
        Self {
            tag,
            key,
            mods: trigger.mods.bits(),
        }
    }
}

impl std::fmt::Debug for TbTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TbTrigger")
            .field("decoded", &self.decode())
            .finish()
    }
}

// =============================================================================
// RUNTIME
// =============================================================================

pub type WakeupCallback = Option<unsafe extern "C" fn(userdata: *mut c_void)>;
pub type ActionCallback =
    Option<unsafe extern "C" fn(app: *mut TbApp, target: TbTarget, action: crate::TbAction) -> bool>;
/// Start a clipboard read; answered with `termbridge_surface_complete_clipboard_request`.
pub type ReadClipboardCallback = Option<
    unsafe extern "C" fn(surface_userdata: *mut c_void, clipboard: u32, request: *mut c_void) -> bool,
>;
pub type ConfirmReadClipboardCallback = Option<
    unsafe extern "C" fn(
        surface_userdata: *mut c_void,
        data: *const c_char,
        request: *mut c_void,
        kind: u32,
    ),
>;
/// `request` is non-null when the user must approve the write first.
pub type WriteClipboardCallback = Option<
    unsafe extern "C" fn(
        surface_userdata: *mut c_void,
        clipboard: u32,
        contents: *const TbClipboardContent,
        len: usize,
        request: *mut c_void,
    ),
>;
pub type CloseSurfaceCallback =
    Option<unsafe extern "C" fn(surface_userdata: *mut c_void, confirm: bool)>;

/// Host callbacks and capabilities, copied at `termbridge_app_new`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TbRuntimeConfig {
    pub userdata: *mut c_void,
    pub supports_selection_clipboard: bool,
    pub wakeup_cb: WakeupCallback,
    pub action_cb: ActionCallback,
    pub read_clipboard_cb: ReadClipboardCallback,
    pub confirm_read_clipboard_cb: ConfirmReadClipboardCallback,
    pub write_clipboard_cb: WriteClipboardCallback,
    pub close_surface_cb: CloseSurfaceCallback,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TbClipboardContent {
    pub mime: *const c_char,
    pub data: *const c_char,
}

// =============================================================================
// SURFACE
// =============================================================================

/// The terminal behind a surface, implemented by the host. Every slot is
/// optional.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TbTerminalIo {
    pub userdata: *mut c_void,
    pub write_cb: Option<unsafe extern "C" fn(userdata: *mut c_void, data: *const u8, len: usize)>,
    pub key_cb: Option<unsafe extern "C" fn(userdata: *mut c_void, key: *const TbInputKey)>,
    pub bracketed_paste_cb: Option<unsafe extern "C" fn(userdata: *mut c_void) -> bool>,
    pub process_alive_cb: Option<unsafe extern "C" fn(userdata: *mut c_void) -> bool>,
    pub resize_cb: Option<unsafe extern "C" fn(userdata: *mut c_void, width: u32, height: u32)>,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TbSurfaceConfig {
    pub userdata: *mut c_void,
    pub width: u32,
    pub height: u32,
    /// Null for a surface whose terminal discards everything.
    pub io: *const TbTerminalIo,
}

impl Default for TbSurfaceConfig {
    fn default() -> Self {
        Self {
            userdata: ptr::null_mut(),
            width: 0,
            height: 0,
            io: ptr::null(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TbSize {
    pub width: u32,
    pub height: u32,
}

/// A frame copied out of a surface. Pixels are BGRA rows `pitch` bytes
/// apart. `pixels` is null, and every other field zero, when nothing could
/// be read.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TbPixelData {
    pub pixels: *mut u8,
    pub width: u32,
    pub height: u32,
    pub pitch: u32,
}

impl TbPixelData {
    pub fn zeroed() -> Self {
        Self {
            pixels: ptr::null_mut(),
            width: 0,
            height: 0,
            pitch: 0,
        }
    }
}

// =============================================================================
// CONFIG / INFO
// =============================================================================

/// One configuration problem. Strings are not NUL-terminated and stay valid
/// until the config is changed or freed.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TbDiagnostic {
    /// Offending key, or null.
    pub key: *const c_char,
    pub key_len: usize,
    pub message: *const c_char,
    pub message_len: usize,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TbInfo {
    pub build_mode: u32,
    /// NUL-terminated, static.
    pub version: *const c_char,
    pub version_len: usize,
}

// =============================================================================
// STRINGS
// =============================================================================

/// Read a NUL-terminated string. Null reads as empty; invalid UTF-8 is
/// replaced.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string.
pub unsafe fn read_cstr(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}

/// Read `len` bytes of UTF-8. Null reads as empty.
///
/// # Safety
///
/// `ptr` must be null or point to `len` readable bytes.
pub unsafe fn read_str(ptr: *const c_char, len: usize) -> String {
    if ptr.is_null() || len == 0 {
        return String::new();
    }
    let bytes = unsafe { std::slice::from_raw_parts(ptr.cast::<u8>(), len) };
    String::from_utf8_lossy(bytes).into_owned()
}

/// A C string for `text`. Interior NULs cannot cross the boundary and are
/// dropped.
pub fn c_string(text: &str) -> CString {
    CString::new(text.replace('\0', "")).unwrap_or_default()
}

/// Clipboard request ids travel as opaque pointers.
pub fn request_to_ptr(request: clipboard::RequestId) -> *mut c_void {
    request.to_raw() as usize as *mut c_void
}

pub fn request_from_ptr(ptr: *mut c_void) -> Option<clipboard::RequestId> {
    clipboard::RequestId::from_raw(ptr as usize as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn key_record_decodes_text_and_flags() {
        let text = c_string("a");
        let record = TbInputKey {
            action: KeyAction::Repeat as u32,
            mods: (Mods::CTRL | Mods::SHIFT).bits(),
            consumed_mods: Mods::SHIFT.bits(),
            keycode: 38,
            text: text.as_ptr(),
            unshifted_codepoint: u32::from('a'),
            composing: false,
        };
        let event = unsafe { record.to_event() }.unwrap();
        assert_eq!(event.action, KeyAction::Repeat);
        assert_eq!(event.mods, Mods::CTRL | Mods::SHIFT);
        assert_eq!(event.consumed_mods, Mods::SHIFT);
        assert_eq!(event.text, "a");
        assert_eq!(event.unshifted_codepoint, Some('a'));
    }

    #[test]
    fn key_record_with_null_text_and_no_codepoint() {
        let record = TbInputKey {
            action: 1,
            mods: 0,
            consumed_mods: 0,
            keycode: 9,
            text: ptr::null(),
            unshifted_codepoint: 0,
            composing: true,
        };
        let event = unsafe { record.to_event() }.unwrap();
        assert_eq!(event.text, "");
        assert_eq!(event.unshifted_codepoint, None);
        assert!(event.composing);
    }

    #[test]
    fn key_record_with_unknown_action_is_rejected() {
        let record = TbInputKey {
            action: 9,
            mods: 0,
            consumed_mods: 0,
            keycode: 0,
            text: ptr::null(),
            unshifted_codepoint: 0,
            composing: false,
        };
        assert_eq!(unsafe { record.to_event() }, None);
    }

    #[test]
    fn trigger_record_keeps_its_shape() {
        let triggers = [
            Trigger::physical(Key::KeyA, Mods::CTRL),
            Trigger::unicode('ß', Mods::ALT | Mods::SHIFT),
            Trigger::catch_all(Mods::SUPER),
        ];
        for trigger in triggers {
            assert_eq!(TbTrigger::from(trigger).decode(), Some(trigger));
        }
    }

    #[test]
    fn unknown_trigger_tag_is_rejected() {
        let record = TbTrigger {
            tag: 7,
            key: TbTriggerKey { physical: 0 },
            mods: 0,
        };
        assert_eq!(record.decode(), None);
    }

    #[test]
    fn request_ids_survive_pointer_encoding() {
        let id = clipboard::RequestId::from_raw(42).unwrap();
        assert_eq!(request_from_ptr(request_to_ptr(id)), Some(id));
        assert_eq!(request_from_ptr(ptr::null_mut()), None);
    }

    #[test]
    fn interior_nul_is_dropped() {
        assert_eq!(c_string("a\0b").as_bytes(), b"ab");
    }
}
