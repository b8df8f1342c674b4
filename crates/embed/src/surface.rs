use std::cell::Cell;
use std::ffi::{c_char, c_void};
use std::ptr;
use std::rc::Rc;
use std::thread;

use apprt::SurfaceConfig;
use input::Mods;
use readback::{ExternalBackend, Frame, PixelFormat};

use crate::handle::{live_surface, register_surface, unregister_surface, TbApp, TbSurface};
use crate::host::{FfiTerminal, SurfaceEntry};
use crate::records::{
    read_cstr, read_str, request_from_ptr, TbInputKey, TbSize, TbSurfaceConfig,
};

/// A surface config with no terminal and zero size.
#[no_mangle]
pub extern "C" fn termbridge_surface_config_new() -> TbSurfaceConfig {
    TbSurfaceConfig::default()
}

/// Create a surface. Returns null if `app` is null or busy.
///
/// # Safety
///
/// `app` must be null or a live app handle. `config` must be null
/// (defaults) or valid; its `io` record is copied and its callbacks must
/// stay callable for the surface's lifetime.
#[no_mangle]
pub unsafe extern "C" fn termbridge_surface_new(
    app: *mut TbApp,
    config: *const TbSurfaceConfig,
) -> *mut TbSurface {
    let Some(handle) = (unsafe { app.as_ref() }) else {
        return ptr::null_mut();
    };
    let config = unsafe { config.as_ref() }.copied().unwrap_or_default();
    let closed = Rc::new(Cell::new(false));
    let surface_config = match unsafe { config.io.as_ref() } {
        Some(io) => SurfaceConfig::new(FfiTerminal::new(*io, closed.clone())),
        None => SurfaceConfig::default(),
    }
    .with_size(config.width, config.height);

    let created = handle.with("surface_new", None, |app| {
        Some((app.new_surface(surface_config), app.sender()))
    });
    let Some((id, sender)) = created else {
        return ptr::null_mut();
    };

    let surface = Box::into_raw(Box::new(TbSurface {
        app,
        id,
        userdata: config.userdata,
    }));
    handle.surfaces.insert(
        id,
        SurfaceEntry {
            handle: surface,
            userdata: config.userdata,
            closed,
        },
    );
    register_surface(surface, id, sender);
    surface
}

/// Free a surface. Its outstanding clipboard requests are cancelled, so
/// completing them later is harmless. Freeing twice is ignored. Freed from
/// inside a callback, the surface goes quiet at once and is released when
/// the outer call returns.
///
/// # Safety
///
/// `surface` must be null or a handle from [`termbridge_surface_new`] whose
/// app is still live.
#[no_mangle]
pub unsafe extern "C" fn termbridge_surface_free(surface: *mut TbSurface) {
    if surface.is_null() {
        return;
    }
    if !unregister_surface(surface) {
        tracing::warn!("Surface freed twice; ignored");
        return;
    }
    let target = unsafe { &*surface }.target();
    let Some(app) = (unsafe { target.app.as_ref() }) else {
        drop(unsafe { Box::from_raw(surface) });
        return;
    };
    if let Some(entry) = app.surfaces.remove(target.id) {
        entry.closed.set(true);
    }
    if app.is_busy() {
        // A call further up the stack may still be using the handle.
        app.deferred_frees.borrow_mut().push(surface);
        return;
    }
    drop(unsafe { Box::from_raw(surface) });
    app.with("surface_free", false, |app| app.free_surface(target.id));
}

/// # Safety
///
/// `surface` must be null or a live surface handle.
#[no_mangle]
pub unsafe extern "C" fn termbridge_surface_userdata(surface: *mut TbSurface) -> *mut c_void {
    unsafe { surface.as_ref() }.map_or(ptr::null_mut(), |surface| surface.userdata)
}

/// # Safety
///
/// `surface` must be null or a live surface handle.
#[no_mangle]
pub unsafe extern "C" fn termbridge_surface_app(surface: *mut TbSurface) -> *mut TbApp {
    unsafe { surface.as_ref() }.map_or(ptr::null_mut(), |surface| surface.app)
}

/// # Safety
///
/// `surface` must be null or a live surface handle.
#[no_mangle]
pub unsafe extern "C" fn termbridge_surface_set_focus(surface: *mut TbSurface, focused: bool) {
    if let Some(surface) = unsafe { surface.as_ref() } {
        unsafe { surface.target().with("surface_set_focus", (), |s| s.set_focus(focused)) };
    }
}

/// # Safety
///
/// `surface` must be null or a live surface handle.
#[no_mangle]
pub unsafe extern "C" fn termbridge_surface_set_size(surface: *mut TbSurface, width: u32, height: u32) {
    if let Some(surface) = unsafe { surface.as_ref() } {
        unsafe { surface.target().with("surface_set_size", (), |s| s.set_size(width, height)) };
    }
}

/// # Safety
///
/// `surface` must be null or a live surface handle.
#[no_mangle]
pub unsafe extern "C" fn termbridge_surface_size(surface: *mut TbSurface) -> TbSize {
    let Some(surface) = (unsafe { surface.as_ref() }) else {
        return TbSize::default();
    };
    let size = unsafe { surface.target().with("surface_size", Default::default(), |s| s.size()) };
    TbSize {
        width: size.width,
        height: size.height,
    }
}

/// Handle a key event for this surface. Returns whether it was consumed.
///
/// # Safety
///
/// `surface` must be null or a live surface handle; `key.text` must be null
/// or a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn termbridge_surface_key(surface: *mut TbSurface, key: TbInputKey) -> bool {
    let (Some(surface), Some(event)) = (unsafe { surface.as_ref() }, unsafe { key.to_event() }) else {
        return false;
    };
    unsafe { surface.target().with("surface_key", false, |s| s.key(event)) }
}

/// Whether `key` would trigger a binding, without performing it. The
/// binding's flags are written to `flags` when it is non-null.
///
/// # Safety
///
/// As for [`termbridge_surface_key`]; `flags` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn termbridge_surface_key_is_binding(
    surface: *mut TbSurface,
    key: TbInputKey,
    flags: *mut u32,
) -> bool {
    let (Some(surface), Some(event)) = (unsafe { surface.as_ref() }, unsafe { key.to_event() }) else {
        return false;
    };
    let found = unsafe { surface.target().with("surface_key_is_binding", None, |s| s.key_is_binding(event)) };
    match found {
        Some(found) => {
            if let Some(flags) = unsafe { flags.as_mut() } {
                *flags = found.bits();
            }
            true
        }
        None => false,
    }
}

/// The modifiers the host should apply when asking its layout for text.
///
/// # Safety
///
/// `surface` must be null or a live surface handle.
#[no_mangle]
pub unsafe extern "C" fn termbridge_surface_key_translation_mods(
    surface: *mut TbSurface,
    mods: u32,
) -> u32 {
    let Some(surface) = (unsafe { surface.as_ref() }) else {
        return mods;
    };
    let mods = Mods::from_bits_truncate(mods);
    let translated =
        unsafe { surface.target().with("surface_key_translation_mods", mods, |s| s.translation_mods(mods)) };
    translated.bits()
}

/// Committed text, e.g. an IME commit or dropped text.
///
/// # Safety
///
/// `surface` must be null or a live surface handle; `text` must be null or
/// point to `len` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn termbridge_surface_text(surface: *mut TbSurface, text: *const c_char, len: usize) {
    let Some(surface) = (unsafe { surface.as_ref() }) else {
        return;
    };
    let text = unsafe { read_str(text, len) };
    if text.is_empty() {
        return;
    }
    unsafe { surface.target().with("surface_text", (), |s| s.text(&text)) };
}

/// Show IME preedit text. A null or empty `text` clears it.
///
/// # Safety
///
/// As for [`termbridge_surface_text`].
#[no_mangle]
pub unsafe extern "C" fn termbridge_surface_preedit(surface: *mut TbSurface, text: *const c_char, len: usize) {
    let Some(surface) = (unsafe { surface.as_ref() }) else {
        return;
    };
    let text = unsafe { read_str(text, len) };
    let text = (!text.is_empty()).then_some(text.as_str());
    unsafe { surface.target().with("surface_preedit", (), |s| s.preedit(text)) };
}

/// Ask the host, through `close_surface_cb`, to close this surface.
///
/// # Safety
///
/// `surface` must be null or a live surface handle.
#[no_mangle]
pub unsafe extern "C" fn termbridge_surface_request_close(surface: *mut TbSurface) {
    if let Some(surface) = unsafe { surface.as_ref() } {
        unsafe { surface.target().with("surface_request_close", false, |s| s.request_close()) };
    }
}

/// Perform a binding action by name, e.g. `new_split:right`. Returns false
/// for an unknown action.
///
/// # Safety
///
/// `surface` must be null or a live surface handle; `action` must be null
/// or point to `len` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn termbridge_surface_binding_action(
    surface: *mut TbSurface,
    action: *const c_char,
    len: usize,
) -> bool {
    let Some(surface) = (unsafe { surface.as_ref() }) else {
        return false;
    };
    let action = unsafe { read_str(action, len) };
    unsafe { surface.target().with("surface_binding_action", false, |s| s.binding_action(&action)) }
}

/// Answer a clipboard request. `text` is null when the host had nothing or
/// the user declined; `confirmed` carries the user's approval.
///
/// Safe to call from any thread, and after the surface was freed. Off the
/// owning thread, or from inside a callback, the answer is queued and
/// the host is woken to call [`crate::termbridge_app_tick`].
///
/// # Safety
///
/// `text` must be null or a NUL-terminated string. `surface` is only
/// dereferenced while it is registered as live.
#[no_mangle]
pub unsafe extern "C" fn termbridge_surface_complete_clipboard_request(
    surface: *mut TbSurface,
    text: *const c_char,
    request: *mut c_void,
    confirmed: bool,
) {
    let Some(request) = request_from_ptr(request) else {
        tracing::warn!("Clipboard completion without a request handle");
        return;
    };
    let Some(live) = live_surface(surface) else {
        tracing::debug!("{:?} completed after its surface was freed; ignoring", request);
        return;
    };
    let data = (!text.is_null()).then(|| unsafe { read_cstr(text) });

    if live.owner == thread::current().id() {
        let handle = unsafe { &*surface };
        if let Some(app) = unsafe { handle.app.as_ref() }.filter(|app| !app.is_busy()) {
            app.with("surface_complete_clipboard_request", false, |app| {
                app.complete_surface_clipboard_request(live.id, request, data, confirmed)
            });
            return;
        }
    }
    live.sender
        .complete_surface_clipboard(live.id, request, data, confirmed);
}

/// # Safety
///
/// `surface` must be null or a live surface handle.
#[no_mangle]
pub unsafe extern "C" fn termbridge_surface_needs_confirm_quit(surface: *mut TbSurface) -> bool {
    unsafe { surface.as_ref() }.is_some_and(|surface| unsafe {
        surface.target().with("surface_needs_confirm_quit", false, |s| s.needs_confirm_quit())
    })
}

/// # Safety
///
/// `surface` must be null or a live surface handle.
#[no_mangle]
pub unsafe extern "C" fn termbridge_surface_process_exited(surface: *mut TbSurface) -> bool {
    unsafe { surface.as_ref() }.is_some_and(|surface| unsafe {
        surface.target().with("surface_process_exited", false, |s| s.process_exited())
    })
}

pub const PIXEL_FORMAT_BGRA: u32 = 0;
pub const PIXEL_FORMAT_RGBA: u32 = 1;

fn pixel_format(raw: u32) -> Option<PixelFormat> {
    match raw {
        PIXEL_FORMAT_BGRA => Some(PixelFormat::Bgra),
        PIXEL_FORMAT_RGBA => Some(PixelFormat::Rgba),
        _ => None,
    }
}

/// A frame supplied by the host. `data` holds `height` rows `stride` bytes
/// apart.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TbFrame {
    pub data: *const u8,
    pub width: u32,
    pub height: u32,
    pub stride: usize,
    pub format: u32,
}

impl TbFrame {
    /// Copy the frame out of host memory.
    ///
    /// # Safety
    ///
    /// `data` must be null or point to `stride * height` readable bytes.
    unsafe fn to_frame(self) -> Option<Frame> {
        let format = pixel_format(self.format)?;
        if self.data.is_null() {
            return None;
        }
        let len = self.stride.checked_mul(self.height as usize)?;
        let data = unsafe { std::slice::from_raw_parts(self.data, len) }.to_vec();
        Some(Frame {
            width: self.width,
            height: self.height,
            stride: self.stride,
            format,
            data,
        })
    }
}

/// Hand the software readback backend a newly rendered frame. Returns false
/// if the surface's backend does not take frames or the frame is malformed.
///
/// # Safety
///
/// `surface` must be null or a live surface handle; `frame` must be null or
/// valid as described on [`TbFrame`]. The data is copied.
#[no_mangle]
pub unsafe extern "C" fn termbridge_surface_present_frame(
    surface: *mut TbSurface,
    frame: *const TbFrame,
) -> bool {
    let (Some(surface), Some(frame)) = (unsafe { surface.as_ref() }, unsafe { frame.as_ref() }) else {
        return false;
    };
    let Some(presenter) = (unsafe { surface.target().with("surface_present_frame", None, |s| s.frame_presenter()) })
    else {
        tracing::debug!("Surface readback backend does not take presented frames");
        return false;
    };
    match unsafe { frame.to_frame() } {
        Some(frame) => {
            presenter.present(frame);
            true
        }
        None => {
            tracing::warn!("Presented frame is malformed; ignored");
            false
        }
    }
}

pub type FrameSourceCallback =
    Option<unsafe extern "C" fn(userdata: *mut c_void, frame: *mut TbFrame) -> bool>;

/// Install an external readback backend: each readback calls `source`,
/// which fills in a frame and returns true, or returns false when none is
/// available. Frame data only has to stay valid until `source` returns.
///
/// # Safety
///
/// `surface` must be null or a live surface handle; `source` must stay
/// callable with `userdata` for the surface's lifetime.
#[no_mangle]
pub unsafe extern "C" fn termbridge_surface_set_frame_source(
    surface: *mut TbSurface,
    userdata: *mut c_void,
    source: FrameSourceCallback,
) {
    let (Some(surface), Some(source)) = (unsafe { surface.as_ref() }, source) else {
        return;
    };
    let backend = ExternalBackend::new(move || {
        let mut frame = TbFrame {
            data: ptr::null(),
            width: 0,
            height: 0,
            stride: 0,
            format: PIXEL_FORMAT_BGRA,
        };
        if !unsafe { source(userdata, &mut frame) } {
            return None;
        }
        unsafe { frame.to_frame() }
    });
    unsafe {
        surface.target().with("surface_set_frame_source", (), |s| {
            s.install_readback(Box::new(backend))
        })
    };
}
