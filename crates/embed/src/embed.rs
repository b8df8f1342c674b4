//! C boundary of the termbridge engine.
//!
//! Hosts create a config, an app from a runtime record of callbacks, and
//! one surface per terminal view. Everything crosses as `#[repr(C)]`
//! records or opaque pointers; strings are UTF-8, either NUL-terminated or
//! pointer plus length as each function documents.
//!
//! ## Safety
//!
//! Apps and surfaces are single-threaded: call them on the thread that
//! created the app. The exceptions are the wakeup callback, which the
//! engine may call from any thread, and
//! [`termbridge_surface_complete_clipboard_request`], which the host may
//! call from any thread and after the surface was freed.
//!
//! Callbacks may call back into the engine. A call that would touch the app
//! already in use further up the stack returns its "not handled" value;
//! clipboard completions are queued and surface frees are deferred until
//! the outer call returns.
//!
//! No panic unwinds into the host.

mod action;
mod app;
mod config;
mod handle;
mod host;
mod pixels;
mod records;
mod surface;

use std::ffi::CString;

use apprt::info::{self, BuildMode};
use once_cell::sync::Lazy;

pub use action::*;
pub use app::*;
pub use config::*;
pub use handle::{TbApp, TbSurface};
pub use pixels::*;
pub use records::{
    ActionCallback, CloseSurfaceCallback, ConfirmReadClipboardCallback, ReadClipboardCallback,
    TbClipboardContent, TbDiagnostic, TbInfo, TbInputKey, TbPixelData, TbRuntimeConfig, TbSize,
    TbSurfaceConfig, TbTarget, TbTerminalIo, TbTrigger, TbTriggerKey, WakeupCallback,
    WriteClipboardCallback, TARGET_APP, TARGET_SURFACE, TRIGGER_CATCH_ALL, TRIGGER_PHYSICAL,
    TRIGGER_UNICODE,
};
pub use surface::*;

pub use settings::Config;

static VERSION: Lazy<CString> = Lazy::new(|| records::c_string(info::VERSION));

/// Build mode and version of the engine.
#[no_mangle]
pub extern "C" fn termbridge_info() -> TbInfo {
    TbInfo {
        build_mode: BuildMode::current() as u32,
        version: VERSION.as_ptr(),
        version_len: info::VERSION.len(),
    }
}
