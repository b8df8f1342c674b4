use std::cell::{Cell, RefCell};
use std::ffi::c_void;
use std::ptr;
use std::rc::Rc;
use std::sync::Arc;

use apprt::{App, Waker};
use settings::Config;

use crate::handle::{unregister_surface, TbApp};
use crate::host::{FfiHost, SurfaceRegistry};
use crate::records::{TbInputKey, TbRuntimeConfig};

/// Host userdata handed to the wakeup callback from any thread.
#[derive(Clone, Copy)]
struct WakeupTarget(*mut c_void);

// The host promises its wakeup callback is callable from any thread.
unsafe impl Send for WakeupTarget {}
unsafe impl Sync for WakeupTarget {}

impl WakeupTarget {
    fn get(self) -> *mut c_void {
        self.0
    }
}

fn finalized(config: Option<&Config>) -> Arc<Config> {
    let mut config = config.cloned().unwrap_or_default();
    config.finalize();
    Arc::new(config)
}

/// Create an app. The runtime record and config are copied; both may be
/// freed afterwards. Returns null if `runtime` is null.
///
/// # Safety
///
/// `runtime` must be null or point to a valid runtime record whose
/// callbacks stay callable for the app's lifetime. `wakeup_cb` may be
/// called from any thread. `config` must be null (defaults) or live.
#[no_mangle]
pub unsafe extern "C" fn termbridge_app_new(
    runtime: *const TbRuntimeConfig,
    config: *const Config,
) -> *mut TbApp {
    let Some(runtime) = (unsafe { runtime.as_ref() }).copied() else {
        tracing::warn!("termbridge_app_new called without a runtime");
        return ptr::null_mut();
    };
    let config = finalized(unsafe { config.as_ref() });

    let self_ptr = Rc::new(Cell::new(ptr::null_mut()));
    let surfaces = Rc::new(SurfaceRegistry::default());
    let host = FfiHost::new(runtime, self_ptr.clone(), surfaces.clone());

    let target = WakeupTarget(runtime.userdata);
    let wakeup_cb = runtime.wakeup_cb;
    let waker: Waker = Arc::new(move || {
        if let Some(callback) = wakeup_cb {
            unsafe { callback(target.get()) }
        }
    });

    let handle = Box::into_raw(Box::new(TbApp {
        app: RefCell::new(App::new(host, config, waker)),
        surfaces,
        deferred_frees: RefCell::new(Vec::new()),
        userdata: runtime.userdata,
        self_ptr: self_ptr.clone(),
    }));
    self_ptr.set(handle);
    handle
}

/// Free an app and any surfaces the host did not free first.
///
/// # Safety
///
/// `app` must be null or a live app handle, and must not be in use further
/// up the stack. It and all of its surface handles are invalid afterwards.
#[no_mangle]
pub unsafe extern "C" fn termbridge_app_free(app: *mut TbApp) {
    let Some(handle) = (unsafe { app.as_ref() }) else {
        return;
    };
    if handle.is_busy() {
        tracing::warn!("termbridge_app_free called from inside a callback; ignored");
        return;
    }
    for (id, entry) in handle.surfaces.drain() {
        tracing::debug!("Freeing {:?} left behind by the host", id);
        unregister_surface(entry.handle);
        drop(unsafe { Box::from_raw(entry.handle) });
    }
    handle.self_ptr.set(ptr::null_mut());
    drop(unsafe { Box::from_raw(app) });
}

/// Handle everything queued from other threads. Call after a wakeup.
///
/// # Safety
///
/// `app` must be null or a live app handle.
#[no_mangle]
pub unsafe extern "C" fn termbridge_app_tick(app: *mut TbApp) {
    if let Some(handle) = unsafe { app.as_ref() } {
        handle.with("app_tick", 0, App::tick);
    }
}

/// # Safety
///
/// `app` must be null or a live app handle.
#[no_mangle]
pub unsafe extern "C" fn termbridge_app_userdata(app: *mut TbApp) -> *mut c_void {
    unsafe { app.as_ref() }.map_or(ptr::null_mut(), |handle| handle.userdata)
}

/// # Safety
///
/// `app` must be null or a live app handle.
#[no_mangle]
pub unsafe extern "C" fn termbridge_app_set_focus(app: *mut TbApp, focused: bool) {
    if let Some(handle) = unsafe { app.as_ref() } {
        handle.with("app_set_focus", (), |app| app.set_focus(focused));
    }
}

/// A key event while no surface has focus. Only global bindings fire.
/// Returns whether the key was consumed.
///
/// # Safety
///
/// `app` must be null or a live app handle; `key.text` must be null or a
/// NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn termbridge_app_key(app: *mut TbApp, key: TbInputKey) -> bool {
    let (Some(handle), Some(event)) = (unsafe { app.as_ref() }, unsafe { key.to_event() }) else {
        return false;
    };
    handle.with("app_key", false, |app| app.key(event))
}

/// Whether `key` would trigger a binding, without performing it. The
/// binding's flags are written to `flags` when it is non-null.
///
/// # Safety
///
/// As for [`termbridge_app_key`]; `flags` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn termbridge_app_key_is_binding(
    app: *mut TbApp,
    key: TbInputKey,
    flags: *mut u32,
) -> bool {
    let (Some(handle), Some(event)) = (unsafe { app.as_ref() }, unsafe { key.to_event() }) else {
        return false;
    };
    let found = handle.with("app_key_is_binding", None, |app| app.key_is_binding(event));
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

/// # Safety
///
/// `app` must be null or a live app handle.
#[no_mangle]
pub unsafe extern "C" fn termbridge_app_keyboard_changed(app: *mut TbApp) {
    if let Some(handle) = unsafe { app.as_ref() } {
        handle.with("app_keyboard_changed", (), App::keyboard_changed);
    }
}

/// Replace the configuration. The app and every surface receive a
/// `config_change` action. `config` is copied.
///
/// # Safety
///
/// `app` must be null or a live app handle; `config` must be null or live.
#[no_mangle]
pub unsafe extern "C" fn termbridge_app_update_config(app: *mut TbApp, config: *const Config) {
    let (Some(handle), Some(config)) = (unsafe { app.as_ref() }, unsafe { config.as_ref() }) else {
        return;
    };
    let config = finalized(Some(config));
    handle.with("app_update_config", (), |app| app.update_config(config));
}

/// # Safety
///
/// `app` must be null or a live app handle.
#[no_mangle]
pub unsafe extern "C" fn termbridge_app_needs_confirm_quit(app: *mut TbApp) -> bool {
    unsafe { app.as_ref() }
        .is_some_and(|handle| handle.with("app_needs_confirm_quit", false, |app| app.needs_confirm_quit()))
}

/// # Safety
///
/// `app` must be null or a live app handle.
#[no_mangle]
pub unsafe extern "C" fn termbridge_app_has_global_keybinds(app: *mut TbApp) -> bool {
    unsafe { app.as_ref() }.is_some_and(|handle| {
        handle.with("app_has_global_keybinds", false, |app| app.has_global_keybinds())
    })
}
