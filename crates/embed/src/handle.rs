//! Opaque handles given to the host.
//!
//! A [`TbApp`] owns the [`App`] behind a `RefCell`: a host callback that
//! calls back into the same app while it is busy gets the "not handled"
//! answer instead of aliasing it. A [`TbSurface`] is a plain id into that
//! app; its address is also recorded in a process-wide table so clipboard
//! completions arriving after teardown, or from another thread, never
//! dereference a freed handle.

use std::cell::{Cell, RefCell};
use std::ffi::c_void;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use std::thread::{self, ThreadId};

use actions::SurfaceId;
use apprt::{App, MailboxSender, SurfaceHandle};
use collections::FxHashMap;
use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::host::SurfaceRegistry;

/// Opaque app handle.
pub struct TbApp {
    pub(crate) app: RefCell<App>,
    pub(crate) surfaces: Rc<SurfaceRegistry>,
    /// Surface handles freed from inside a callback. They stay allocated
    /// until the outer call is done with the app.
    pub(crate) deferred_frees: RefCell<Vec<*mut TbSurface>>,
    pub(crate) userdata: *mut c_void,
    /// Shared with the host adapter, which passes it to the action callback.
    pub(crate) self_ptr: Rc<Cell<*mut TbApp>>,
}

impl TbApp {
    /// Run `f` on the app. Returns `fallback` if the app is already in use
    /// further up the stack or `f` panics.
    pub(crate) fn with<R>(&self, what: &str, fallback: R, f: impl FnOnce(&mut App) -> R) -> R {
        let Ok(mut app) = self.app.try_borrow_mut() else {
            tracing::warn!(call = what, "Re-entrant call from a host callback ignored");
            return fallback;
        };
        let result = match panic::catch_unwind(AssertUnwindSafe(|| f(&mut app))) {
            Ok(result) => result,
            Err(payload) => {
                tracing::error!(call = what, "Panicked: {}", util::panic_message(payload.as_ref()));
                fallback
            }
        };
        for handle in self.deferred_frees.take() {
            // Only `termbridge_surface_free` queues handles, after unregistering them.
            let surface = unsafe { Box::from_raw(handle) };
            app.free_surface(surface.id);
        }
        result
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.app.try_borrow_mut().is_err()
    }
}

/// Opaque surface handle.
pub struct TbSurface {
    pub(crate) app: *mut TbApp,
    pub(crate) id: SurfaceId,
    pub(crate) userdata: *mut c_void,
}

impl TbSurface {
    /// What this handle points at, copied out so no borrow of the handle is
    /// held while a callback may free it.
    pub(crate) fn target(&self) -> SurfaceTarget {
        SurfaceTarget {
            app: self.app,
            id: self.id,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct SurfaceTarget {
    pub app: *mut TbApp,
    pub id: SurfaceId,
}

impl SurfaceTarget {
    /// Run `f` on the surface. Returns `fallback` if the app is busy or the
    /// surface is gone.
    ///
    /// # Safety
    ///
    /// `self.app` must still be live.
    pub(crate) unsafe fn with<R>(
        self,
        what: &str,
        fallback: R,
        f: impl FnOnce(&mut SurfaceHandle<'_>) -> R,
    ) -> R {
        let Some(app) = (unsafe { self.app.as_ref() }) else {
            return fallback;
        };
        let id = self.id;
        app.with(what, None, |app| app.surface(id).map(|mut surface| f(&mut surface)))
            .unwrap_or(fallback)
    }
}

/// What other threads may know about a live surface.
#[derive(Debug, Clone)]
pub(crate) struct LiveSurface {
    pub id: SurfaceId,
    pub sender: MailboxSender,
    pub owner: ThreadId,
}

static LIVE_SURFACES: Lazy<Mutex<FxHashMap<usize, LiveSurface>>> =
    Lazy::new(|| Mutex::new(FxHashMap::default()));

pub(crate) fn register_surface(handle: *mut TbSurface, id: SurfaceId, sender: MailboxSender) {
    let live = LiveSurface {
        id,
        sender,
        owner: thread::current().id(),
    };
    LIVE_SURFACES.lock().insert(handle as usize, live);
}

pub(crate) fn unregister_surface(handle: *mut TbSurface) -> bool {
    LIVE_SURFACES.lock().remove(&(handle as usize)).is_some()
}

pub(crate) fn live_surface(handle: *mut TbSurface) -> Option<LiveSurface> {
    LIVE_SURFACES.lock().get(&(handle as usize)).cloned()
}
