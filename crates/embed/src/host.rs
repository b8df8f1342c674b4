use std::cell::{Cell, RefCell};
use std::ffi::c_void;
use std::rc::Rc;

use actions::{Action, SurfaceId, Target};
use apprt::{Host, TerminalIo};
use clipboard::{ClipboardContent, ClipboardKind, RequestId, RequestKind};
use collections::FxHashMap;
use input::KeyEvent;

use crate::action::EncodedAction;
use crate::records::{
    c_string, request_to_ptr, TbClipboardContent, TbInputKey, TbRuntimeConfig, TbTarget,
    TbTerminalIo,
};
use crate::{TbApp, TbSurface};

/// Where a surface's C handle and userdata live.
#[derive(Debug, Clone)]
pub(crate) struct SurfaceEntry {
    pub handle: *mut TbSurface,
    pub userdata: *mut c_void,
    /// Shared with the surface's [`FfiTerminal`]; set when the host frees
    /// the handle.
    pub closed: Rc<Cell<bool>>,
}

/// Live surfaces of one app, by id. Shared between the app handle and the
/// host adapter.
#[derive(Debug, Default)]
pub(crate) struct SurfaceRegistry {
    entries: RefCell<FxHashMap<SurfaceId, SurfaceEntry>>,
}

impl SurfaceRegistry {
    pub fn insert(&self, id: SurfaceId, entry: SurfaceEntry) {
        self.entries.borrow_mut().insert(id, entry);
    }

    pub fn remove(&self, id: SurfaceId) -> Option<SurfaceEntry> {
        self.entries.borrow_mut().remove(&id)
    }

    pub fn get(&self, id: SurfaceId) -> Option<SurfaceEntry> {
        self.entries.borrow().get(&id).cloned()
    }

    pub fn drain(&self) -> Vec<(SurfaceId, SurfaceEntry)> {
        self.entries.borrow_mut().drain().collect()
    }
}

/// [`Host`] over the callback slots of a [`TbRuntimeConfig`].
pub(crate) struct FfiHost {
    runtime: TbRuntimeConfig,
    /// Set once the app handle is boxed.
    app: Rc<Cell<*mut TbApp>>,
    surfaces: Rc<SurfaceRegistry>,
}

impl FfiHost {
    pub fn new(
        runtime: TbRuntimeConfig,
        app: Rc<Cell<*mut TbApp>>,
        surfaces: Rc<SurfaceRegistry>,
    ) -> Self {
        Self {
            runtime,
            app,
            surfaces,
        }
    }

    fn userdata(&self, surface: SurfaceId) -> Option<*mut c_void> {
        let entry = self.surfaces.get(surface);
        if entry.is_none() {
            tracing::debug!("{:?} has no C handle; host call skipped", surface);
        }
        entry.map(|entry| entry.userdata)
    }
}

impl Host for FfiHost {
    fn action(&self, target: Target, action: &Action) -> bool {
        let Some(callback) = self.runtime.action_cb else {
            return false;
        };
        let target = match target {
            Target::App => TbTarget::app(),
            Target::Surface(id) => match self.surfaces.get(id) {
                Some(entry) => TbTarget::surface(entry.handle),
                None => {
                    tracing::debug!("{:?} has no C handle; dropping {}", id, action.tag());
                    return false;
                }
            },
        };
        let encoded = EncodedAction::new(action);
        unsafe { callback(self.app.get(), target, encoded.record()) }
    }

    fn read_clipboard(&self, surface: SurfaceId, clipboard: ClipboardKind, request: RequestId) -> bool {
        let (Some(callback), Some(userdata)) = (self.runtime.read_clipboard_cb, self.userdata(surface))
        else {
            return false;
        };
        unsafe { callback(userdata, clipboard as u32, request_to_ptr(request)) }
    }

    fn confirm_read_clipboard(
        &self,
        surface: SurfaceId,
        data: &str,
        request: RequestId,
        kind: RequestKind,
    ) {
        let (Some(callback), Some(userdata)) =
            (self.runtime.confirm_read_clipboard_cb, self.userdata(surface))
        else {
            return;
        };
        let data = c_string(data);
        unsafe { callback(userdata, data.as_ptr(), request_to_ptr(request), kind as u32) }
    }

    fn write_clipboard(
        &self,
        surface: SurfaceId,
        clipboard: ClipboardKind,
        contents: &[ClipboardContent],
        confirm: Option<RequestId>,
    ) {
        let (Some(callback), Some(userdata)) = (self.runtime.write_clipboard_cb, self.userdata(surface))
        else {
            return;
        };
        let strings: Vec<_> = contents
            .iter()
            .map(|content| (c_string(&content.mime), c_string(&content.data)))
            .collect();
        let records: Vec<_> = strings
            .iter()
            .map(|(mime, data)| TbClipboardContent {
                mime: mime.as_ptr(),
                data: data.as_ptr(),
            })
            .collect();
        let request = confirm.map_or(std::ptr::null_mut(), request_to_ptr);
        unsafe {
            callback(
                userdata,
                clipboard as u32,
                records.as_ptr(),
                records.len(),
                request,
            )
        }
    }

    fn close_surface(&self, surface: SurfaceId, confirm: bool) {
        let (Some(callback), Some(userdata)) = (self.runtime.close_surface_cb, self.userdata(surface))
        else {
            return;
        };
        unsafe { callback(userdata, confirm) }
    }

    fn supports_selection_clipboard(&self) -> bool {
        self.runtime.supports_selection_clipboard
    }
}

/// [`TerminalIo`] over a host vtable. Goes quiet once the host has freed
/// the surface, even if the engine still holds it for the rest of a call.
pub(crate) struct FfiTerminal {
    io: TbTerminalIo,
    closed: Rc<Cell<bool>>,
}

impl FfiTerminal {
    pub fn new(io: TbTerminalIo, closed: Rc<Cell<bool>>) -> Self {
        Self { io, closed }
    }

    fn io(&self) -> Option<&TbTerminalIo> {
        (!self.closed.get()).then_some(&self.io)
    }
}

impl TerminalIo for FfiTerminal {
    fn write(&mut self, data: &[u8]) {
        let Some(io) = self.io() else {
            tracing::debug!("Dropping {} byte(s) for a freed surface", data.len());
            return;
        };
        if let Some(callback) = io.write_cb {
            unsafe { callback(io.userdata, data.as_ptr(), data.len()) }
        }
    }

    fn key(&mut self, event: &KeyEvent) {
        if let Some((io, callback)) = self.io().and_then(|io| Some((io, io.key_cb?))) {
            let text = c_string(&event.text);
            let record = TbInputKey::from_event(event, &text);
            unsafe { callback(io.userdata, &record) }
        }
    }

    fn bracketed_paste(&self) -> bool {
        self.io().is_some_and(|io| {
            io.bracketed_paste_cb
                .is_some_and(|callback| unsafe { callback(io.userdata) })
        })
    }

    fn process_alive(&self) -> bool {
        self.io().is_some_and(|io| {
            io.process_alive_cb
                .is_some_and(|callback| unsafe { callback(io.userdata) })
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if let Some((io, callback)) = self.io().and_then(|io| Some((io, io.resize_cb?))) {
            unsafe { callback(io.userdata, width, height) }
        }
    }
}
