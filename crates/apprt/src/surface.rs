use actions::{ChildExited, Size, SurfaceId};
use clipboard::RequestId;
use input::{BindingFlags, KeyEvent, Mods};
use readback::{FrameBuffer, FramePresenter, ReadbackBackend};

use crate::{App, NullTerminal, TerminalEvent, TerminalIo};

/// How to build a new surface.
pub struct SurfaceConfig {
    pub terminal: Box<dyn TerminalIo>,
    /// Replaces the backend chosen by `frame-readback`.
    pub readback: Option<Box<dyn ReadbackBackend>>,
    pub size: Size,
}

impl SurfaceConfig {
    pub fn new(terminal: impl TerminalIo + 'static) -> Self {
        Self {
            terminal: Box::new(terminal),
            readback: None,
            size: Size::default(),
        }
    }

    pub fn with_readback(mut self, backend: impl ReadbackBackend + 'static) -> Self {
        self.readback = Some(Box::new(backend));
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = Size { width, height };
        self
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self::new(NullTerminal)
    }
}

pub(crate) struct Surface {
    pub(crate) terminal: Box<dyn TerminalIo>,
    pub(crate) readback: Box<dyn ReadbackBackend>,
    pub(crate) size: Size,
    pub(crate) focused: bool,
    pub(crate) readonly: bool,
    pub(crate) exited: Option<ChildExited>,
    pub(crate) preedit: Option<String>,
}

impl Surface {
    pub(crate) fn new(config: SurfaceConfig, readback: Box<dyn ReadbackBackend>) -> Self {
        Self {
            terminal: config.terminal,
            readback,
            size: config.size,
            focused: false,
            readonly: false,
            exited: None,
            preedit: None,
        }
    }

    pub(crate) fn process_running(&self) -> bool {
        self.exited.is_none() && self.terminal.process_alive()
    }
}

/// Borrowed access to one live surface of an [`App`].
pub struct SurfaceHandle<'a> {
    pub(crate) app: &'a mut App,
    pub(crate) id: SurfaceId,
}

impl SurfaceHandle<'_> {
    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn app(&mut self) -> &mut App {
        &mut *self.app
    }

    /// Handle a key event while this surface has focus. Returns whether the
    /// event was consumed.
    pub fn key(&mut self, event: KeyEvent) -> bool {
        self.app.surface_key(self.id, event)
    }

    /// Flags of the binding `event` would trigger, without performing it.
    pub fn key_is_binding(&self, event: KeyEvent) -> Option<BindingFlags> {
        self.app.key_is_binding(event)
    }

    pub fn translation_mods(&self, mods: Mods) -> Mods {
        self.app.translator().translation_mods(mods)
    }

    /// Committed text from the host, e.g. an IME commit or a drop.
    pub fn text(&mut self, text: &str) {
        self.app.surface_text(self.id, text);
    }

    pub fn preedit(&mut self, text: Option<&str>) {
        if let Some(surface) = self.app.surfaces.get_mut(self.id.0) {
            surface.preedit = text.map(str::to_string);
            surface.terminal.preedit(text);
        }
    }

    pub fn preedit_text(&self) -> Option<&str> {
        self.app.surfaces.get(self.id.0)?.preedit.as_deref()
    }

    pub fn set_focus(&mut self, focused: bool) {
        self.app.set_surface_focus(self.id, focused);
    }

    pub fn is_focused(&self) -> bool {
        self.app
            .surfaces
            .get(self.id.0)
            .is_some_and(|surface| surface.focused)
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        if let Some(surface) = self.app.surfaces.get_mut(self.id.0) {
            surface.size = Size { width, height };
            surface.terminal.resize(width, height);
        }
    }

    pub fn size(&self) -> Size {
        self.app
            .surfaces
            .get(self.id.0)
            .map(|surface| surface.size)
            .unwrap_or_default()
    }

    pub fn is_readonly(&self) -> bool {
        self.app
            .surfaces
            .get(self.id.0)
            .is_some_and(|surface| surface.readonly)
    }

    /// Ask the host to close this surface.
    pub fn request_close(&mut self) -> bool {
        self.app.request_close(self.id)
    }

    /// Perform a binding action by name, e.g. `new_split:right`.
    pub fn binding_action(&mut self, action: &str) -> bool {
        self.app.binding_action(self.id, action)
    }

    pub fn complete_clipboard_request(
        &mut self,
        request: RequestId,
        data: Option<String>,
        confirmed: bool,
    ) -> bool {
        self.app
            .complete_surface_clipboard_request(self.id, request, data, confirmed)
    }

    /// Feed a terminal event on the owning thread.
    pub fn terminal_event(&mut self, event: TerminalEvent) {
        self.app.terminal_event(self.id, event);
    }

    pub fn needs_confirm_quit(&self) -> bool {
        self.app.surface_needs_confirm(self.id)
    }

    pub fn process_exited(&self) -> bool {
        self.app
            .surfaces
            .get(self.id.0)
            .is_some_and(|surface| surface.exited.is_some())
    }

    /// Copy the last rendered frame.
    pub fn get_pixels(&self) -> FrameBuffer {
        let Some(surface) = self.app.surfaces.get(self.id.0) else {
            return FrameBuffer::empty();
        };
        if surface.size.width == 0 || surface.size.height == 0 {
            return FrameBuffer::empty();
        }
        surface.readback.read()
    }

    pub fn install_readback(&mut self, backend: Box<dyn ReadbackBackend>) {
        if let Some(surface) = self.app.surfaces.get_mut(self.id.0) {
            tracing::debug!(backend = backend.name(), "Readback backend installed for {:?}", self.id);
            surface.readback = backend;
        }
    }

    /// Where the renderer hands over frames, if the backend takes them.
    pub fn frame_presenter(&self) -> Option<FramePresenter> {
        self.app.surfaces.get(self.id.0)?.readback.presenter()
    }
}
