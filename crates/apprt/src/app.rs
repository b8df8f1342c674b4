use std::sync::Arc;

use actions::{Action, Readonly, SurfaceId, Target};
use clipboard::{
    osc52, paste, ClipboardBroker, ClipboardContent, ClipboardKind, Completion, Request,
    RequestId, RequestKind,
};
use collections::Arena;
use input::layout::{system_layout, KeyboardLayout};
use input::{
    BindingAction, BindingFlags, BindingMatch, KeyAction, KeyEvent, KeyTranslator, Translation,
};
use settings::{ClipboardAccess, Config};

use crate::surface::Surface;
use crate::{
    Dispatcher, Host, Mailbox, MailboxSender, Message, Origin, SurfaceConfig, SurfaceHandle,
    TargetResolver, TerminalEvent, Waker,
};

/// The engine side of one embedding.
///
/// Owns every surface and all clipboard requests. Not `Send`: it must stay
/// on the thread that created it.
pub struct App {
    host: Box<dyn Host>,
    config: Arc<Config>,
    layout: Box<dyn KeyboardLayout>,
    pub(crate) surfaces: Arena<Surface>,
    clipboard: ClipboardBroker,
    mailbox: Mailbox,
    focused: bool,
    last_focused: Option<SurfaceId>,
}

impl App {
    pub fn new(host: impl Host + 'static, config: Arc<Config>, waker: Waker) -> Self {
        tracing::info!("Starting app");
        Self {
            host: Box::new(host),
            config,
            layout: system_layout(),
            surfaces: Arena::new(),
            clipboard: ClipboardBroker::new(),
            mailbox: Mailbox::new(waker),
            focused: false,
            last_focused: None,
        }
    }

    pub fn with_layout(mut self, layout: Box<dyn KeyboardLayout>) -> Self {
        self.layout = layout;
        self
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub fn host(&self) -> &dyn Host {
        self.host.as_ref()
    }

    /// Handle for delivering work from other threads.
    pub fn sender(&self) -> MailboxSender {
        self.mailbox.sender()
    }

    fn dispatcher(&self) -> Dispatcher<'_> {
        Dispatcher::new(self.host.as_ref())
    }

    pub(crate) fn translator(&self) -> KeyTranslator<'_> {
        KeyTranslator::new(
            self.layout.as_ref(),
            self.config.keycode_table,
            self.config.macos_option_as_alt,
            &self.config.keybinds,
        )
    }

    fn supports_selection(&self) -> bool {
        self.dispatcher()
            .call("supports_selection_clipboard", false, |host| {
                host.supports_selection_clipboard()
            })
    }

    /// Apply everything other threads queued. Returns the number of
    /// messages handled.
    pub fn tick(&mut self) -> usize {
        let messages = self.mailbox.drain();
        let count = messages.len();
        for message in messages {
            match message {
                Message::ClipboardCompletion {
                    surface: Some(surface),
                    request,
                    data,
                    confirmed,
                } => {
                    self.complete_surface_clipboard_request(surface, request, data, confirmed);
                }
                Message::ClipboardCompletion {
                    surface: None,
                    request,
                    data,
                    confirmed,
                } => {
                    self.complete_clipboard_request(request, data, confirmed);
                }
                Message::Terminal { surface, event } => self.terminal_event(surface, event),
            }
        }
        if count > 0 {
            tracing::trace!("Tick handled {} message(s)", count);
        }
        count
    }

    pub fn set_focus(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Dispatch `action` from `origin`. Returns the host's answer, or false
    /// if the origin surface is gone.
    pub fn dispatch(&self, origin: Origin, action: &Action) -> bool {
        match TargetResolver::new(&self.surfaces).resolve(origin) {
            Some(target) => self.dispatcher().dispatch(target, action),
            None => false,
        }
    }

    // === Surfaces ===

    pub fn new_surface(&mut self, mut config: SurfaceConfig) -> SurfaceId {
        let backend = config
            .readback
            .take()
            .unwrap_or_else(|| readback::select_backend(self.config.frame_readback));
        tracing::debug!(backend = backend.name(), "Readback backend selected");
        let id = SurfaceId(self.surfaces.insert(Surface::new(config, backend)));
        tracing::info!("Created {:?}", id);
        id
    }

    /// Tear a surface down. Its clipboard requests are cancelled, so late
    /// completions for them are ignored.
    pub fn free_surface(&mut self, id: SurfaceId) -> bool {
        if self.surfaces.remove(id.0).is_none() {
            tracing::warn!("Freeing unknown {:?}", id);
            return false;
        }
        self.clipboard.cancel_surface(id);
        if self.last_focused == Some(id) {
            self.last_focused = None;
        }
        tracing::info!("Freed {:?}", id);
        true
    }

    pub fn surface(&mut self, id: SurfaceId) -> Option<SurfaceHandle<'_>> {
        if !self.surfaces.contains(id.0) {
            return None;
        }
        Some(SurfaceHandle { app: self, id })
    }

    pub fn surface_ids(&self) -> Vec<SurfaceId> {
        self.surfaces.indices().into_iter().map(SurfaceId).collect()
    }

    pub(crate) fn set_surface_focus(&mut self, id: SurfaceId, focused: bool) {
        if let Some(surface) = self.surfaces.get_mut(id.0) {
            surface.focused = focused;
            if focused {
                self.last_focused = Some(id);
            }
        }
    }

    pub(crate) fn surface_needs_confirm(&self, id: SurfaceId) -> bool {
        self.config.confirm_close_surface
            && self
                .surfaces
                .get(id.0)
                .is_some_and(|surface| surface.process_running())
    }

    pub(crate) fn request_close(&mut self, id: SurfaceId) -> bool {
        if !self.surfaces.contains(id.0) {
            return false;
        }
        let confirm = self.surface_needs_confirm(id);
        self.dispatcher()
            .call("close_surface", (), |host| host.close_surface(id, confirm));
        true
    }

    pub fn needs_confirm_quit(&self) -> bool {
        self.surface_ids()
            .into_iter()
            .any(|id| self.surface_needs_confirm(id))
    }

    // === Configuration ===

    pub fn update_config(&mut self, config: Arc<Config>) {
        tracing::info!("Applying new configuration");
        self.config = config;
        let action = Action::ConfigChange(self.config.clone());
        self.dispatcher().dispatch(Target::App, &action);
        for id in self.surface_ids() {
            self.dispatcher().dispatch(Target::Surface(id), &action);
        }
    }

    /// The host's keyboard layout changed.
    pub fn keyboard_changed(&mut self) {
        self.layout = system_layout();
        tracing::info!(layout = self.layout.name(), "Keyboard layout changed");
    }

    pub fn has_global_keybinds(&self) -> bool {
        self.config.keybinds.has_global()
    }

    // === Keys ===

    /// A key event while no surface has focus. Only global bindings fire.
    pub fn key(&mut self, event: KeyEvent) -> bool {
        let Some(binding) = self.translator().lookup(event) else {
            return false;
        };
        if !binding.flags.contains(BindingFlags::GLOBAL) {
            return false;
        }
        tracing::debug!(trigger = %binding.trigger, action = %binding.action, "Global binding matched");

        if binding.action.is_app_scoped() {
            return self.perform_on_app(&binding.action);
        }
        if binding.flags.contains(BindingFlags::ALL) {
            return self.perform_on_all(&binding.action);
        }
        match self.last_focused.filter(|id| self.surfaces.contains(id.0)) {
            Some(id) => self.perform(id, &binding.action),
            None => self.perform_on_app(&binding.action),
        }
    }

    pub fn key_is_binding(&self, event: KeyEvent) -> Option<BindingFlags> {
        self.translator().lookup(event).map(|binding| binding.flags)
    }

    pub(crate) fn surface_key(&mut self, id: SurfaceId, event: KeyEvent) -> bool {
        if !self.surfaces.contains(id.0) {
            return false;
        }
        match self.translator().translate(event) {
            Translation::Composing(event) => {
                self.show_composition(id, &event);
                false
            }
            Translation::Binding { event, binding } => {
                tracing::debug!(trigger = %binding.trigger, action = %binding.action, "Binding matched");
                self.perform_binding(id, &binding);
                if !binding.consumed() {
                    self.forward_key(id, &event);
                }
                true
            }
            Translation::Forward(event) => self.forward_key(id, &event),
        }
    }

    /// Composing text is shown as preedit, never sent as input.
    fn show_composition(&mut self, id: SurfaceId, event: &KeyEvent) {
        if event.action == KeyAction::Release || event.text.is_empty() {
            return;
        }
        if let Some(surface) = self.surfaces.get_mut(id.0) {
            surface.preedit = Some(event.text.clone());
            surface.terminal.preedit(Some(&event.text));
        }
    }

    fn forward_key(&mut self, id: SurfaceId, event: &KeyEvent) -> bool {
        let Some(surface) = self.surfaces.get_mut(id.0) else {
            return false;
        };
        if surface.readonly {
            return false;
        }
        surface.terminal.key(event);
        true
    }

    // === Binding actions ===

    pub(crate) fn binding_action(&mut self, id: SurfaceId, action: &str) -> bool {
        match action.parse::<BindingAction>() {
            Ok(action) => self.perform(id, &action),
            Err(e) => {
                tracing::warn!(error = %e, "Invalid binding action {:?}", action);
                false
            }
        }
    }

    fn perform_binding(&mut self, id: SurfaceId, binding: &BindingMatch) -> bool {
        if binding.flags.contains(BindingFlags::ALL) && !binding.action.is_app_scoped() {
            return self.perform_on_all(&binding.action);
        }
        self.perform(id, &binding.action)
    }

    fn perform_on_all(&mut self, action: &BindingAction) -> bool {
        let mut performed = false;
        for id in self.surface_ids() {
            performed |= self.perform(id, action);
        }
        performed
    }

    fn perform_on_app(&self, action: &BindingAction) -> bool {
        match Action::from_binding(action) {
            Some(action) => self.dispatcher().dispatch(Target::App, &action),
            None => {
                tracing::debug!("{} needs a surface; ignoring at app level", action);
                false
            }
        }
    }

    /// Perform a binding action on behalf of surface `id`.
    fn perform(&mut self, id: SurfaceId, action: &BindingAction) -> bool {
        match action {
            BindingAction::Ignore => true,
            BindingAction::Unbind => false,
            BindingAction::Text(text) => self.write_input(id, text.as_bytes()),
            BindingAction::Csi(seq) => self.write_input(id, format!("\x1b[{seq}").as_bytes()),
            BindingAction::Esc(seq) => self.write_input(id, format!("\x1b{seq}").as_bytes()),
            BindingAction::CopyToClipboard => self.copy_selection(id, ClipboardKind::Standard),
            BindingAction::PasteFromClipboard => {
                self.request_clipboard(id, RequestKind::Paste, ClipboardKind::Standard)
            }
            BindingAction::PasteFromSelection => {
                self.request_clipboard(id, RequestKind::Paste, ClipboardKind::Selection)
            }
            BindingAction::CloseSurface => self.request_close(id),
            BindingAction::ToggleReadonly => self.toggle_readonly(id),
            other => {
                let Some(host_action) = Action::from_binding(other) else {
                    util::debug_panic!("binding action {} has no host action", other);
                    return false;
                };
                let target = TargetResolver::new(&self.surfaces)
                    .resolve_scoped(Origin::Surface(id), other.is_app_scoped());
                target.is_some_and(|target| self.dispatcher().dispatch(target, &host_action))
            }
        }
    }

    fn toggle_readonly(&mut self, id: SurfaceId) -> bool {
        let Some(surface) = self.surfaces.get_mut(id.0) else {
            return false;
        };
        surface.readonly = !surface.readonly;
        let state = if surface.readonly {
            Readonly::On
        } else {
            Readonly::Off
        };
        self.dispatcher()
            .dispatch(Target::Surface(id), &Action::Readonly(state));
        true
    }

    /// Bytes from the user for the child. Dropped while readonly.
    fn write_input(&mut self, id: SurfaceId, data: &[u8]) -> bool {
        let Some(surface) = self.surfaces.get_mut(id.0) else {
            return false;
        };
        if surface.readonly {
            tracing::debug!("{:?} is readonly; dropping {} byte(s) of input", id, data.len());
            return false;
        }
        surface.terminal.write(data);
        true
    }

    /// Protocol replies go out even while readonly.
    fn write_reply(&mut self, id: SurfaceId, data: &[u8]) -> bool {
        let Some(surface) = self.surfaces.get_mut(id.0) else {
            return false;
        };
        surface.terminal.write(data);
        true
    }

    pub(crate) fn surface_text(&mut self, id: SurfaceId, text: &str) {
        let Some(surface) = self.surfaces.get(id.0) else {
            return;
        };
        let encoded = paste::encode_paste(text, surface.terminal.bracketed_paste());
        self.write_input(id, encoded.as_bytes());
    }

    // === Terminal events ===

    pub(crate) fn terminal_event(&mut self, id: SurfaceId, event: TerminalEvent) {
        let Some(surface) = self.surfaces.get_mut(id.0) else {
            tracing::debug!("Dropping {:?} for stale {:?}", event, id);
            return;
        };
        match event {
            TerminalEvent::Osc52Read { clipboard } => self.osc52_read(id, clipboard),
            TerminalEvent::Osc52Write { clipboard, payload } => {
                self.osc52_write(id, clipboard, &payload)
            }
            TerminalEvent::SelectionChanged => {
                if self.config.copy_on_select {
                    self.copy_selection(id, ClipboardKind::Selection);
                }
            }
            event => {
                if let TerminalEvent::ChildExited(exited) = &event {
                    surface.exited = Some(*exited);
                }
                if let Some(action) = event.into_action() {
                    self.dispatch(Origin::Surface(id), &action);
                }
            }
        }
    }

    // === Clipboard ===

    fn copy_selection(&mut self, id: SurfaceId, clipboard: ClipboardKind) -> bool {
        let Some(text) = self
            .surfaces
            .get(id.0)
            .and_then(|surface| surface.terminal.selection_text())
            .filter(|text| !text.is_empty())
        else {
            return false;
        };
        let clipboard = clipboard.or_standard(self.supports_selection());
        self.write_clipboard(id, clipboard, text, None);
        true
    }

    fn write_clipboard(
        &self,
        id: SurfaceId,
        clipboard: ClipboardKind,
        text: String,
        confirm: Option<RequestId>,
    ) {
        let contents = [ClipboardContent::text(text)];
        self.dispatcher().call("write_clipboard", (), |host| {
            host.write_clipboard(id, clipboard, &contents, confirm)
        });
    }

    /// Ask the host for clipboard contents. The answer arrives through
    /// [`Self::complete_clipboard_request`].
    fn request_clipboard(&mut self, id: SurfaceId, kind: RequestKind, clipboard: ClipboardKind) -> bool {
        let clipboard = clipboard.or_standard(self.supports_selection());
        let request = self.clipboard.request(id, kind, clipboard, None);
        let started = self.dispatcher().call("read_clipboard", false, |host| {
            host.read_clipboard(id, clipboard, request)
        });
        if !started {
            self.clipboard.cancel(request);
        }
        started
    }

    fn osc52_read(&mut self, id: SurfaceId, clipboard: ClipboardKind) {
        if self.config.clipboard_read == ClipboardAccess::Deny {
            tracing::info!("OSC 52 read from {:?} denied by clipboard-read", id);
            return;
        }
        self.request_clipboard(id, RequestKind::Osc52Read, clipboard);
    }

    fn osc52_write(&mut self, id: SurfaceId, clipboard: ClipboardKind, payload: &str) {
        let access = self.config.clipboard_write;
        if access == ClipboardAccess::Deny {
            tracing::info!("OSC 52 write from {:?} denied by clipboard-write", id);
            return;
        }
        let text = match osc52::decode_write(payload) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring malformed OSC 52 write");
                return;
            }
        };
        let clipboard = clipboard.or_standard(self.supports_selection());
        match access {
            ClipboardAccess::Ask => {
                let request =
                    self.clipboard
                        .request(id, RequestKind::Osc52Write, clipboard, Some(text.clone()));
                self.write_clipboard(id, clipboard, text, Some(request));
            }
            _ => self.write_clipboard(id, clipboard, text, None),
        }
    }

    /// Deliver the host's answer to a clipboard request. Stale, superseded
    /// and torn-down requests are accepted and ignored.
    pub fn complete_clipboard_request(
        &mut self,
        request: RequestId,
        data: Option<String>,
        confirmed: bool,
    ) -> bool {
        match self.clipboard.complete(request, data, confirmed) {
            Completion::Stale | Completion::Cancelled(_) => false,
            Completion::Ready {
                request,
                data,
                confirmed,
            } => self.finish_clipboard(request, data, confirmed),
        }
    }

    /// Deliver an answer that arrived through `surface`. A request issued
    /// for a different surface is left alone.
    pub fn complete_surface_clipboard_request(
        &mut self,
        surface: SurfaceId,
        request: RequestId,
        data: Option<String>,
        confirmed: bool,
    ) -> bool {
        if let Some(owner) = self.clipboard.get(request).map(|r| r.surface) {
            if owner != surface {
                tracing::warn!("{:?} belongs to {:?}, not {:?}; ignoring", request, owner, surface);
                return false;
            }
        }
        self.complete_clipboard_request(request, data, confirmed)
    }

    fn finish_clipboard(&mut self, request: Request, data: String, confirmed: bool) -> bool {
        let id = request.surface;
        let Some(surface) = self.surfaces.get(id.0) else {
            util::debug_panic!("clipboard request outlived {:?}", id);
            return false;
        };
        match request.kind {
            RequestKind::Paste => {
                let bracketed = surface.terminal.bracketed_paste();
                let unsafe_paste = paste::needs_confirmation(
                    &data,
                    bracketed,
                    self.config.clipboard_paste_protection,
                    self.config.clipboard_paste_bracketed_safe,
                );
                if unsafe_paste && !confirmed {
                    return self.ask_confirmation(request, data);
                }
                let encoded = paste::encode_paste(&data, bracketed);
                self.write_input(id, encoded.as_bytes())
            }
            RequestKind::Osc52Read => {
                if self.config.clipboard_read == ClipboardAccess::Ask && !confirmed {
                    return self.ask_confirmation(request, data);
                }
                let reply = osc52::encode_read_response(request.clipboard, &data);
                self.write_reply(id, reply.as_bytes())
            }
            RequestKind::Osc52Write => {
                self.write_clipboard(id, request.clipboard, data, None);
                true
            }
        }
    }

    fn ask_confirmation(&mut self, request: Request, data: String) -> bool {
        let (surface, id, kind) = (request.surface, request.id, request.kind);
        if !self.clipboard.await_confirmation(request, data.clone()) {
            return false;
        }
        tracing::debug!(
            "Confirming {:?}: {}",
            id,
            util::truncate_for_log(&data, 40)
        );
        self.dispatcher().call("confirm_read_clipboard", (), |host| {
            host.confirm_read_clipboard(surface, &data, id, kind)
        });
        true
    }

    /// Outstanding clipboard request of `kind` for `surface`.
    pub fn pending_clipboard(&self, surface: SurfaceId, kind: RequestKind) -> Option<RequestId> {
        self.clipboard
            .outstanding(surface, kind)
            .map(|request| request.id)
    }
}
