#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use apprt::{
    Action, App, ClipboardContent, ClipboardKind, Host, RequestId, RequestKind, SurfaceConfig,
    SurfaceId, Target, TerminalIo,
};
use input::layout::UsLayout;
use input::KeyEvent;
use settings::Config;

#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    Action(Target, Action),
    ReadClipboard {
        surface: SurfaceId,
        clipboard: ClipboardKind,
        request: RequestId,
    },
    ConfirmRead {
        surface: SurfaceId,
        data: String,
        request: RequestId,
        kind: RequestKind,
    },
    WriteClipboard {
        surface: SurfaceId,
        clipboard: ClipboardKind,
        data: String,
        confirm: Option<RequestId>,
    },
    CloseSurface {
        surface: SurfaceId,
        confirm: bool,
    },
}

/// Records every callback. Shared with the test through `Rc`.
#[derive(Clone)]
pub struct RecordingHost {
    pub calls: Rc<RefCell<Vec<HostCall>>>,
    pub selection: bool,
    pub accept_reads: bool,
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self {
            calls: Rc::default(),
            selection: false,
            accept_reads: true,
        }
    }
}

impl RecordingHost {
    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.borrow().clone()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn actions(&self) -> Vec<(Target, Action)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::Action(target, action) => Some((target, action)),
                _ => None,
            })
            .collect()
    }

    pub fn reads(&self) -> Vec<RequestId> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::ReadClipboard { request, .. } => Some(request),
                _ => None,
            })
            .collect()
    }

    pub fn confirms(&self) -> Vec<(RequestId, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::ConfirmRead { request, data, .. } => Some((request, data)),
                _ => None,
            })
            .collect()
    }

    /// (data, confirm token) of every clipboard write.
    pub fn writes(&self) -> Vec<(String, Option<RequestId>)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::WriteClipboard { data, confirm, .. } => Some((data, confirm)),
                _ => None,
            })
            .collect()
    }
}

impl Host for RecordingHost {
    fn action(&self, target: Target, action: &Action) -> bool {
        self.calls
            .borrow_mut()
            .push(HostCall::Action(target, action.clone()));
        true
    }

    fn read_clipboard(&self, surface: SurfaceId, clipboard: ClipboardKind, request: RequestId) -> bool {
        self.calls.borrow_mut().push(HostCall::ReadClipboard {
            surface,
            clipboard,
            request,
        });
        self.accept_reads
    }

    fn confirm_read_clipboard(
        &self,
        surface: SurfaceId,
        data: &str,
        request: RequestId,
        kind: RequestKind,
    ) {
        self.calls.borrow_mut().push(HostCall::ConfirmRead {
            surface,
            data: data.to_string(),
            request,
            kind,
        });
    }

    fn write_clipboard(
        &self,
        surface: SurfaceId,
        clipboard: ClipboardKind,
        contents: &[ClipboardContent],
        confirm: Option<RequestId>,
    ) {
        let data = contents
            .first()
            .map(|content| content.data.clone())
            .unwrap_or_default();
        self.calls.borrow_mut().push(HostCall::WriteClipboard {
            surface,
            clipboard,
            data,
            confirm,
        });
    }

    fn close_surface(&self, surface: SurfaceId, confirm: bool) {
        self.calls
            .borrow_mut()
            .push(HostCall::CloseSurface { surface, confirm });
    }

    fn supports_selection_clipboard(&self) -> bool {
        self.selection
    }
}

#[derive(Debug, Default)]
pub struct TerminalState {
    pub written: Vec<u8>,
    pub keys: Vec<KeyEvent>,
    pub bracketed: bool,
    pub selection: Option<String>,
    pub alive: bool,
    pub preedit: Option<String>,
    pub size: (u32, u32),
}

#[derive(Debug, Clone, Default)]
pub struct RecordingTerminal(pub Rc<RefCell<TerminalState>>);

impl RecordingTerminal {
    pub fn written(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow().written).into_owned()
    }

    pub fn keys(&self) -> Vec<KeyEvent> {
        self.0.borrow().keys.clone()
    }

    pub fn preedit(&self) -> Option<String> {
        self.0.borrow().preedit.clone()
    }

    pub fn set_bracketed(&self, bracketed: bool) {
        self.0.borrow_mut().bracketed = bracketed;
    }

    pub fn set_selection(&self, text: &str) {
        self.0.borrow_mut().selection = Some(text.to_string());
    }

    pub fn set_alive(&self, alive: bool) {
        self.0.borrow_mut().alive = alive;
    }
}

impl TerminalIo for RecordingTerminal {
    fn write(&mut self, data: &[u8]) {
        self.0.borrow_mut().written.extend_from_slice(data);
    }

    fn key(&mut self, event: &KeyEvent) {
        self.0.borrow_mut().keys.push(event.clone());
    }

    fn bracketed_paste(&self) -> bool {
        self.0.borrow().bracketed
    }

    fn selection_text(&self) -> Option<String> {
        self.0.borrow().selection.clone()
    }

    fn process_alive(&self) -> bool {
        self.0.borrow().alive
    }

    fn preedit(&mut self, text: Option<&str>) {
        self.0.borrow_mut().preedit = text.map(str::to_string);
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.0.borrow_mut().size = (width, height);
    }
}

/// A config with only the given TOML applied on top of an empty binding
/// table, so tests behave the same on every platform.
pub fn config(toml: &str) -> Config {
    let mut config = Config::new();
    config.load_str("keybind = \"clear\"");
    config.load_str(toml);
    assert!(
        config.diagnostics().is_empty(),
        "unexpected diagnostics: {:?}",
        config.diagnostics()
    );
    config
}

pub fn app(config: Config) -> (App, RecordingHost) {
    let host = RecordingHost::default();
    (app_with_host(config, host.clone()), host)
}

pub fn app_with_host(config: Config, host: RecordingHost) -> App {
    App::new(host, Arc::new(config), Arc::new(|| {})).with_layout(Box::new(UsLayout))
}

pub fn surface(app: &mut App) -> (SurfaceId, RecordingTerminal) {
    let terminal = RecordingTerminal::default();
    let id = app.new_surface(SurfaceConfig::new(terminal.clone()).with_size(80, 24));
    (id, terminal)
}
