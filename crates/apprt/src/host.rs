use actions::{Action, SurfaceId, Target};
use clipboard::{ClipboardContent, ClipboardKind, RequestId, RequestKind};
use input::KeyEvent;

/// The embedding host, as seen by the engine.
///
/// Every call is made synchronously on the thread that owns the [`crate::App`].
#[cfg_attr(test, mockall::automock)]
pub trait Host {
    /// Perform `action`. The return value is advisory: `false` means the
    /// host did not handle it.
    fn action(&self, target: Target, action: &Action) -> bool;

    /// Start reading a clipboard. The host answers later with
    /// `complete_clipboard_request(request, ..)`. Returns `false` if the
    /// read could not be started.
    fn read_clipboard(&self, surface: SurfaceId, clipboard: ClipboardKind, request: RequestId) -> bool;

    /// Ask the user to approve `data` before it is used. Answered with
    /// `complete_clipboard_request(request, Some(data), true)`.
    fn confirm_read_clipboard(
        &self,
        surface: SurfaceId,
        data: &str,
        request: RequestId,
        kind: RequestKind,
    );

    /// Write to a clipboard. With `confirm` set the host must ask the user
    /// first and report the answer through `complete_clipboard_request`.
    fn write_clipboard(
        &self,
        surface: SurfaceId,
        clipboard: ClipboardKind,
        contents: &[ClipboardContent],
        confirm: Option<RequestId>,
    );

    /// The surface wants to close. `confirm` is set while a process is
    /// still running in it.
    fn close_surface(&self, surface: SurfaceId, confirm: bool);

    /// Whether the platform has a primary selection clipboard.
    fn supports_selection_clipboard(&self) -> bool {
        false
    }
}

/// The terminal emulator behind a surface.
pub trait TerminalIo {
    /// Bytes for the child's stdin.
    fn write(&mut self, data: &[u8]);

    /// Encode and send a key event the bindings did not claim.
    fn key(&mut self, event: &KeyEvent);

    fn bracketed_paste(&self) -> bool {
        false
    }

    fn selection_text(&self) -> Option<String> {
        None
    }

    fn title(&self) -> Option<String> {
        None
    }

    /// Whether a foreground process other than the shell is running.
    fn process_alive(&self) -> bool {
        false
    }

    /// Show, or with `None` clear, the IME preedit text.
    fn preedit(&mut self, _text: Option<&str>) {}

    fn resize(&mut self, _width: u32, _height: u32) {}
}

/// A terminal that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTerminal;

impl TerminalIo for NullTerminal {
    fn write(&mut self, _data: &[u8]) {}

    fn key(&mut self, _event: &KeyEvent) {}
}
