//! Application runtime: the `App` and its surfaces.
//!
//! An [`App`] owns every surface, the clipboard broker and the mailbox, and
//! talks to the embedding host through the [`Host`] listener. It lives on a
//! single thread; other threads reach it only through a [`MailboxSender`].

mod app;
mod dispatch;
mod event;
mod host;
pub mod info;
mod mailbox;
mod surface;
mod target;

pub use app::App;
pub use dispatch::Dispatcher;
pub use event::TerminalEvent;
pub use host::{Host, NullTerminal, TerminalIo};
pub use mailbox::{Mailbox, MailboxSender, Message, Waker};
pub use surface::{SurfaceConfig, SurfaceHandle};
pub use target::{Origin, TargetResolver};

pub use actions::{Action, ActionTag, SurfaceId, Target};
pub use clipboard::{ClipboardContent, ClipboardKind, RequestId, RequestKind};
pub use readback::FrameBuffer;

#[cfg(test)]
pub use host::MockHost;
