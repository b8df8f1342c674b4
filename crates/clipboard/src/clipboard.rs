//! Clipboard request brokering.
//!
//! Every clipboard exchange with the host is a request with a plain id. The
//! broker owns the requests, so a surface can be torn down while the host
//! still holds an id: a late completion simply finds nothing and is ignored.

mod broker;
pub mod osc52;
pub mod paste;

pub use broker::{ClipboardBroker, Completion, Request, RequestState};

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Which system clipboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum ClipboardKind {
    #[default]
    Standard = 0,
    /// The X11/Wayland primary selection.
    Selection = 1,
}

impl ClipboardKind {
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Standard),
            1 => Some(Self::Selection),
            _ => None,
        }
    }

    /// Fall back to the standard clipboard when the host has no selection.
    pub fn or_standard(self, supports_selection: bool) -> Self {
        match self {
            Self::Selection if !supports_selection => Self::Standard,
            other => other,
        }
    }
}

/// What a clipboard request is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum RequestKind {
    Paste = 0,
    Osc52Read = 1,
    Osc52Write = 2,
}

impl RequestKind {
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Paste),
            1 => Some(Self::Osc52Read),
            2 => Some(Self::Osc52Write),
            _ => None,
        }
    }
}

/// Opaque completion token handed to the host.
///
/// Ids are unique across every broker in the process, so a token from a
/// superseded or torn-down request can never complete a newer one, even in
/// another app.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

impl RequestId {
    pub(crate) fn next() -> Self {
        Self(NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn to_raw(self) -> u64 {
        self.0
    }

    /// Rebuild a token the host handed back. Zero is never issued.
    pub fn from_raw(raw: u64) -> Option<Self> {
        (raw != 0).then_some(Self(raw))
    }
}

impl fmt::Debug for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "clipboard#{}", self.0)
    }
}

/// One clipboard representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardContent {
    pub mime: String,
    pub data: String,
}

impl ClipboardContent {
    pub const TEXT_PLAIN: &'static str = "text/plain";

    pub fn text(data: impl Into<String>) -> Self {
        Self {
            mime: Self::TEXT_PLAIN.to_string(),
            data: data.into(),
        }
    }
}

/// How an OSC 52 write should be carried out. Evaluated by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WritePolicy {
    pub clipboard: ClipboardKind,
    /// The user must approve the write first.
    pub confirm: bool,
}
