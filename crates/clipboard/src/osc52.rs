//! OSC 52 clipboard sequences.
//!
//! Programs write `ESC ] 52 ; <target> ; <base64> ST` to set the clipboard
//! and `ESC ] 52 ; <target> ; ? ST` to read it.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use settings::constants::clipboard::MAX_OSC52_BYTES;
use thiserror::Error;

use crate::ClipboardKind;

#[derive(Debug, Error)]
pub enum Osc52Error {
    #[error("invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
    #[error("payload is not valid UTF-8")]
    InvalidUtf8,
    #[error("payload too large: {0} bytes")]
    TooLarge(usize),
}

/// Map an OSC 52 target selector to a clipboard. `c` and an empty selector
/// are the standard clipboard; `s` and `p` are the selection.
pub fn clipboard_for(target: &str) -> Option<ClipboardKind> {
    match target.chars().next() {
        None | Some('c') => Some(ClipboardKind::Standard),
        Some('s') | Some('p') => Some(ClipboardKind::Selection),
        _ => None,
    }
}

fn selector(kind: ClipboardKind) -> char {
    match kind {
        ClipboardKind::Standard => 'c',
        ClipboardKind::Selection => 's',
    }
}

/// The reply sent to the pty for a completed OSC 52 read.
pub fn encode_read_response(kind: ClipboardKind, data: &str) -> String {
    format!("\x1b]52;{};{}\x1b\\", selector(kind), STANDARD.encode(data))
}

/// Decode the payload of an OSC 52 write.
pub fn decode_write(payload: &str) -> Result<String, Osc52Error> {
    let payload = payload.trim();
    // Base64 inflates by 4/3; reject before allocating.
    let estimate = payload.len() / 4 * 3;
    if estimate > MAX_OSC52_BYTES {
        return Err(Osc52Error::TooLarge(estimate));
    }
    let bytes = STANDARD.decode(payload)?;
    if bytes.len() > MAX_OSC52_BYTES {
        return Err(Osc52Error::TooLarge(bytes.len()));
    }
    String::from_utf8(bytes).map_err(|_| Osc52Error::InvalidUtf8)
}
