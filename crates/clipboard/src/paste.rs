//! Paste safety checks and encoding for the pty.

const BRACKET_START: &str = "\x1b[200~";
const BRACKET_END: &str = "\x1b[201~";

/// A paste is unsafe if it could run a command or escape bracketed paste.
pub fn is_safe_paste(text: &str) -> bool {
    !text.contains('\n') && !text.contains(BRACKET_END)
}

/// Whether the user must approve this paste before it reaches the pty.
///
/// `protection` is the master switch. With `bracketed_safe` set, bracketed
/// pastes are trusted unless they carry the end marker themselves.
pub fn needs_confirmation(text: &str, bracketed: bool, protection: bool, bracketed_safe: bool) -> bool {
    if !protection {
        return false;
    }
    if bracketed && bracketed_safe && !text.contains(BRACKET_END) {
        return false;
    }
    !is_safe_paste(text)
}

/// Bytes to write to the pty for a paste.
pub fn encode_paste(text: &str, bracketed: bool) -> String {
    if bracketed {
        // An embedded end marker would let the paste break out early.
        let inner = text.replace(BRACKET_END, "");
        let mut out = String::with_capacity(inner.len() + BRACKET_START.len() + BRACKET_END.len());
        out.push_str(BRACKET_START);
        out.push_str(&inner);
        out.push_str(BRACKET_END);
        out
    } else {
        text.replace("\r\n", "\r").replace('\n', "\r")
    }
}
