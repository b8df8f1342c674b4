//! Shared utilities for termbridge.

use std::any::Any;
use std::fmt::Debug;

/// Panic in debug builds, log error with backtrace in release.
///
/// Use for "this shouldn't happen" invariants that shouldn't take down
/// the host application in production.
#[macro_export]
macro_rules! debug_panic {
    ( $($fmt_arg:tt)* ) => {
        if cfg!(debug_assertions) {
            panic!( $($fmt_arg)* );
        } else {
            let backtrace = std::backtrace::Backtrace::capture();
            tracing::error!("{}\n{:?}", format_args!($($fmt_arg)*), backtrace);
        }
    };
}

pub trait ResultExt<T> {
    /// Log the error at `warn` level and discard it.
    fn log_err(self) -> Option<T>;
}

impl<T, E: Debug> ResultExt<T> for Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                tracing::warn!("{}:{}: {:?}", caller.file(), caller.line(), error);
                None
            }
        }
    }
}

/// Shorten `text` for a log line, appending an ellipsis when cut.
///
/// Clipboard payloads end up in debug logs; they can be arbitrarily large.
pub fn truncate_for_log(text: &str, max_chars: usize) -> String {
    let mut chars = text.char_indices();
    match chars.nth(max_chars) {
        Some((byte_index, _)) => format!("{}…", &text[..byte_index]),
        None => text.to_string(),
    }
}

/// The message a caught panic was raised with.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
