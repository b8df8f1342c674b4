//! Config handles.
//!
//! A config is mutable until it is given to an app, which keeps its own
//! finalized copy. The host may free its handle right after.

use std::ffi::c_char;
use std::path::Path;
use std::ptr;

use input::BindingAction;
use settings::Config;

use crate::records::{read_cstr, read_str, TbDiagnostic, TbTrigger};

/// Create a config holding the defaults.
#[no_mangle]
pub extern "C" fn termbridge_config_new() -> *mut Config {
    Box::into_raw(Box::new(Config::new()))
}

/// # Safety
///
/// `config` must be null or a live config handle. It is invalid afterwards.
#[no_mangle]
pub unsafe extern "C" fn termbridge_config_free(config: *mut Config) {
    if !config.is_null() {
        drop(unsafe { Box::from_raw(config) });
    }
}

/// Copy a config, diagnostics included. Returns null for a null input.
///
/// # Safety
///
/// `config` must be null or point to a live config. This includes the
/// borrowed config of a `config_change` action.
#[no_mangle]
pub unsafe extern "C" fn termbridge_config_clone(config: *const Config) -> *mut Config {
    match unsafe { config.as_ref() } {
        Some(config) => Box::into_raw(Box::new(config.clone())),
        None => ptr::null_mut(),
    }
}

/// Apply a config file. Problems are recorded as diagnostics.
///
/// # Safety
///
/// `config` must be null or a live config handle; `path` must be null or a
/// NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn termbridge_config_load_file(config: *mut Config, path: *const c_char) {
    let Some(config) = (unsafe { config.as_mut() }) else {
        return;
    };
    if path.is_null() {
        tracing::warn!("termbridge_config_load_file called without a path");
        return;
    }
    let path = unsafe { read_cstr(path) };
    config.load_file(Path::new(&path));
}

/// Apply a TOML document held in memory.
///
/// # Safety
///
/// `config` must be null or a live config handle; `content` must be null or
/// point to `len` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn termbridge_config_load_string(
    config: *mut Config,
    content: *const c_char,
    len: usize,
) {
    if let Some(config) = unsafe { config.as_mut() } {
        config.load_str(&unsafe { read_str(content, len) });
    }
}

/// Apply the user's config file, if any.
///
/// # Safety
///
/// `config` must be null or a live config handle.
#[no_mangle]
pub unsafe extern "C" fn termbridge_config_load_default_files(config: *mut Config) {
    if let Some(config) = unsafe { config.as_mut() } {
        config.load_default_files();
    }
}

/// # Safety
///
/// `config` must be null or a live config handle.
#[no_mangle]
pub unsafe extern "C" fn termbridge_config_finalize(config: *mut Config) {
    if let Some(config) = unsafe { config.as_mut() } {
        config.finalize();
    }
}

/// # Safety
///
/// `config` must be null or point to a live config.
#[no_mangle]
pub unsafe extern "C" fn termbridge_config_diagnostics_count(config: *const Config) -> u32 {
    unsafe { config.as_ref() }.map_or(0, |config| {
        u32::try_from(config.diagnostics().len()).unwrap_or(u32::MAX)
    })
}

/// Diagnostic `index`, or a record of nulls when out of range. Strings stay
/// valid until the config is loaded into again or freed.
///
/// # Safety
///
/// `config` must be null or point to a live config.
#[no_mangle]
pub unsafe extern "C" fn termbridge_config_get_diagnostic(
    config: *const Config,
    index: u32,
) -> TbDiagnostic {
    let diagnostic = unsafe { config.as_ref() }
        .and_then(|config| config.diagnostics().get(index as usize));
    match diagnostic {
        Some(diagnostic) => {
            let (key, key_len) = match &diagnostic.key {
                Some(key) => (key.as_ptr().cast(), key.len()),
                None => (ptr::null(), 0),
            };
            TbDiagnostic {
                key,
                key_len,
                message: diagnostic.message.as_ptr().cast(),
                message_len: diagnostic.message.len(),
            }
        }
        None => TbDiagnostic {
            key: ptr::null(),
            key_len: 0,
            message: ptr::null(),
            message_len: 0,
        },
    }
}

/// The first trigger bound to a binding action such as `new_tab` or
/// `new_split:right`, for menu accelerators. Zeroed when the action is
/// unknown or unbound.
///
/// # Safety
///
/// `config` must be null or point to a live config; `action` must be null
/// or point to `len` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn termbridge_config_trigger(
    config: *const Config,
    action: *const c_char,
    len: usize,
) -> TbTrigger {
    let Some(config) = (unsafe { config.as_ref() }) else {
        return TbTrigger::zeroed();
    };
    let name = unsafe { read_str(action, len) };
    let action: BindingAction = match name.parse() {
        Ok(action) => action,
        Err(e) => {
            tracing::debug!("Trigger lookup for invalid action {:?}: {}", name, e);
            return TbTrigger::zeroed();
        }
    };
    config
        .keybinds
        .trigger_for(&action)
        .map_or_else(TbTrigger::zeroed, TbTrigger::from)
}
