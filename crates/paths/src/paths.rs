//! Where termbridge looks for its configuration.
//!
//! The directory is resolved once per process, in this order: an explicit
//! [`set_config_dir`] call, the `TERMBRIDGE_CONFIG_DIR` environment variable,
//! then `<platform config dir>/termbridge`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Environment variable that relocates the config directory.
pub const CONFIG_DIR_ENV: &str = "TERMBRIDGE_CONFIG_DIR";

const APP_DIR: &str = "termbridge";
const CONFIG_FILE: &str = "config.toml";

static CONFIG_DIR: OnceLock<PathBuf> = OnceLock::new();

fn resolve(env_override: Option<OsString>, platform: Option<PathBuf>) -> PathBuf {
    match env_override.filter(|dir| !dir.is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => platform.unwrap_or_else(|| PathBuf::from(".")).join(APP_DIR),
    }
}

pub fn config_dir() -> &'static Path {
    CONFIG_DIR.get_or_init(|| resolve(std::env::var_os(CONFIG_DIR_ENV), dirs::config_dir()))
}

/// Pin the config directory. Only the first call before any lookup takes
/// effect; returns whether this one did.
pub fn set_config_dir(path: PathBuf) -> bool {
    CONFIG_DIR.set(path).is_ok()
}

/// `config_dir()/config.toml`
pub fn config_file() -> PathBuf {
    config_dir().join(CONFIG_FILE)
}
