//! TOML runtime configuration.
//!
//! Config location: `~/.config/termbridge/config.toml`
//!
//! Loading never fails outright. Each bad key, bad value or bad keybind is
//! recorded as a [`Diagnostic`] and the rest of the file still applies.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _};
use input::{BindingSet, KeycodeTable, OptionAsAlt};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::constants;

/// Policy for a clipboard access initiated by the running program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClipboardAccess {
    Allow,
    Deny,
    Ask,
}

/// Which frame readback backend a new surface gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrameReadback {
    /// Readback always yields an empty frame.
    None,
    /// Frames presented by the renderer are kept in memory and copied.
    #[default]
    Software,
    /// The host supplies pixels through a callback.
    External,
}

/// One configuration problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The offending key, when the problem is tied to one.
    pub key: Option<String>,
    pub message: String,
}

impl Diagnostic {
    fn keyed(key: &str, message: impl Into<String>) -> Self {
        Self {
            key: Some(key.to_string()),
            message: message.into(),
        }
    }

    fn file(message: impl Into<String>) -> Self {
        Self {
            key: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{key}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// The binding table, defaults first, then every `keybind` entry in order.
    pub keybinds: BindingSet,
    /// OSC 52 reads by the running program.
    pub clipboard_read: ClipboardAccess,
    /// OSC 52 writes by the running program.
    pub clipboard_write: ClipboardAccess,
    /// Ask before pasting text that could run commands.
    pub clipboard_paste_protection: bool,
    /// Treat pastes as safe while bracketed paste mode is on.
    pub clipboard_paste_bracketed_safe: bool,
    /// Copy selections to the selection clipboard as they change.
    pub copy_on_select: bool,
    /// macOS: which Option keys act as Alt.
    pub macos_option_as_alt: OptionAsAlt,
    /// Ask before closing a surface with a running process.
    pub confirm_close_surface: bool,
    pub frame_readback: FrameReadback,
    /// Numbering of host keycodes.
    pub keycode_table: KeycodeTable,
    diagnostics: Vec<Diagnostic>,
    finalized: bool,
}

impl Default for Config {
    fn default() -> Self {
        let mut keybinds = BindingSet::new();
        for line in constants::keybinds::DEFAULTS {
            if let Err(e) = keybinds.parse_and_put(line) {
                util::debug_panic!("default keybind {line:?} is invalid: {e}");
            }
        }

        Self {
            keybinds,
            clipboard_read: ClipboardAccess::Ask,
            clipboard_write: ClipboardAccess::Allow,
            clipboard_paste_protection: true,
            clipboard_paste_bracketed_safe: true,
            copy_on_select: false,
            macos_option_as_alt: OptionAsAlt::False,
            confirm_close_surface: true,
            frame_readback: FrameReadback::default(),
            keycode_table: KeycodeTable::default(),
            diagnostics: Vec::new(),
            finalized: false,
        }
    }
}

fn parse_value<T: DeserializeOwned>(value: toml::Value) -> Result<T, String> {
    value
        .try_into()
        .map_err(|e: toml::de::Error| e.message().to_string())
}

/// Default config file content with comments (generated on first use).
pub const DEFAULT_CONFIG: &str = r#"# termbridge configuration
#
# Keybinds use `[prefix:]trigger=action`. Prefixes: global, all, unconsumed,
# performable. `keybind = ["clear"]` drops the defaults.
# keybind = [
#     "ctrl+shift+t=new_tab",
#     "global:ctrl+grave_accent=toggle_quick_terminal",
#     "ctrl+a=unbind",
# ]

# OSC 52 clipboard access by programs: "allow", "deny" or "ask"
clipboard-read = "ask"
clipboard-write = "allow"

# Confirm pastes that contain newlines or control sequences
clipboard-paste-protection = true

# Skip paste confirmation while bracketed paste mode is on
clipboard-paste-bracketed-safe = true

# Copy selections to the selection clipboard automatically
# copy-on-select = false

# macOS: Option keys behave as Alt (true, false, "left" or "right")
# macos-option-as-alt = false

# Ask before closing a surface with a running process
confirm-close-surface = true

# Frame readback backend: "none", "software" or "external"
# frame-readback = "software"

# Host keycode numbering: "native", "xkb", "mac" or "w3c"
# keycode-table = "native"
"#;

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Problems found while loading, in the order they were found.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Apply a TOML document on top of the current values.
    pub fn load_str(&mut self, content: &str) {
        let table: toml::Table = match content.parse() {
            Ok(table) => table,
            Err(e) => {
                let e: toml::de::Error = e;
                self.diagnostics
                    .push(Diagnostic::file(format!("invalid TOML: {}", e.message())));
                return;
            }
        };

        for (key, value) in table {
            if let Err(message) = self.apply(&key, value) {
                self.diagnostics.push(Diagnostic::keyed(&key, message));
            }
        }
    }

    /// Apply one config file. I/O problems become diagnostics.
    pub fn load_file(&mut self, path: &Path) {
        match read_config_file(path) {
            Ok(content) => self.load_str(&content),
            Err(e) => self.diagnostics.push(Diagnostic::file(format!("{e:#}"))),
        }
    }

    /// Apply the user's config file if there is one.
    pub fn load_default_files(&mut self) {
        let path = config_path();
        if path.exists() {
            self.load_file(&path);
        } else {
            tracing::debug!("No config file at {:?}, using defaults", path);
        }
    }

    /// Mark loading as complete. Diagnostics are logged once here.
    pub fn finalize(&mut self) {
        if self.finalized {
            return;
        }
        for diagnostic in &self.diagnostics {
            tracing::warn!("Config: {}", diagnostic);
        }
        self.finalized = true;
    }

    fn apply(&mut self, key: &str, value: toml::Value) -> Result<(), String> {
        match key {
            "keybind" => {
                let lines = match value {
                    toml::Value::String(line) => vec![line],
                    other => parse_value::<Vec<String>>(other)?,
                };
                if lines.len() > constants::settings::MAX_KEYBINDS {
                    return Err(format!(
                        "too many keybinds ({}, limit {})",
                        lines.len(),
                        constants::settings::MAX_KEYBINDS
                    ));
                }
                for line in lines {
                    if line.trim() == "clear" {
                        self.keybinds.clear();
                        continue;
                    }
                    if let Err(e) = self.keybinds.parse_and_put(&line) {
                        self.diagnostics
                            .push(Diagnostic::keyed(key, format!("{line:?}: {e}")));
                    }
                }
            }
            "clipboard-read" => self.clipboard_read = parse_value(value)?,
            "clipboard-write" => self.clipboard_write = parse_value(value)?,
            "clipboard-paste-protection" => self.clipboard_paste_protection = parse_value(value)?,
            "clipboard-paste-bracketed-safe" => {
                self.clipboard_paste_bracketed_safe = parse_value(value)?
            }
            "copy-on-select" => self.copy_on_select = parse_value(value)?,
            "macos-option-as-alt" => self.macos_option_as_alt = parse_value(value)?,
            "confirm-close-surface" => self.confirm_close_surface = parse_value(value)?,
            "frame-readback" => self.frame_readback = parse_value(value)?,
            "keycode-table" => self.keycode_table = parse_value(value)?,
            _ => return Err("unknown key".to_string()),
        }
        Ok(())
    }

    /// Defaults plus the user's config file, finalized.
    pub fn load() -> Self {
        let mut config = Self::new();
        config.load_default_files();
        config.finalize();
        config
    }
}

/// Return the config file path.
pub fn config_path() -> PathBuf {
    termbridge_paths::config_file()
}

/// Read a config file, refusing anything implausibly large.
pub fn read_config_file(path: &Path) -> anyhow::Result<String> {
    let metadata =
        std::fs::metadata(path).with_context(|| format!("failed to stat {}", path.display()))?;
    if metadata.len() > constants::settings::MAX_FILE_SIZE {
        bail!(
            "config file {} is too large ({} bytes)",
            path.display(),
            metadata.len()
        );
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Ensure the config file exists, creating the commented default if missing.
/// Returns the path to the config file.
pub fn ensure_config_file() -> anyhow::Result<PathBuf> {
    let path = config_path();
    if !path.exists() {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::write(&path, DEFAULT_CONFIG)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!("Created default config at {:?}", path);
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use input::{BindingAction, Mods, Trigger};
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn load(src: &str) -> Config {
        let mut config = Config::new();
        config.load_str(src);
        config
    }

    #[test]
    fn default_config_has_sane_values() {
        let cfg = Config::default();
        assert_eq!(cfg.clipboard_read, ClipboardAccess::Ask);
        assert_eq!(cfg.clipboard_write, ClipboardAccess::Allow);
        assert!(cfg.clipboard_paste_protection);
        assert!(cfg.confirm_close_surface);
        assert_eq!(cfg.frame_readback, FrameReadback::Software);
        assert!(!cfg.keybinds.is_empty());
        assert!(cfg.diagnostics().is_empty());
    }

    #[test]
    fn empty_string_parses_to_defaults() {
        assert_eq!(load(""), Config::default());
    }

    #[test]
    fn parses_full_toml() {
        let cfg = load(
            r#"
clipboard-read = "deny"
clipboard-write = "ask"
clipboard-paste-protection = false
clipboard-paste-bracketed-safe = false
copy-on-select = true
macos-option-as-alt = "left"
confirm-close-surface = false
frame-readback = "external"
keycode-table = "xkb"
"#,
        );
        assert_eq!(cfg.diagnostics(), &[]);
        assert_eq!(cfg.clipboard_read, ClipboardAccess::Deny);
        assert_eq!(cfg.clipboard_write, ClipboardAccess::Ask);
        assert!(!cfg.clipboard_paste_protection);
        assert!(!cfg.clipboard_paste_bracketed_safe);
        assert!(cfg.copy_on_select);
        assert_eq!(cfg.macos_option_as_alt, OptionAsAlt::Left);
        assert!(!cfg.confirm_close_surface);
        assert_eq!(cfg.frame_readback, FrameReadback::External);
        assert_eq!(cfg.keycode_table, KeycodeTable::Xkb);
    }

    #[test]
    fn default_config_template_loads_cleanly() {
        let cfg = load(DEFAULT_CONFIG);
        assert_eq!(cfg.diagnostics(), &[]);
        assert_eq!(cfg, Config::default());
    }

    // === Diagnostics ===

    #[test]
    fn unknown_key_is_diagnosed_and_rest_applies() {
        let cfg = load(
            r#"
unknown-key = "whatever"
copy-on-select = true
"#,
        );
        assert_eq!(
            cfg.diagnostics(),
            &[Diagnostic::keyed("unknown-key", "unknown key")]
        );
        assert!(cfg.copy_on_select);
    }

    #[test_case(r#"clipboard-read = "sometimes""# ; "bad enum")]
    #[test_case(r#"copy-on-select = "yes""# ; "bad bool")]
    #[test_case(r#"frame-readback = 3"# ; "wrong type")]
    fn bad_value_is_diagnosed(src: &str) {
        let cfg = load(src);
        assert_eq!(cfg.diagnostics().len(), 1);
        assert!(cfg.diagnostics()[0].key.is_some());
    }

    #[test]
    fn bad_value_keeps_previous_setting() {
        let cfg = load(r#"clipboard-read = "sometimes""#);
        assert_eq!(cfg.clipboard_read, ClipboardAccess::Ask);
    }

    #[test]
    fn invalid_toml_is_one_diagnostic() {
        let cfg = load("this is = = not toml");
        assert_eq!(cfg.diagnostics().len(), 1);
        assert_eq!(cfg.diagnostics()[0].key, None);
        assert_eq!(cfg, {
            let mut expected = Config::default();
            expected.diagnostics = cfg.diagnostics.clone();
            expected
        });
    }

    #[test]
    fn diagnostic_display() {
        assert_eq!(
            Diagnostic::keyed("keybind", "bad").to_string(),
            "keybind: bad"
        );
        assert_eq!(Diagnostic::file("oops").to_string(), "oops");
    }

    // === Keybinds ===

    #[test]
    fn keybind_entries_apply_in_order() {
        let cfg = load(
            r#"
keybind = [
    "clear",
    "ctrl+a=new_tab",
    "ctrl+a=new_window",
    "ctrl+b=new_tab",
]
"#,
        );
        assert_eq!(cfg.keybinds.len(), 2);
        let binding = cfg.keybinds.get(&Trigger::unicode('a', Mods::CTRL)).unwrap();
        assert_eq!(binding.action, BindingAction::NewWindow);
    }

    #[test]
    fn single_keybind_string_is_accepted() {
        let cfg = load(r#"keybind = "clear""#);
        assert!(cfg.keybinds.is_empty());
    }

    #[test]
    fn bad_keybind_is_diagnosed_and_others_apply() {
        let cfg = load(r#"keybind = ["clear", "ctrl+a=fly", "ctrl+b=new_tab"]"#);
        assert_eq!(cfg.diagnostics().len(), 1);
        assert_eq!(cfg.diagnostics()[0].key.as_deref(), Some("keybind"));
        assert_eq!(cfg.keybinds.len(), 1);
    }

    #[test]
    fn unbind_removes_a_default() {
        let line = constants::keybinds::DEFAULTS[0];
        let trigger = input::parse_binding(line).unwrap().trigger;
        let cfg = load(&format!(r#"keybind = ["{trigger}=unbind"]"#));
        assert!(cfg.keybinds.get(&trigger).is_none());
        assert_eq!(cfg.keybinds.len(), Config::default().keybinds.len() - 1);
    }

    // === Files ===

    #[test]
    fn load_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "copy-on-select = true\n").unwrap();
        let mut cfg = Config::new();
        cfg.load_file(&path);
        assert!(cfg.copy_on_select);
        assert!(cfg.diagnostics().is_empty());
    }

    #[test]
    fn missing_file_is_a_diagnostic() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = Config::new();
        cfg.load_file(&dir.path().join("absent.toml"));
        assert_eq!(cfg.diagnostics().len(), 1);
        assert!(cfg.diagnostics()[0].message.contains("absent.toml"));
    }

    #[test]
    fn oversized_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let big = "#".repeat(constants::settings::MAX_FILE_SIZE as usize + 1);
        std::fs::write(&path, big).unwrap();
        let err = read_config_file(&path).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn finalize_is_idempotent() {
        let mut cfg = load("nope = 1");
        cfg.finalize();
        cfg.finalize();
        assert!(cfg.is_finalized());
        assert_eq!(cfg.diagnostics().len(), 1);
    }
}
