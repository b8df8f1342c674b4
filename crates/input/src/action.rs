//! Named operations a binding can invoke.
//!
//! Written as `name` or `name:param` on the right-hand side of a keybind,
//! e.g. `new_split:right`, `goto_tab:3`, `text:\x15`.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum SplitDirection {
    Right = 0,
    Down = 1,
    Left = 2,
    Up = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum GotoSplit {
    Previous = 0,
    Next = 1,
    Up = 2,
    Left = 3,
    Down = 4,
    Right = 5,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ResizeDirection {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum GotoWindow {
    Previous = 0,
    Next = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CloseTabMode {
    This = 0,
    Other = 1,
    Right = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum InspectorMode {
    Toggle = 0,
    Show = 1,
    Hide = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum PromptTitle {
    Surface = 0,
    Tab = 1,
}

/// Tab to jump to. On the wire, the relative forms are negative and an
/// absolute tab is its zero-based index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GotoTab {
    Previous,
    Next,
    Last,
    Index(usize),
}

impl GotoTab {
    pub fn to_raw(self) -> isize {
        match self {
            Self::Previous => -1,
            Self::Next => -2,
            Self::Last => -3,
            Self::Index(i) => i as isize,
        }
    }

    pub fn from_raw(raw: isize) -> Option<Self> {
        match raw {
            -1 => Some(Self::Previous),
            -2 => Some(Self::Next),
            -3 => Some(Self::Last),
            i if i >= 0 => Some(Self::Index(i as usize)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BindingAction {
    /// Swallow the key and do nothing.
    Ignore,
    /// Remove an existing binding for the trigger. Never stored.
    Unbind,

    /// Send text to the terminal as if typed.
    Text(String),
    /// Send `ESC [` followed by the payload.
    Csi(String),
    /// Send `ESC` followed by the payload.
    Esc(String),

    CopyToClipboard,
    PasteFromClipboard,
    PasteFromSelection,
    CopyTitleToClipboard,

    NewWindow,
    NewTab,
    NewSplit(SplitDirection),
    GotoSplit(GotoSplit),
    ResizeSplit(ResizeDirection, u16),
    EqualizeSplits,
    ToggleSplitZoom,
    GotoTab(GotoTab),
    MoveTab(isize),
    GotoWindow(GotoWindow),
    CloseSurface,
    CloseTab(CloseTabMode),
    CloseWindow,
    CloseAllWindows,

    ToggleFullscreen,
    ToggleMaximize,
    ToggleTabOverview,
    ToggleWindowDecorations,
    ToggleQuickTerminal,
    ToggleCommandPalette,
    ToggleVisibility,
    ToggleBackgroundOpacity,
    ToggleSecureInput,
    ToggleWindowFloatOnTop,
    ToggleReadonly,
    Inspector(InspectorMode),
    ResetWindowSize,
    PromptTitle(PromptTitle),
    PresentTerminal,
    ShowOnScreenKeyboard,
    StartSearch,
    EndSearch,

    ReloadConfig,
    OpenConfig,
    Undo,
    Redo,
    CheckForUpdates,
    Quit,
}

impl BindingAction {
    /// Actions performed on the application even when a surface is focused.
    pub fn is_app_scoped(&self) -> bool {
        matches!(
            self,
            Self::Quit
                | Self::OpenConfig
                | Self::ReloadConfig
                | Self::CloseAllWindows
                | Self::ToggleQuickTerminal
                | Self::ToggleVisibility
                | Self::CheckForUpdates
                | Self::Undo
                | Self::Redo
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionParseError {
    #[error("unknown action {0:?}")]
    Unknown(String),
    #[error("action {0:?} requires a parameter")]
    MissingParam(String),
    #[error("invalid parameter {param:?} for action {action:?}")]
    InvalidParam { action: String, param: String },
    #[error("action {0:?} takes no parameter")]
    UnexpectedParam(String),
}

fn parse_enum<T: Copy>(
    action: &str,
    param: Option<&str>,
    options: &[(&str, T)],
) -> Result<T, ActionParseError> {
    let param = param.ok_or_else(|| ActionParseError::MissingParam(action.to_string()))?;
    options
        .iter()
        .find(|(name, _)| *name == param)
        .map(|(_, value)| *value)
        .ok_or_else(|| ActionParseError::InvalidParam {
            action: action.to_string(),
            param: param.to_string(),
        })
}

fn invalid(action: &str, param: &str) -> ActionParseError {
    ActionParseError::InvalidParam {
        action: action.to_string(),
        param: param.to_string(),
    }
}

const SPLIT_DIRECTIONS: &[(&str, SplitDirection)] = &[
    ("right", SplitDirection::Right),
    ("down", SplitDirection::Down),
    ("left", SplitDirection::Left),
    ("up", SplitDirection::Up),
];

const GOTO_SPLITS: &[(&str, GotoSplit)] = &[
    ("previous", GotoSplit::Previous),
    ("next", GotoSplit::Next),
    ("up", GotoSplit::Up),
    ("left", GotoSplit::Left),
    ("down", GotoSplit::Down),
    ("right", GotoSplit::Right),
];

const RESIZE_DIRECTIONS: &[(&str, ResizeDirection)] = &[
    ("up", ResizeDirection::Up),
    ("down", ResizeDirection::Down),
    ("left", ResizeDirection::Left),
    ("right", ResizeDirection::Right),
];

const GOTO_WINDOWS: &[(&str, GotoWindow)] = &[
    ("previous", GotoWindow::Previous),
    ("next", GotoWindow::Next),
];

const CLOSE_TAB_MODES: &[(&str, CloseTabMode)] = &[
    ("this", CloseTabMode::This),
    ("other", CloseTabMode::Other),
    ("right", CloseTabMode::Right),
];

const INSPECTOR_MODES: &[(&str, InspectorMode)] = &[
    ("toggle", InspectorMode::Toggle),
    ("show", InspectorMode::Show),
    ("hide", InspectorMode::Hide),
];

macro_rules! impl_from_raw {
    ($($ty:ident => $table:ident,)*) => {$(
        impl $ty {
            /// Decode a wire value.
            pub fn from_raw(raw: u32) -> Option<Self> {
                $table.iter().map(|(_, v)| *v).find(|v| *v as u32 == raw)
            }
        }
    )*};
}

impl_from_raw! {
    SplitDirection => SPLIT_DIRECTIONS,
    GotoSplit => GOTO_SPLITS,
    ResizeDirection => RESIZE_DIRECTIONS,
    GotoWindow => GOTO_WINDOWS,
    CloseTabMode => CLOSE_TAB_MODES,
    InspectorMode => INSPECTOR_MODES,
}

impl PromptTitle {
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Surface),
            1 => Some(Self::Tab),
            _ => None,
        }
    }
}

fn name_of<T: PartialEq>(options: &[(&'static str, T)], value: &T) -> &'static str {
    options
        .iter()
        .find(|(_, v)| v == value)
        .map(|(name, _)| *name)
        .unwrap_or("?")
}

/// Decode the escapes accepted in `text:` and friends: `\n`, `\r`, `\t`,
/// `\e`, `\\` and `\xHH`.
fn unescape(action: &str, raw: &str) -> Result<String, ActionParseError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('e') => out.push('\x1b'),
            Some('\\') => out.push('\\'),
            Some('x') => {
                let hex: String = chars.by_ref().take(2).collect();
                let byte = u8::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|b| b.is_ascii())
                    .ok_or_else(|| invalid(action, raw))?;
                out.push(byte as char);
            }
            _ => return Err(invalid(action, raw)),
        }
    }
    Ok(out)
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x1b' => out.push_str("\\e"),
            '\\' => out.push_str("\\\\"),
            c if c.is_ascii_control() => out.push_str(&format!("\\x{:02x}", c as u8)),
            c => out.push(c),
        }
    }
    out
}

impl FromStr for BindingAction {
    type Err = ActionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (name, param) = match s.split_once(':') {
            Some((name, param)) => (name, Some(param)),
            None => (s, None),
        };

        let action = match name {
            "text" | "csi" | "esc" => {
                let raw = param.ok_or_else(|| ActionParseError::MissingParam(name.to_string()))?;
                let text = unescape(name, raw)?;
                return Ok(match name {
                    "text" => Self::Text(text),
                    "csi" => Self::Csi(text),
                    _ => Self::Esc(text),
                });
            }
            "new_split" => {
                return parse_enum(name, param, SPLIT_DIRECTIONS).map(Self::NewSplit);
            }
            "goto_split" => {
                return parse_enum(name, param, GOTO_SPLITS).map(Self::GotoSplit);
            }
            "goto_window" => {
                return parse_enum(name, param, GOTO_WINDOWS).map(Self::GotoWindow);
            }
            "inspector" => {
                return parse_enum(name, param, INSPECTOR_MODES).map(Self::Inspector);
            }
            "close_tab" => {
                return match param {
                    None => Ok(Self::CloseTab(CloseTabMode::This)),
                    Some(_) => parse_enum(name, param, CLOSE_TAB_MODES).map(Self::CloseTab),
                };
            }
            "resize_split" => {
                let raw = param.ok_or_else(|| ActionParseError::MissingParam(name.to_string()))?;
                let (direction, amount) = raw.split_once(',').ok_or_else(|| invalid(name, raw))?;
                let direction = parse_enum(name, Some(direction), RESIZE_DIRECTIONS)?;
                let amount = amount.parse().map_err(|_| invalid(name, raw))?;
                return Ok(Self::ResizeSplit(direction, amount));
            }
            "goto_tab" => {
                let raw = param.ok_or_else(|| ActionParseError::MissingParam(name.to_string()))?;
                // One-based in config, zero-based on the wire.
                let n: usize = raw.parse().map_err(|_| invalid(name, raw))?;
                let index = n.checked_sub(1).ok_or_else(|| invalid(name, raw))?;
                return Ok(Self::GotoTab(GotoTab::Index(index)));
            }
            "move_tab" => {
                let raw = param.ok_or_else(|| ActionParseError::MissingParam(name.to_string()))?;
                let amount = raw.parse().map_err(|_| invalid(name, raw))?;
                return Ok(Self::MoveTab(amount));
            }
            "ignore" => Self::Ignore,
            "unbind" => Self::Unbind,
            "copy_to_clipboard" => Self::CopyToClipboard,
            "paste_from_clipboard" => Self::PasteFromClipboard,
            "paste_from_selection" => Self::PasteFromSelection,
            "copy_title_to_clipboard" => Self::CopyTitleToClipboard,
            "new_window" => Self::NewWindow,
            "new_tab" => Self::NewTab,
            "previous_tab" => Self::GotoTab(GotoTab::Previous),
            "next_tab" => Self::GotoTab(GotoTab::Next),
            "last_tab" => Self::GotoTab(GotoTab::Last),
            "equalize_splits" => Self::EqualizeSplits,
            "toggle_split_zoom" => Self::ToggleSplitZoom,
            "close_surface" => Self::CloseSurface,
            "close_window" => Self::CloseWindow,
            "close_all_windows" => Self::CloseAllWindows,
            "toggle_fullscreen" => Self::ToggleFullscreen,
            "toggle_maximize" => Self::ToggleMaximize,
            "toggle_tab_overview" => Self::ToggleTabOverview,
            "toggle_window_decorations" => Self::ToggleWindowDecorations,
            "toggle_quick_terminal" => Self::ToggleQuickTerminal,
            "toggle_command_palette" => Self::ToggleCommandPalette,
            "toggle_visibility" => Self::ToggleVisibility,
            "toggle_background_opacity" => Self::ToggleBackgroundOpacity,
            "toggle_secure_input" => Self::ToggleSecureInput,
            "toggle_window_float_on_top" => Self::ToggleWindowFloatOnTop,
            "toggle_readonly" => Self::ToggleReadonly,
            "reset_window_size" => Self::ResetWindowSize,
            "prompt_surface_title" => Self::PromptTitle(PromptTitle::Surface),
            "prompt_tab_title" => Self::PromptTitle(PromptTitle::Tab),
            "present_terminal" => Self::PresentTerminal,
            "show_on_screen_keyboard" => Self::ShowOnScreenKeyboard,
            "start_search" => Self::StartSearch,
            "end_search" => Self::EndSearch,
            "reload_config" => Self::ReloadConfig,
            "open_config" => Self::OpenConfig,
            "undo" => Self::Undo,
            "redo" => Self::Redo,
            "check_for_updates" => Self::CheckForUpdates,
            "quit" => Self::Quit,
            other => return Err(ActionParseError::Unknown(other.to_string())),
        };

        match param {
            Some(_) => Err(ActionParseError::UnexpectedParam(name.to_string())),
            None => Ok(action),
        }
    }
}

impl fmt::Display for BindingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ignore => f.write_str("ignore"),
            Self::Unbind => f.write_str("unbind"),
            Self::Text(text) => write!(f, "text:{}", escape(text)),
            Self::Csi(text) => write!(f, "csi:{}", escape(text)),
            Self::Esc(text) => write!(f, "esc:{}", escape(text)),
            Self::CopyToClipboard => f.write_str("copy_to_clipboard"),
            Self::PasteFromClipboard => f.write_str("paste_from_clipboard"),
            Self::PasteFromSelection => f.write_str("paste_from_selection"),
            Self::CopyTitleToClipboard => f.write_str("copy_title_to_clipboard"),
            Self::NewWindow => f.write_str("new_window"),
            Self::NewTab => f.write_str("new_tab"),
            Self::NewSplit(d) => write!(f, "new_split:{}", name_of(SPLIT_DIRECTIONS, d)),
            Self::GotoSplit(g) => write!(f, "goto_split:{}", name_of(GOTO_SPLITS, g)),
            Self::ResizeSplit(d, amount) => {
                write!(f, "resize_split:{},{amount}", name_of(RESIZE_DIRECTIONS, d))
            }
            Self::EqualizeSplits => f.write_str("equalize_splits"),
            Self::ToggleSplitZoom => f.write_str("toggle_split_zoom"),
            Self::GotoTab(GotoTab::Previous) => f.write_str("previous_tab"),
            Self::GotoTab(GotoTab::Next) => f.write_str("next_tab"),
            Self::GotoTab(GotoTab::Last) => f.write_str("last_tab"),
            Self::GotoTab(GotoTab::Index(i)) => write!(f, "goto_tab:{}", i + 1),
            Self::MoveTab(amount) => write!(f, "move_tab:{amount}"),
            Self::GotoWindow(g) => write!(f, "goto_window:{}", name_of(GOTO_WINDOWS, g)),
            Self::CloseSurface => f.write_str("close_surface"),
            Self::CloseTab(mode) => write!(f, "close_tab:{}", name_of(CLOSE_TAB_MODES, mode)),
            Self::CloseWindow => f.write_str("close_window"),
            Self::CloseAllWindows => f.write_str("close_all_windows"),
            Self::ToggleFullscreen => f.write_str("toggle_fullscreen"),
            Self::ToggleMaximize => f.write_str("toggle_maximize"),
            Self::ToggleTabOverview => f.write_str("toggle_tab_overview"),
            Self::ToggleWindowDecorations => f.write_str("toggle_window_decorations"),
            Self::ToggleQuickTerminal => f.write_str("toggle_quick_terminal"),
            Self::ToggleCommandPalette => f.write_str("toggle_command_palette"),
            Self::ToggleVisibility => f.write_str("toggle_visibility"),
            Self::ToggleBackgroundOpacity => f.write_str("toggle_background_opacity"),
            Self::ToggleSecureInput => f.write_str("toggle_secure_input"),
            Self::ToggleWindowFloatOnTop => f.write_str("toggle_window_float_on_top"),
            Self::ToggleReadonly => f.write_str("toggle_readonly"),
            Self::Inspector(mode) => write!(f, "inspector:{}", name_of(INSPECTOR_MODES, mode)),
            Self::ResetWindowSize => f.write_str("reset_window_size"),
            Self::PromptTitle(PromptTitle::Surface) => f.write_str("prompt_surface_title"),
            Self::PromptTitle(PromptTitle::Tab) => f.write_str("prompt_tab_title"),
            Self::PresentTerminal => f.write_str("present_terminal"),
            Self::ShowOnScreenKeyboard => f.write_str("show_on_screen_keyboard"),
            Self::StartSearch => f.write_str("start_search"),
            Self::EndSearch => f.write_str("end_search"),
            Self::ReloadConfig => f.write_str("reload_config"),
            Self::OpenConfig => f.write_str("open_config"),
            Self::Undo => f.write_str("undo"),
            Self::Redo => f.write_str("redo"),
            Self::CheckForUpdates => f.write_str("check_for_updates"),
            Self::Quit => f.write_str("quit"),
        }
    }
}
