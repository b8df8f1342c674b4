//! Action tags and their wire values.

use std::fmt;

macro_rules! action_tags {
    ($($variant:ident => $name:literal,)*) => {
        /// Discriminant of an [`crate::Action`].
        ///
        /// Declaration order is the wire order; new tags are only appended.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u32)]
        pub enum ActionTag {
            $($variant,)*
        }

        impl ActionTag {
            /// Every tag in wire order.
            pub const ALL: &'static [ActionTag] = &[$(ActionTag::$variant,)*];

            pub fn name(self) -> &'static str {
                match self {
                    $(ActionTag::$variant => $name,)*
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(ActionTag::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

action_tags! {
    Quit => "quit",
    NewWindow => "new_window",
    NewTab => "new_tab",
    CloseTab => "close_tab",
    NewSplit => "new_split",
    CloseAllWindows => "close_all_windows",
    ToggleMaximize => "toggle_maximize",
    ToggleFullscreen => "toggle_fullscreen",
    ToggleTabOverview => "toggle_tab_overview",
    ToggleWindowDecorations => "toggle_window_decorations",
    ToggleQuickTerminal => "toggle_quick_terminal",
    ToggleCommandPalette => "toggle_command_palette",
    ToggleVisibility => "toggle_visibility",
    ToggleBackgroundOpacity => "toggle_background_opacity",
    MoveTab => "move_tab",
    GotoTab => "goto_tab",
    GotoSplit => "goto_split",
    GotoWindow => "goto_window",
    ResizeSplit => "resize_split",
    EqualizeSplits => "equalize_splits",
    ToggleSplitZoom => "toggle_split_zoom",
    PresentTerminal => "present_terminal",
    SizeLimit => "size_limit",
    ResetWindowSize => "reset_window_size",
    InitialSize => "initial_size",
    CellSize => "cell_size",
    Scrollbar => "scrollbar",
    Render => "render",
    Inspector => "inspector",
    ShowGtkInspector => "show_gtk_inspector",
    RenderInspector => "render_inspector",
    DesktopNotification => "desktop_notification",
    SetTitle => "set_title",
    PromptTitle => "prompt_title",
    Pwd => "pwd",
    MouseShape => "mouse_shape",
    MouseVisibility => "mouse_visibility",
    MouseOverLink => "mouse_over_link",
    RendererHealth => "renderer_health",
    OpenConfig => "open_config",
    QuitTimer => "quit_timer",
    FloatWindow => "float_window",
    SecureInput => "secure_input",
    KeySequence => "key_sequence",
    KeyTable => "key_table",
    ColorChange => "color_change",
    ReloadConfig => "reload_config",
    ConfigChange => "config_change",
    CloseWindow => "close_window",
    RingBell => "ring_bell",
    Undo => "undo",
    Redo => "redo",
    CheckForUpdates => "check_for_updates",
    OpenUrl => "open_url",
    ShowChildExited => "show_child_exited",
    ProgressReport => "progress_report",
    ShowOnScreenKeyboard => "show_on_screen_keyboard",
    CommandFinished => "command_finished",
    StartSearch => "start_search",
    EndSearch => "end_search",
    SearchTotal => "search_total",
    SearchSelected => "search_selected",
    Readonly => "readonly",
    CopyTitleToClipboard => "copy_title_to_clipboard",
}

impl ActionTag {
    pub fn to_raw(self) -> u32 {
        self as u32
    }

    /// Decode a wire value. Tags from a newer engine map to `None` and are
    /// ignored by the caller.
    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }
}

impl fmt::Display for ActionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
