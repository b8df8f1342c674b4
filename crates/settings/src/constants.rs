//! Centralized configuration constants for termbridge.
//!
//! Organized by the component that consumes them.

/// Config file validation limits.
pub mod settings {
    /// Maximum config file size in bytes (64 KB).
    /// Config files should be tiny; anything larger is suspicious.
    pub const MAX_FILE_SIZE: u64 = 64 * 1024;

    /// Maximum number of `keybind` entries accepted from one file.
    pub const MAX_KEYBINDS: usize = 1024;
}

/// Clipboard transport limits.
pub mod clipboard {
    /// Largest decoded OSC 52 payload forwarded to the host (1 MiB).
    pub const MAX_OSC52_BYTES: usize = 1024 * 1024;
}

/// Frame readback limits.
pub mod readback {
    /// Largest width or height copied by a readback.
    pub const MAX_DIMENSION: u32 = 16_384;

    /// Bytes per pixel of the packed output format.
    pub const BYTES_PER_PIXEL: u32 = 4;
}

/// Default keybindings, applied before any config file.
pub mod keybinds {
    #[cfg(target_os = "macos")]
    pub const DEFAULTS: &[&str] = &[
        "super+c=copy_to_clipboard",
        "super+v=paste_from_clipboard",
        "super+n=new_window",
        "super+t=new_tab",
        "super+w=close_surface",
        "super+shift+w=close_window",
        "super+alt+shift+w=close_all_windows",
        "super+q=quit",
        "super+d=new_split:right",
        "super+shift+d=new_split:down",
        "super+[=goto_split:previous",
        "super+]=goto_split:next",
        "super+shift+enter=toggle_split_zoom",
        "super+ctrl+equal=equalize_splits",
        "super+shift+[=previous_tab",
        "super+shift+]=next_tab",
        "super+1=goto_tab:1",
        "super+2=goto_tab:2",
        "super+3=goto_tab:3",
        "super+4=goto_tab:4",
        "super+5=goto_tab:5",
        "super+6=goto_tab:6",
        "super+7=goto_tab:7",
        "super+8=goto_tab:8",
        "super+9=last_tab",
        "super+comma=open_config",
        "super+shift+comma=reload_config",
        "super+ctrl+f=toggle_fullscreen",
        "super+shift+p=toggle_command_palette",
        "super+f=start_search",
        "super+z=undo",
        "super+shift+z=redo",
    ];

    #[cfg(not(target_os = "macos"))]
    pub const DEFAULTS: &[&str] = &[
        "ctrl+shift+c=copy_to_clipboard",
        "ctrl+shift+v=paste_from_clipboard",
        "shift+insert=paste_from_selection",
        "ctrl+shift+n=new_window",
        "ctrl+shift+t=new_tab",
        "ctrl+shift+w=close_tab",
        "ctrl+shift+q=quit",
        "ctrl+shift+o=new_split:right",
        "ctrl+shift+e=new_split:down",
        "ctrl+super+[=goto_split:previous",
        "ctrl+super+]=goto_split:next",
        "ctrl+shift+enter=toggle_split_zoom",
        "ctrl+page_up=previous_tab",
        "ctrl+page_down=next_tab",
        "alt+1=goto_tab:1",
        "alt+2=goto_tab:2",
        "alt+3=goto_tab:3",
        "alt+4=goto_tab:4",
        "alt+5=goto_tab:5",
        "alt+6=goto_tab:6",
        "alt+7=goto_tab:7",
        "alt+8=goto_tab:8",
        "alt+9=last_tab",
        "ctrl+comma=open_config",
        "ctrl+shift+comma=reload_config",
        "ctrl+enter=toggle_fullscreen",
        "ctrl+shift+p=toggle_command_palette",
        "ctrl+shift+f=start_search",
    ];
}
