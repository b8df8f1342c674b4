//! Payload types carried by [`crate::Action`] variants.

use std::time::Duration;

use input::Trigger;

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident = $raw:literal,)* }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u32)]
        pub enum $name {
            $($variant = $raw,)*
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)*];

            pub fn from_raw(raw: u32) -> Option<Self> {
                match raw {
                    $($raw => Some(Self::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

wire_enum! {
    pub enum Fullscreen {
        Native = 0,
        NonNative = 1,
        NonNativeVisibleMenu = 2,
        NonNativePaddedNotch = 3,
    }
}

wire_enum! {
    /// Window float-on-top request.
    pub enum FloatWindow {
        On = 0,
        Off = 1,
        Toggle = 2,
    }
}

wire_enum! {
    pub enum SecureInput {
        On = 0,
        Off = 1,
        Toggle = 2,
    }
}

wire_enum! {
    pub enum QuitTimer {
        Start = 0,
        Stop = 1,
    }
}

wire_enum! {
    pub enum Readonly {
        Off = 0,
        On = 1,
    }
}

wire_enum! {
    pub enum MouseVisibility {
        Visible = 0,
        Hidden = 1,
    }
}

wire_enum! {
    pub enum RendererHealth {
        Ok = 0,
        Unhealthy = 1,
    }
}

wire_enum! {
    pub enum OpenUrlKind {
        Unknown = 0,
        Text = 1,
        Html = 2,
    }
}

wire_enum! {
    pub enum ProgressState {
        Remove = 0,
        Set = 1,
        Error = 2,
        Indeterminate = 3,
        Pause = 4,
    }
}

wire_enum! {
    /// Pointer shape requested by the running program.
    pub enum MouseShape {
        Default = 0,
        ContextMenu = 1,
        Help = 2,
        Pointer = 3,
        Progress = 4,
        Wait = 5,
        Cell = 6,
        Crosshair = 7,
        Text = 8,
        VerticalText = 9,
        Alias = 10,
        Copy = 11,
        Move = 12,
        NoDrop = 13,
        NotAllowed = 14,
        Grab = 15,
        Grabbing = 16,
        AllScroll = 17,
        ColResize = 18,
        RowResize = 19,
        NResize = 20,
        EResize = 21,
        SResize = 22,
        WResize = 23,
        NeResize = 24,
        NwResize = 25,
        SeResize = 26,
        SwResize = 27,
        EwResize = 28,
        NsResize = 29,
        NeswResize = 30,
        NwseResize = 31,
        ZoomIn = 32,
        ZoomOut = 33,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResizeSplit {
    pub amount: u16,
    pub direction: input::ResizeDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SizeLimit {
    pub min_width: u32,
    pub min_height: u32,
    pub max_width: u32,
    pub max_height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Scrollbar {
    pub total: u64,
    pub offset: u64,
    pub len: u64,
}

/// Which color an OSC sequence changed. On the wire the named kinds are
/// negative and a palette entry is its index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorKind {
    Foreground,
    Background,
    Cursor,
    Palette(u8),
}

impl ColorKind {
    pub fn to_raw(self) -> i32 {
        match self {
            Self::Foreground => -1,
            Self::Background => -2,
            Self::Cursor => -3,
            Self::Palette(i) => i32::from(i),
        }
    }

    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            -1 => Some(Self::Foreground),
            -2 => Some(Self::Background),
            -3 => Some(Self::Cursor),
            i => u8::try_from(i).ok().map(Self::Palette),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorChange {
    pub kind: ColorKind,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Progress of a long-running command (OSC 9;4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgressReport {
    pub state: ProgressState,
    /// Percent complete, 0 to 100.
    pub progress: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandFinished {
    pub exit_code: Option<u8>,
    pub duration: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChildExited {
    pub exit_code: u32,
    /// How long the process ran.
    pub runtime: Duration,
}

/// A multi-key binding sequence started, advanced, or ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeySequence {
    Trigger(Trigger),
    End,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyTable {
    Activate(String),
    Deactivate,
    DeactivateAll,
}

impl KeyTable {
    pub fn tag(&self) -> u32 {
        match self {
            Self::Activate(_) => 0,
            Self::Deactivate => 1,
            Self::DeactivateAll => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DesktopNotification {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OpenUrl {
    pub kind: OpenUrlKind,
    pub url: String,
}
