//! The engine's outbound action envelope.
//!
//! Every state change the host has to react to is one [`Action`] paired with
//! one [`Target`]. The variant decides the payload; [`ActionTag`] is the
//! stable wire discriminant derived from it.

mod payload;
mod tag;
mod target;

use std::sync::Arc;

pub use input::{
    CloseTabMode, GotoSplit, GotoTab, GotoWindow, InspectorMode, PromptTitle, ResizeDirection,
    SplitDirection,
};
use input::BindingAction;
pub use payload::*;
pub use tag::ActionTag;
pub use target::{SurfaceId, Target};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    NewWindow,
    NewTab,
    CloseTab(CloseTabMode),
    NewSplit(SplitDirection),
    CloseAllWindows,
    ToggleMaximize,
    ToggleFullscreen(Fullscreen),
    ToggleTabOverview,
    ToggleWindowDecorations,
    ToggleQuickTerminal,
    ToggleCommandPalette,
    ToggleVisibility,
    ToggleBackgroundOpacity,
    MoveTab(isize),
    GotoTab(GotoTab),
    GotoSplit(GotoSplit),
    GotoWindow(GotoWindow),
    ResizeSplit(ResizeSplit),
    EqualizeSplits,
    ToggleSplitZoom,
    PresentTerminal,
    SizeLimit(SizeLimit),
    ResetWindowSize,
    InitialSize(Size),
    CellSize(Size),
    Scrollbar(Scrollbar),
    /// The surface has a new frame to present.
    Render,
    Inspector(InspectorMode),
    ShowGtkInspector,
    RenderInspector,
    DesktopNotification(DesktopNotification),
    SetTitle(String),
    PromptTitle(PromptTitle),
    Pwd(String),
    MouseShape(MouseShape),
    MouseVisibility(MouseVisibility),
    /// Hovered link, or `None` when the pointer left it.
    MouseOverLink(Option<String>),
    RendererHealth(RendererHealth),
    OpenConfig,
    QuitTimer(QuitTimer),
    FloatWindow(FloatWindow),
    SecureInput(SecureInput),
    KeySequence(KeySequence),
    KeyTable(KeyTable),
    ColorChange(ColorChange),
    /// `soft` reloads only the in-memory config without rereading files.
    ReloadConfig { soft: bool },
    ConfigChange(Arc<settings::Config>),
    CloseWindow,
    RingBell,
    Undo,
    Redo,
    CheckForUpdates,
    OpenUrl(OpenUrl),
    ShowChildExited(ChildExited),
    ProgressReport(ProgressReport),
    ShowOnScreenKeyboard,
    CommandFinished(CommandFinished),
    StartSearch(String),
    EndSearch,
    /// Total matches, `None` while unknown.
    SearchTotal(Option<usize>),
    /// Selected match, `None` when nothing is selected.
    SearchSelected(Option<usize>),
    Readonly(Readonly),
    CopyTitleToClipboard,
}

impl Action {
    pub fn tag(&self) -> ActionTag {
        match self {
            Self::Quit => ActionTag::Quit,
            Self::NewWindow => ActionTag::NewWindow,
            Self::NewTab => ActionTag::NewTab,
            Self::CloseTab(_) => ActionTag::CloseTab,
            Self::NewSplit(_) => ActionTag::NewSplit,
            Self::CloseAllWindows => ActionTag::CloseAllWindows,
            Self::ToggleMaximize => ActionTag::ToggleMaximize,
            Self::ToggleFullscreen(_) => ActionTag::ToggleFullscreen,
            Self::ToggleTabOverview => ActionTag::ToggleTabOverview,
            Self::ToggleWindowDecorations => ActionTag::ToggleWindowDecorations,
            Self::ToggleQuickTerminal => ActionTag::ToggleQuickTerminal,
            Self::ToggleCommandPalette => ActionTag::ToggleCommandPalette,
            Self::ToggleVisibility => ActionTag::ToggleVisibility,
            Self::ToggleBackgroundOpacity => ActionTag::ToggleBackgroundOpacity,
            Self::MoveTab(_) => ActionTag::MoveTab,
            Self::GotoTab(_) => ActionTag::GotoTab,
            Self::GotoSplit(_) => ActionTag::GotoSplit,
            Self::GotoWindow(_) => ActionTag::GotoWindow,
            Self::ResizeSplit(_) => ActionTag::ResizeSplit,
            Self::EqualizeSplits => ActionTag::EqualizeSplits,
            Self::ToggleSplitZoom => ActionTag::ToggleSplitZoom,
            Self::PresentTerminal => ActionTag::PresentTerminal,
            Self::SizeLimit(_) => ActionTag::SizeLimit,
            Self::ResetWindowSize => ActionTag::ResetWindowSize,
            Self::InitialSize(_) => ActionTag::InitialSize,
            Self::CellSize(_) => ActionTag::CellSize,
            Self::Scrollbar(_) => ActionTag::Scrollbar,
            Self::Render => ActionTag::Render,
            Self::Inspector(_) => ActionTag::Inspector,
            Self::ShowGtkInspector => ActionTag::ShowGtkInspector,
            Self::RenderInspector => ActionTag::RenderInspector,
            Self::DesktopNotification(_) => ActionTag::DesktopNotification,
            Self::SetTitle(_) => ActionTag::SetTitle,
            Self::PromptTitle(_) => ActionTag::PromptTitle,
            Self::Pwd(_) => ActionTag::Pwd,
            Self::MouseShape(_) => ActionTag::MouseShape,
            Self::MouseVisibility(_) => ActionTag::MouseVisibility,
            Self::MouseOverLink(_) => ActionTag::MouseOverLink,
            Self::RendererHealth(_) => ActionTag::RendererHealth,
            Self::OpenConfig => ActionTag::OpenConfig,
            Self::QuitTimer(_) => ActionTag::QuitTimer,
            Self::FloatWindow(_) => ActionTag::FloatWindow,
            Self::SecureInput(_) => ActionTag::SecureInput,
            Self::KeySequence(_) => ActionTag::KeySequence,
            Self::KeyTable(_) => ActionTag::KeyTable,
            Self::ColorChange(_) => ActionTag::ColorChange,
            Self::ReloadConfig { .. } => ActionTag::ReloadConfig,
            Self::ConfigChange(_) => ActionTag::ConfigChange,
            Self::CloseWindow => ActionTag::CloseWindow,
            Self::RingBell => ActionTag::RingBell,
            Self::Undo => ActionTag::Undo,
            Self::Redo => ActionTag::Redo,
            Self::CheckForUpdates => ActionTag::CheckForUpdates,
            Self::OpenUrl(_) => ActionTag::OpenUrl,
            Self::ShowChildExited(_) => ActionTag::ShowChildExited,
            Self::ProgressReport(_) => ActionTag::ProgressReport,
            Self::ShowOnScreenKeyboard => ActionTag::ShowOnScreenKeyboard,
            Self::CommandFinished(_) => ActionTag::CommandFinished,
            Self::StartSearch(_) => ActionTag::StartSearch,
            Self::EndSearch => ActionTag::EndSearch,
            Self::SearchTotal(_) => ActionTag::SearchTotal,
            Self::SearchSelected(_) => ActionTag::SearchSelected,
            Self::Readonly(_) => ActionTag::Readonly,
            Self::CopyTitleToClipboard => ActionTag::CopyTitleToClipboard,
        }
    }

    /// The host action a binding turns into, if the host performs it.
    ///
    /// Bindings the engine handles itself (text input, clipboard, readonly
    /// toggling, closing a surface) return `None`.
    pub fn from_binding(binding: &BindingAction) -> Option<Action> {
        let action = match binding {
            BindingAction::Ignore
            | BindingAction::Unbind
            | BindingAction::Text(_)
            | BindingAction::Csi(_)
            | BindingAction::Esc(_)
            | BindingAction::CopyToClipboard
            | BindingAction::PasteFromClipboard
            | BindingAction::PasteFromSelection
            | BindingAction::CloseSurface
            | BindingAction::ToggleReadonly => return None,

            BindingAction::CopyTitleToClipboard => Action::CopyTitleToClipboard,
            BindingAction::NewWindow => Action::NewWindow,
            BindingAction::NewTab => Action::NewTab,
            BindingAction::NewSplit(direction) => Action::NewSplit(*direction),
            BindingAction::GotoSplit(goto) => Action::GotoSplit(*goto),
            BindingAction::ResizeSplit(direction, amount) => Action::ResizeSplit(ResizeSplit {
                amount: *amount,
                direction: *direction,
            }),
            BindingAction::EqualizeSplits => Action::EqualizeSplits,
            BindingAction::ToggleSplitZoom => Action::ToggleSplitZoom,
            BindingAction::GotoTab(tab) => Action::GotoTab(*tab),
            BindingAction::MoveTab(amount) => Action::MoveTab(*amount),
            BindingAction::GotoWindow(goto) => Action::GotoWindow(*goto),
            BindingAction::CloseTab(mode) => Action::CloseTab(*mode),
            BindingAction::CloseWindow => Action::CloseWindow,
            BindingAction::CloseAllWindows => Action::CloseAllWindows,
            BindingAction::ToggleFullscreen => Action::ToggleFullscreen(Fullscreen::Native),
            BindingAction::ToggleMaximize => Action::ToggleMaximize,
            BindingAction::ToggleTabOverview => Action::ToggleTabOverview,
            BindingAction::ToggleWindowDecorations => Action::ToggleWindowDecorations,
            BindingAction::ToggleQuickTerminal => Action::ToggleQuickTerminal,
            BindingAction::ToggleCommandPalette => Action::ToggleCommandPalette,
            BindingAction::ToggleVisibility => Action::ToggleVisibility,
            BindingAction::ToggleBackgroundOpacity => Action::ToggleBackgroundOpacity,
            BindingAction::ToggleSecureInput => Action::SecureInput(SecureInput::Toggle),
            BindingAction::ToggleWindowFloatOnTop => Action::FloatWindow(FloatWindow::Toggle),
            BindingAction::Inspector(mode) => Action::Inspector(*mode),
            BindingAction::ResetWindowSize => Action::ResetWindowSize,
            BindingAction::PromptTitle(which) => Action::PromptTitle(*which),
            BindingAction::PresentTerminal => Action::PresentTerminal,
            BindingAction::ShowOnScreenKeyboard => Action::ShowOnScreenKeyboard,
            BindingAction::StartSearch => Action::StartSearch(String::new()),
            BindingAction::EndSearch => Action::EndSearch,
            BindingAction::ReloadConfig => Action::ReloadConfig { soft: false },
            BindingAction::OpenConfig => Action::OpenConfig,
            BindingAction::Undo => Action::Undo,
            BindingAction::Redo => Action::Redo,
            BindingAction::CheckForUpdates => Action::CheckForUpdates,
            BindingAction::Quit => Action::Quit,
        };
        Some(action)
    }
}
