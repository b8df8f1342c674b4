use actions::{
    Action, ChildExited, ColorChange, CommandFinished, DesktopNotification, MouseShape,
    MouseVisibility, OpenUrl, ProgressReport, RendererHealth, Scrollbar, Size,
};
use clipboard::ClipboardKind;

/// Something the terminal emulator reports about a surface. May be produced
/// on any thread and delivered through the mailbox.
#[derive(Debug, Clone, PartialEq)]
pub enum TerminalEvent {
    Bell,
    Title(String),
    Pwd(String),
    Notification { title: String, body: String },
    MouseShape(MouseShape),
    MouseVisibility(MouseVisibility),
    MouseOverLink(Option<String>),
    Progress(ProgressReport),
    CommandFinished(CommandFinished),
    ChildExited(ChildExited),
    ColorChange(ColorChange),
    CellSize(Size),
    Scrollbar(Scrollbar),
    RendererHealth(RendererHealth),
    OpenUrl(OpenUrl),
    /// A frame is ready to present.
    Render,
    /// OSC 52 query.
    Osc52Read { clipboard: ClipboardKind },
    /// OSC 52 set, payload still base64-encoded.
    Osc52Write { clipboard: ClipboardKind, payload: String },
    SelectionChanged,
}

impl TerminalEvent {
    /// The action that reports this event to the host. Clipboard and
    /// selection events are handled by the engine and have none.
    pub fn into_action(self) -> Option<Action> {
        let action = match self {
            Self::Bell => Action::RingBell,
            Self::Title(title) => Action::SetTitle(title),
            Self::Pwd(pwd) => Action::Pwd(pwd),
            Self::Notification { title, body } => {
                Action::DesktopNotification(DesktopNotification { title, body })
            }
            Self::MouseShape(shape) => Action::MouseShape(shape),
            Self::MouseVisibility(visibility) => Action::MouseVisibility(visibility),
            Self::MouseOverLink(link) => Action::MouseOverLink(link),
            Self::Progress(report) => Action::ProgressReport(report),
            Self::CommandFinished(finished) => Action::CommandFinished(finished),
            Self::ChildExited(exited) => Action::ShowChildExited(exited),
            Self::ColorChange(change) => Action::ColorChange(change),
            Self::CellSize(size) => Action::CellSize(size),
            Self::Scrollbar(scrollbar) => Action::Scrollbar(scrollbar),
            Self::RendererHealth(health) => Action::RendererHealth(health),
            Self::OpenUrl(url) => Action::OpenUrl(url),
            Self::Render => Action::Render,
            Self::Osc52Read { .. } | Self::Osc52Write { .. } | Self::SelectionChanged => {
                return None
            }
        };
        Some(action)
    }
}
