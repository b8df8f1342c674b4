//! The action record: a `u32` tag and a union of payloads.
//!
//! Only the union member named by the tag is ever written or read. Strings
//! inside a record borrow from the [`EncodedAction`] that built it and are
//! valid for the duration of the action callback only.

use std::ffi::{c_char, CString};
use std::ptr;
use std::sync::Arc;
use std::time::Duration;

use actions::{
    Action, ActionTag, ChildExited, CloseTabMode, ColorChange, ColorKind, CommandFinished,
    DesktopNotification, FloatWindow, Fullscreen, GotoSplit, GotoTab, GotoWindow, InspectorMode,
    KeySequence, KeyTable, MouseShape, MouseVisibility, OpenUrl, OpenUrlKind, ProgressReport,
    ProgressState, PromptTitle, QuitTimer, Readonly, RendererHealth, ResizeDirection, ResizeSplit,
    Scrollbar, SecureInput, Size, SizeLimit, SplitDirection,
};
use settings::Config;

use crate::records::{c_string, read_cstr, read_str, TbTrigger};

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TbMoveTab {
    pub amount: isize,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TbResizeSplit {
    pub amount: u16,
    pub direction: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TbSizeLimit {
    pub min_width: u32,
    pub min_height: u32,
    pub max_width: u32,
    pub max_height: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TbActionSize {
    pub width: u32,
    pub height: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TbScrollbar {
    pub total: u64,
    pub offset: u64,
    pub len: u64,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TbDesktopNotification {
    pub title: *const c_char,
    pub body: *const c_char,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TbSetTitle {
    pub title: *const c_char,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TbPwd {
    pub pwd: *const c_char,
}

/// `url` is null when the pointer left the link.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TbMouseOverLink {
    pub url: *const c_char,
    pub len: usize,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TbKeySequence {
    pub active: bool,
    pub trigger: TbTrigger,
}

pub const KEY_TABLE_ACTIVATE: u32 = 0;
pub const KEY_TABLE_DEACTIVATE: u32 = 1;
pub const KEY_TABLE_DEACTIVATE_ALL: u32 = 2;

/// `name` is only set for the activate tag.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TbKeyTable {
    pub tag: u32,
    pub name: *const c_char,
    pub len: usize,
}

/// `kind` is -1 foreground, -2 background, -3 cursor, or a palette index.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TbColorChange {
    pub kind: i32,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TbReloadConfig {
    pub soft: bool,
}

/// Borrowed for the callback; clone it with `termbridge_config_clone` to
/// keep it.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TbConfigChange {
    pub config: *const Config,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TbOpenUrl {
    pub kind: u32,
    pub url: *const c_char,
    pub len: usize,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TbChildExited {
    pub exit_code: u32,
    pub runtime_ms: u64,
}

/// `progress` is -1 when no percentage was reported.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TbProgressReport {
    pub state: u32,
    pub progress: i8,
}

/// `exit_code` is -1 when unknown; `duration` is in nanoseconds.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TbCommandFinished {
    pub exit_code: i16,
    pub duration: u64,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TbStartSearch {
    pub needle: *const c_char,
}

/// Payloads of [`TbAction`]. Tags without a payload leave it zeroed.
#[repr(C)]
#[derive(Clone, Copy)]
pub union TbActionPayload {
    pub new_split: u32,
    pub toggle_fullscreen: u32,
    pub move_tab: TbMoveTab,
    pub goto_tab: isize,
    pub goto_split: u32,
    pub goto_window: u32,
    pub resize_split: TbResizeSplit,
    pub size_limit: TbSizeLimit,
    pub initial_size: TbActionSize,
    pub cell_size: TbActionSize,
    pub scrollbar: TbScrollbar,
    pub inspector: u32,
    pub desktop_notification: TbDesktopNotification,
    pub set_title: TbSetTitle,
    pub prompt_title: u32,
    pub pwd: TbPwd,
    pub mouse_shape: u32,
    pub mouse_visibility: u32,
    pub mouse_over_link: TbMouseOverLink,
    pub renderer_health: u32,
    pub quit_timer: u32,
    pub float_window: u32,
    pub secure_input: u32,
    pub key_sequence: TbKeySequence,
    pub key_table: TbKeyTable,
    pub color_change: TbColorChange,
    pub reload_config: TbReloadConfig,
    pub config_change: TbConfigChange,
    pub open_url: TbOpenUrl,
    pub close_tab_mode: u32,
    pub child_exited: TbChildExited,
    pub progress_report: TbProgressReport,
    pub command_finished: TbCommandFinished,
    pub start_search: TbStartSearch,
    pub search_total: isize,
    pub search_selected: isize,
    pub readonly: u32,
    zeroed: [u64; 4],
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct TbAction {
    pub tag: u32,
    pub action: TbActionPayload,
}

impl std::fmt::Debug for TbAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = ActionTag::from_raw(self.tag).map_or("unknown", ActionTag::name);
        f.debug_struct("TbAction")
            .field("tag", &self.tag)
            .field("name", &name)
            .finish_non_exhaustive()
    }
}

/// An action record together with the strings it points into.
pub struct EncodedAction {
    record: TbAction,
    strings: Vec<CString>,
}

impl EncodedAction {
    pub fn new(action: &Action) -> Self {
        let mut encoded = Self {
            record: TbAction {
                tag: action.tag().to_raw(),
                action: TbActionPayload { zeroed: [0; 4] },
            },
            strings: Vec::new(),
        };
        encoded.record.action = encoded.payload(action);
        encoded
    }

    /// The record. Valid while `self` is alive.
    pub fn record(&self) -> TbAction {
        self.record
    }

    fn string(&mut self, text: &str) -> *const c_char {
        let text = c_string(text);
        let ptr = text.as_ptr();
        self.strings.push(text);
        ptr
    }

    fn payload(&mut self, action: &Action) -> TbActionPayload {
        use TbActionPayload as P;

        match action {
            Action::Quit
            | Action::NewWindow
            | Action::NewTab
            | Action::CloseAllWindows
            | Action::ToggleMaximize
            | Action::ToggleTabOverview
            | Action::ToggleWindowDecorations
            | Action::ToggleQuickTerminal
            | Action::ToggleCommandPalette
            | Action::ToggleVisibility
            | Action::ToggleBackgroundOpacity
            | Action::EqualizeSplits
            | Action::ToggleSplitZoom
            | Action::PresentTerminal
            | Action::ResetWindowSize
            | Action::Render
            | Action::ShowGtkInspector
            | Action::RenderInspector
            | Action::OpenConfig
            | Action::CloseWindow
            | Action::RingBell
            | Action::Undo
            | Action::Redo
            | Action::CheckForUpdates
            | Action::ShowOnScreenKeyboard
            | Action::EndSearch
            | Action::CopyTitleToClipboard => P { zeroed: [0; 4] },

            Action::CloseTab(mode) => P {
                close_tab_mode: *mode as u32,
            },
            Action::NewSplit(direction) => P {
                new_split: *direction as u32,
            },
            Action::ToggleFullscreen(mode) => P {
                toggle_fullscreen: *mode as u32,
            },
            Action::MoveTab(amount) => P {
                move_tab: TbMoveTab { amount: *amount },
            },
            Action::GotoTab(tab) => P {
                goto_tab: tab.to_raw(),
            },
            Action::GotoSplit(goto) => P {
                goto_split: *goto as u32,
            },
            Action::GotoWindow(goto) => P {
                goto_window: *goto as u32,
            },
            Action::ResizeSplit(resize) => P {
                resize_split: TbResizeSplit {
                    amount: resize.amount,
                    direction: resize.direction as u32,
                },
            },
            Action::SizeLimit(limit) => P {
                size_limit: TbSizeLimit {
                    min_width: limit.min_width,
                    min_height: limit.min_height,
                    max_width: limit.max_width,
                    max_height: limit.max_height,
                },
            },
            Action::InitialSize(size) => P {
                initial_size: TbActionSize {
                    width: size.width,
                    height: size.height,
                },
            },
            Action::CellSize(size) => P {
                cell_size: TbActionSize {
                    width: size.width,
                    height: size.height,
                },
            },
            Action::Scrollbar(bar) => P {
                scrollbar: TbScrollbar {
                    total: bar.total,
                    offset: bar.offset,
                    len: bar.len,
                },
            },
            Action::Inspector(mode) => P {
                inspector: *mode as u32,
            },
            Action::DesktopNotification(notification) => {
                let title = self.string(&notification.title);
                let body = self.string(&notification.body);
                P {
                    desktop_notification: TbDesktopNotification { title, body },
                }
            }
            Action::SetTitle(title) => P {
                set_title: TbSetTitle {
                    title: self.string(title),
                },
            },
            Action::PromptTitle(which) => P {
                prompt_title: *which as u32,
            },
            Action::Pwd(pwd) => P {
                pwd: TbPwd {
                    pwd: self.string(pwd),
                },
            },
            Action::MouseShape(shape) => P {
                mouse_shape: *shape as u32,
            },
            Action::MouseVisibility(visibility) => P {
                mouse_visibility: *visibility as u32,
            },
            Action::MouseOverLink(url) => P {
                mouse_over_link: match url {
                    Some(url) => TbMouseOverLink {
                        url: self.string(url),
                        len: url.replace('\0', "").len(),
                    },
                    None => TbMouseOverLink {
                        url: ptr::null(),
                        len: 0,
                    },
                },
            },
            Action::RendererHealth(health) => P {
                renderer_health: *health as u32,
            },
            Action::QuitTimer(timer) => P {
                quit_timer: *timer as u32,
            },
            Action::FloatWindow(float) => P {
                float_window: *float as u32,
            },
            Action::SecureInput(secure) => P {
                secure_input: *secure as u32,
            },
            Action::KeySequence(sequence) => P {
                key_sequence: match sequence {
                    KeySequence::Trigger(trigger) => TbKeySequence {
                        active: true,
                        trigger: TbTrigger::from(*trigger),
                    },
                    KeySequence::End => TbKeySequence {
                        active: false,
                        trigger: TbTrigger::zeroed(),
                    },
                },
            },
            Action::KeyTable(table) => P {
                key_table: match table {
                    KeyTable::Activate(name) => TbKeyTable {
                        tag: KEY_TABLE_ACTIVATE,
                        name: self.string(name),
                        len: name.replace('\0', "").len(),
                    },
                    other => TbKeyTable {
                        tag: other.tag(),
                        name: ptr::null(),
                        len: 0,
                    },
                },
            },
            Action::ColorChange(change) => P {
                color_change: TbColorChange {
                    kind: change.kind.to_raw(),
                    r: change.r,
                    g: change.g,
                    b: change.b,
                },
            },
            Action::ReloadConfig { soft } => P {
                reload_config: TbReloadConfig { soft: *soft },
            },
            Action::ConfigChange(config) => P {
                config_change: TbConfigChange {
                    config: Arc::as_ptr(config),
                },
            },
            Action::OpenUrl(open) => P {
                open_url: TbOpenUrl {
                    kind: open.kind as u32,
                    url: self.string(&open.url),
                    len: open.url.replace('\0', "").len(),
                },
            },
            Action::ShowChildExited(exited) => P {
                child_exited: TbChildExited {
                    exit_code: exited.exit_code,
                    runtime_ms: u64::try_from(exited.runtime.as_millis()).unwrap_or(u64::MAX),
                },
            },
            Action::ProgressReport(report) => P {
                progress_report: TbProgressReport {
                    state: report.state as u32,
                    progress: report.progress.map_or(-1, |p| p.min(100) as i8),
                },
            },
            Action::CommandFinished(finished) => P {
                command_finished: TbCommandFinished {
                    exit_code: finished.exit_code.map_or(-1, i16::from),
                    duration: u64::try_from(finished.duration.as_nanos()).unwrap_or(u64::MAX),
                },
            },
            Action::StartSearch(needle) => P {
                start_search: TbStartSearch {
                    needle: self.string(needle),
                },
            },
            Action::SearchTotal(total) => P {
                search_total: optional_count(*total),
            },
            Action::SearchSelected(selected) => P {
                search_selected: optional_count(*selected),
            },
            Action::Readonly(readonly) => P {
                readonly: *readonly as u32,
            },
        }
    }
}

fn optional_count(count: Option<usize>) -> isize {
    count.map_or(-1, |n| isize::try_from(n).unwrap_or(isize::MAX))
}

fn count_from_raw(raw: isize) -> Option<usize> {
    usize::try_from(raw).ok()
}

/// Read an action record back, touching only the member its tag names.
/// Unknown tags and out-of-range payload values yield `None`.
///
/// # Safety
///
/// Every pointer in the active payload must be valid as described on its
/// record type. A `config_change` pointer must point to a live config.
pub unsafe fn decode_action(record: &TbAction) -> Option<Action> {
    let Some(tag) = ActionTag::from_raw(record.tag) else {
        tracing::debug!(tag = record.tag, "Ignoring action with unknown tag");
        return None;
    };
    let p = &record.action;

    let action = unsafe {
        match tag {
            ActionTag::Quit => Action::Quit,
            ActionTag::NewWindow => Action::NewWindow,
            ActionTag::NewTab => Action::NewTab,
            ActionTag::CloseTab => Action::CloseTab(CloseTabMode::from_raw(p.close_tab_mode)?),
            ActionTag::NewSplit => Action::NewSplit(SplitDirection::from_raw(p.new_split)?),
            ActionTag::CloseAllWindows => Action::CloseAllWindows,
            ActionTag::ToggleMaximize => Action::ToggleMaximize,
            ActionTag::ToggleFullscreen => {
                Action::ToggleFullscreen(Fullscreen::from_raw(p.toggle_fullscreen)?)
            }
            ActionTag::ToggleTabOverview => Action::ToggleTabOverview,
            ActionTag::ToggleWindowDecorations => Action::ToggleWindowDecorations,
            ActionTag::ToggleQuickTerminal => Action::ToggleQuickTerminal,
            ActionTag::ToggleCommandPalette => Action::ToggleCommandPalette,
            ActionTag::ToggleVisibility => Action::ToggleVisibility,
            ActionTag::ToggleBackgroundOpacity => Action::ToggleBackgroundOpacity,
            ActionTag::MoveTab => Action::MoveTab(p.move_tab.amount),
            ActionTag::GotoTab => Action::GotoTab(GotoTab::from_raw(p.goto_tab)?),
            ActionTag::GotoSplit => Action::GotoSplit(GotoSplit::from_raw(p.goto_split)?),
            ActionTag::GotoWindow => Action::GotoWindow(GotoWindow::from_raw(p.goto_window)?),
            ActionTag::ResizeSplit => Action::ResizeSplit(ResizeSplit {
                amount: p.resize_split.amount,
                direction: ResizeDirection::from_raw(p.resize_split.direction)?,
            }),
            ActionTag::EqualizeSplits => Action::EqualizeSplits,
            ActionTag::ToggleSplitZoom => Action::ToggleSplitZoom,
            ActionTag::PresentTerminal => Action::PresentTerminal,
            ActionTag::SizeLimit => Action::SizeLimit(SizeLimit {
                min_width: p.size_limit.min_width,
                min_height: p.size_limit.min_height,
                max_width: p.size_limit.max_width,
                max_height: p.size_limit.max_height,
            }),
            ActionTag::ResetWindowSize => Action::ResetWindowSize,
            ActionTag::InitialSize => Action::InitialSize(Size {
                width: p.initial_size.width,
                height: p.initial_size.height,
            }),
            ActionTag::CellSize => Action::CellSize(Size {
                width: p.cell_size.width,
                height: p.cell_size.height,
            }),
            ActionTag::Scrollbar => Action::Scrollbar(Scrollbar {
                total: p.scrollbar.total,
                offset: p.scrollbar.offset,
                len: p.scrollbar.len,
            }),
            ActionTag::Render => Action::Render,
            ActionTag::Inspector => Action::Inspector(InspectorMode::from_raw(p.inspector)?),
            ActionTag::ShowGtkInspector => Action::ShowGtkInspector,
            ActionTag::RenderInspector => Action::RenderInspector,
            ActionTag::DesktopNotification => Action::DesktopNotification(DesktopNotification {
                title: read_cstr(p.desktop_notification.title),
                body: read_cstr(p.desktop_notification.body),
            }),
            ActionTag::SetTitle => Action::SetTitle(read_cstr(p.set_title.title)),
            ActionTag::PromptTitle => Action::PromptTitle(PromptTitle::from_raw(p.prompt_title)?),
            ActionTag::Pwd => Action::Pwd(read_cstr(p.pwd.pwd)),
            ActionTag::MouseShape => Action::MouseShape(MouseShape::from_raw(p.mouse_shape)?),
            ActionTag::MouseVisibility => {
                Action::MouseVisibility(MouseVisibility::from_raw(p.mouse_visibility)?)
            }
            ActionTag::MouseOverLink => {
                let link = p.mouse_over_link;
                Action::MouseOverLink((!link.url.is_null()).then(|| read_str(link.url, link.len)))
            }
            ActionTag::RendererHealth => {
                Action::RendererHealth(RendererHealth::from_raw(p.renderer_health)?)
            }
            ActionTag::OpenConfig => Action::OpenConfig,
            ActionTag::QuitTimer => Action::QuitTimer(QuitTimer::from_raw(p.quit_timer)?),
            ActionTag::FloatWindow => Action::FloatWindow(FloatWindow::from_raw(p.float_window)?),
            ActionTag::SecureInput => Action::SecureInput(SecureInput::from_raw(p.secure_input)?),
            ActionTag::KeySequence => {
                let sequence = p.key_sequence;
                if sequence.active {
                    Action::KeySequence(KeySequence::Trigger(sequence.trigger.decode()?))
                } else {
                    Action::KeySequence(KeySequence::End)
                }
            }
            ActionTag::KeyTable => {
                let table = p.key_table;
                Action::KeyTable(match table.tag {
                    KEY_TABLE_ACTIVATE => KeyTable::Activate(read_str(table.name, table.len)),
                    KEY_TABLE_DEACTIVATE => KeyTable::Deactivate,
                    KEY_TABLE_DEACTIVATE_ALL => KeyTable::DeactivateAll,
                    _ => return None,
                })
            }
            ActionTag::ColorChange => Action::ColorChange(ColorChange {
                kind: ColorKind::from_raw(p.color_change.kind)?,
                r: p.color_change.r,
                g: p.color_change.g,
                b: p.color_change.b,
            }),
            ActionTag::ReloadConfig => Action::ReloadConfig {
                soft: p.reload_config.soft,
            },
            ActionTag::ConfigChange => {
                let config = p.config_change.config.as_ref()?;
                Action::ConfigChange(Arc::new(config.clone()))
            }
            ActionTag::CloseWindow => Action::CloseWindow,
            ActionTag::RingBell => Action::RingBell,
            ActionTag::Undo => Action::Undo,
            ActionTag::Redo => Action::Redo,
            ActionTag::CheckForUpdates => Action::CheckForUpdates,
            ActionTag::OpenUrl => Action::OpenUrl(OpenUrl {
                kind: OpenUrlKind::from_raw(p.open_url.kind)?,
                url: read_str(p.open_url.url, p.open_url.len),
            }),
            ActionTag::ShowChildExited => Action::ShowChildExited(ChildExited {
                exit_code: p.child_exited.exit_code,
                runtime: Duration::from_millis(p.child_exited.runtime_ms),
            }),
            ActionTag::ProgressReport => Action::ProgressReport(ProgressReport {
                state: ProgressState::from_raw(p.progress_report.state)?,
                progress: u8::try_from(p.progress_report.progress).ok(),
            }),
            ActionTag::ShowOnScreenKeyboard => Action::ShowOnScreenKeyboard,
            ActionTag::CommandFinished => Action::CommandFinished(CommandFinished {
                exit_code: u8::try_from(p.command_finished.exit_code).ok(),
                duration: Duration::from_nanos(p.command_finished.duration),
            }),
            ActionTag::StartSearch => Action::StartSearch(read_cstr(p.start_search.needle)),
            ActionTag::EndSearch => Action::EndSearch,
            ActionTag::SearchTotal => Action::SearchTotal(count_from_raw(p.search_total)),
            ActionTag::SearchSelected => Action::SearchSelected(count_from_raw(p.search_selected)),
            ActionTag::Readonly => Action::Readonly(Readonly::from_raw(p.readonly)?),
            ActionTag::CopyTitleToClipboard => Action::CopyTitleToClipboard,
        }
    };
    Some(action)
}
