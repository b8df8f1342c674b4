mod common;

use apprt::{ClipboardKind, RequestKind, TerminalEvent};
use common::{app, app_with_host, config, surface, HostCall, RecordingHost};
use pretty_assertions::assert_eq;
use test_case::test_case;

// === Paste ===

#[test]
fn safe_paste_is_written_directly() {
    let (mut app, host) = app(config(""));
    let (id, terminal) = surface(&mut app);

    assert!(app.surface(id).unwrap().binding_action("paste_from_clipboard"));
    let request = host.reads()[0];
    assert!(app.complete_clipboard_request(request, Some("ls -la".into()), false));

    assert_eq!(terminal.written(), "ls -la");
    assert!(host.confirms().is_empty());
}

#[test]
fn unsafe_paste_needs_confirmation() {
    let (mut app, host) = app(config(""));
    let (id, terminal) = surface(&mut app);

    app.surface(id).unwrap().binding_action("paste_from_clipboard");
    let request = host.reads()[0];
    assert!(app.complete_clipboard_request(request, Some("rm -rf ~\n".into()), false));

    assert_eq!(terminal.written(), "");
    assert_eq!(host.confirms(), vec![(request, "rm -rf ~\n".to_string())]);

    assert!(app.complete_clipboard_request(request, Some("rm -rf ~\n".into()), true));
    assert_eq!(terminal.written(), "rm -rf ~\r");
}

#[test]
fn declined_paste_writes_nothing() {
    let (mut app, host) = app(config(""));
    let (id, terminal) = surface(&mut app);

    app.surface(id).unwrap().binding_action("paste_from_clipboard");
    let request = host.reads()[0];
    app.complete_clipboard_request(request, Some("a\nb".into()), false);
    assert!(!app.complete_clipboard_request(request, None, false));
    assert_eq!(terminal.written(), "");
    assert_eq!(app.pending_clipboard(id, RequestKind::Paste), None);
}

#[test]
fn bracketed_paste_is_wrapped_and_trusted() {
    let (mut app, host) = app(config(""));
    let (id, terminal) = surface(&mut app);
    terminal.set_bracketed(true);

    app.surface(id).unwrap().binding_action("paste_from_clipboard");
    let request = host.reads()[0];
    app.complete_clipboard_request(request, Some("a\nb".into()), false);

    assert_eq!(terminal.written(), "\x1b[200~a\nb\x1b[201~");
}

#[test]
fn paste_protection_can_be_disabled() {
    let (mut app, host) = app(config("clipboard-paste-protection = false"));
    let (id, terminal) = surface(&mut app);

    app.surface(id).unwrap().binding_action("paste_from_clipboard");
    app.complete_clipboard_request(host.reads()[0], Some("a\n".into()), false);
    assert_eq!(terminal.written(), "a\r");
}

#[test]
fn refused_read_cancels_request() {
    let host = RecordingHost {
        accept_reads: false,
        ..RecordingHost::default()
    };
    let mut app = app_with_host(config(""), host.clone());
    let (id, _terminal) = surface(&mut app);

    assert!(!app.surface(id).unwrap().binding_action("paste_from_clipboard"));
    assert_eq!(host.reads().len(), 1);
    assert_eq!(app.pending_clipboard(id, RequestKind::Paste), None);
}

#[test]
fn selection_paste_falls_back_without_selection_clipboard() {
    let (mut app, host) = app(config(""));
    let (id, _terminal) = surface(&mut app);

    app.surface(id).unwrap().binding_action("paste_from_selection");
    assert!(matches!(
        host.calls()[0],
        HostCall::ReadClipboard { clipboard: ClipboardKind::Standard, .. }
    ));
}

#[test]
fn readonly_surface_drops_paste() {
    let (mut app, host) = app(config(""));
    let (id, terminal) = surface(&mut app);

    app.surface(id).unwrap().binding_action("toggle_readonly");
    assert!(app.surface(id).unwrap().is_readonly());
    app.surface(id).unwrap().binding_action("paste_from_clipboard");
    app.complete_clipboard_request(host.reads()[0], Some("ls".into()), false);
    assert_eq!(terminal.written(), "");
}

// === Supersede and teardown ===

#[test]
fn superseded_paste_completion_is_ignored() {
    let (mut app, host) = app(config(""));
    let (id, terminal) = surface(&mut app);

    app.surface(id).unwrap().binding_action("paste_from_clipboard");
    app.surface(id).unwrap().binding_action("paste_from_clipboard");
    let reads = host.reads();
    assert_eq!(reads.len(), 2);

    assert!(!app.complete_clipboard_request(reads[0], Some("old".into()), true));
    assert!(app.complete_clipboard_request(reads[1], Some("new".into()), true));
    assert_eq!(terminal.written(), "new");
}

#[test]
fn completion_after_teardown_is_ignored() {
    let (mut app, host) = app(config(""));
    let (id, terminal) = surface(&mut app);

    app.surface(id).unwrap().binding_action("paste_from_clipboard");
    let request = host.reads()[0];
    app.free_surface(id);

    assert!(!app.complete_clipboard_request(request, Some("late".into()), true));
    assert_eq!(terminal.written(), "");
}

#[test]
fn completion_from_another_thread_applies_on_tick() {
    let (mut app, host) = app(config(""));
    let (id, terminal) = surface(&mut app);

    app.surface(id).unwrap().binding_action("paste_from_clipboard");
    let request = host.reads()[0];
    let sender = app.sender();
    std::thread::spawn(move || sender.complete_clipboard(request, Some("hi".into()), false))
        .join()
        .unwrap();

    assert_eq!(terminal.written(), "");
    assert_eq!(app.tick(), 1);
    assert_eq!(terminal.written(), "hi");
}

#[test]
fn completion_through_another_surface_is_ignored() {
    let (mut app, host) = app(config(""));
    let (first, first_terminal) = surface(&mut app);
    let (second, second_terminal) = surface(&mut app);

    app.surface(first).unwrap().binding_action("paste_from_clipboard");
    let request = host.reads()[0];

    assert!(!app
        .surface(second)
        .unwrap()
        .complete_clipboard_request(request, Some("wrong".into()), false));
    assert_eq!(second_terminal.written(), "");
    assert_eq!(app.pending_clipboard(first, RequestKind::Paste), Some(request));

    app.sender()
        .complete_surface_clipboard(second, request, Some("queued".into()), false);
    app.tick();
    assert_eq!(app.pending_clipboard(first, RequestKind::Paste), Some(request));

    app.sender()
        .complete_surface_clipboard(first, request, Some("right".into()), false);
    app.tick();
    assert_eq!(first_terminal.written(), "right");
    assert_eq!(second_terminal.written(), "");
}

// === OSC 52 ===

#[test_case("allow", false ; "allow answers directly")]
#[test_case("ask", true ; "ask confirms first")]
fn osc52_read(access: &str, confirms: bool) {
    let (mut app, host) = app(config(&format!("clipboard-read = \"{access}\"")));
    let (id, terminal) = surface(&mut app);

    app.surface(id).unwrap().terminal_event(TerminalEvent::Osc52Read {
        clipboard: ClipboardKind::Standard,
    });
    let request = host.reads()[0];
    app.complete_clipboard_request(request, Some("hello".into()), false);

    assert_eq!(host.confirms().len(), usize::from(confirms));
    if confirms {
        assert_eq!(terminal.written(), "");
        app.complete_clipboard_request(request, Some("hello".into()), true);
    }
    assert_eq!(terminal.written(), "\x1b]52;c;aGVsbG8=\x1b\\");
}

#[test]
fn osc52_read_denied_never_reaches_host() {
    let (mut app, host) = app(config(r#"clipboard-read = "deny""#));
    let (id, terminal) = surface(&mut app);

    app.surface(id).unwrap().terminal_event(TerminalEvent::Osc52Read {
        clipboard: ClipboardKind::Standard,
    });
    assert!(host.calls().is_empty());
    assert_eq!(terminal.written(), "");
}

#[test]
fn osc52_write_allowed_is_decoded() {
    let (mut app, host) = app(config(r#"clipboard-write = "allow""#));
    let (id, _terminal) = surface(&mut app);

    app.surface(id).unwrap().terminal_event(TerminalEvent::Osc52Write {
        clipboard: ClipboardKind::Standard,
        payload: "aGVsbG8=".into(),
    });
    assert_eq!(host.writes(), vec![("hello".to_string(), None)]);
}

#[test_case(r#"clipboard-write = "deny""#, "aGVsbG8=" ; "denied")]
#[test_case(r#"clipboard-write = "allow""#, "not base64!" ; "malformed")]
fn osc52_write_dropped(toml: &str, payload: &str) {
    let (mut app, host) = app(config(toml));
    let (id, _terminal) = surface(&mut app);

    app.surface(id).unwrap().terminal_event(TerminalEvent::Osc52Write {
        clipboard: ClipboardKind::Standard,
        payload: payload.into(),
    });
    assert!(host.writes().is_empty());
}

#[test]
fn declined_osc52_write_never_writes() {
    let (mut app, host) = app(config(r#"clipboard-write = "ask""#));
    let (id, _terminal) = surface(&mut app);

    app.surface(id).unwrap().terminal_event(TerminalEvent::Osc52Write {
        clipboard: ClipboardKind::Standard,
        payload: "aGVsbG8=".into(),
    });
    let request = host.writes()[0].1.unwrap();
    host.clear();
    assert!(!app.complete_clipboard_request(request, None, false));
    assert!(host.writes().is_empty());
}

// === Copy ===

#[test]
fn copy_writes_selection() {
    let (mut app, host) = app(config(""));
    let (id, terminal) = surface(&mut app);

    assert!(!app.surface(id).unwrap().binding_action("copy_to_clipboard"));
    terminal.set_selection("selected");
    assert!(app.surface(id).unwrap().binding_action("copy_to_clipboard"));
    assert_eq!(host.writes(), vec![("selected".to_string(), None)]);
}

#[test]
fn copy_on_select_uses_selection_clipboard() {
    let (mut app, host) = app(config("copy-on-select = true"));
    let (id, terminal) = surface(&mut app);
    terminal.set_selection("word");

    app.surface(id).unwrap().terminal_event(TerminalEvent::SelectionChanged);
    assert!(matches!(
        &host.calls()[..],
        [HostCall::WriteClipboard { clipboard: ClipboardKind::Standard, .. }]
    ));
}
