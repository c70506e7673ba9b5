use std::io::{BufRead, ErrorKind};
use std::sync::mpsc::Sender;

use chat_core::{ChatViewModel, Msg, Permission, TimerState};
use chat_engine::FragmentRenderer;
use chat_logging::{chat_error, chat_warn};

/// One line typed by the user, interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Core(Msg),
    Send(String),
    Back,
    Forward,
    Export,
    Help,
    Quit,
    Unknown(String),
}

pub const HELP_LINES: &[&str] = &[
    "/next      newer messages",
    "/prev      older messages",
    "/latest    back to the live view",
    "/back      previous view in history",
    "/forward   next view in history",
    "/refresh   fetch the current view again",
    "/export    write the transcript to the export directory",
    "/quit      leave",
    "anything else is sent as a message",
];

/// `None` for blank lines.
pub fn parse_command(line: &str) -> Option<HostEvent> {
    let trimmed = line.trim_end_matches(['\r', '\n']);
    if trimmed.trim().is_empty() {
        return None;
    }
    let event = match trimmed.trim() {
        "/next" => HostEvent::Core(Msg::NavigateNewer),
        "/prev" => HostEvent::Core(Msg::NavigateOlder),
        "/latest" => HostEvent::Core(Msg::NavigateLatest),
        "/refresh" => HostEvent::Core(Msg::RefreshRequested),
        "/back" => HostEvent::Back,
        "/forward" => HostEvent::Forward,
        "/export" => HostEvent::Export,
        "/help" => HostEvent::Help,
        "/quit" | "/exit" => HostEvent::Quit,
        command if command.starts_with('/') && !command.starts_with("//") => {
            HostEvent::Unknown(command.to_string())
        }
        // "//text" sends "/text".
        _ => HostEvent::Send(trimmed.strip_prefix('/').unwrap_or(trimmed).to_string()),
    };
    Some(event)
}

/// Reads lines from `input` until EOF and forwards the parsed commands.
/// Lines that are not UTF-8 are decoded lossily. Sends `Quit` at EOF or on a
/// read error.
pub fn forward_commands<R: BufRead>(mut input: R, events: &Sender<HostEvent>) {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match input.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => {
                chat_error!("reading stdin failed: {}", err);
                break;
            }
        }
        let line = String::from_utf8_lossy(&buf);
        if std::str::from_utf8(&buf).is_err() {
            chat_warn!("input line is not valid UTF-8; invalid bytes replaced");
        }
        if let Some(event) = parse_command(&line) {
            if events.send(event).is_err() {
                return;
            }
        }
    }
    let _ = events.send(HostEvent::Quit);
}

pub fn render(view: &ChatViewModel, renderer: &dyn FragmentRenderer) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!("== {} ==", view.title));
    lines.push(status_line(view));
    for fragment in &view.fragments {
        lines.extend(renderer.render(fragment));
    }
    if let Some(warning) = &view.last_warning {
        lines.push(format!("! {warning}"));
    }
    if !view.input.is_empty() {
        lines.push(format!("> {}", view.input));
    }
    lines
}

fn status_line(view: &ChatViewModel) -> String {
    let mode = if view.is_latest { "live" } else { "paged" };
    let timer = match view.timer {
        TimerState::Running => "polling",
        TimerState::Stopped => "paused",
    };
    let notify = match view.permission {
        Permission::Granted => "on",
        Permission::Denied => "off",
        Permission::Undecided => "?",
    };
    let range = match (view.markers.down, view.markers.up) {
        (Some(down), Some(up)) => format!("#{down}..#{up}"),
        (None, Some(up)) => format!("..#{up}"),
        (Some(down), None) => format!("#{down}.."),
        (None, None) => "-".to_string(),
    };
    format!("[{mode} | {timer} | messages {range} | notifications {notify}]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_core::Markers;
    use chat_engine::PlainTextRenderer;

    #[test]
    fn slash_commands_map_to_messages() {
        assert_eq!(
            parse_command("/next\n"),
            Some(HostEvent::Core(Msg::NavigateNewer))
        );
        assert_eq!(
            parse_command("/prev"),
            Some(HostEvent::Core(Msg::NavigateOlder))
        );
        assert_eq!(parse_command("/back"), Some(HostEvent::Back));
        assert_eq!(parse_command("/quit"), Some(HostEvent::Quit));
        assert_eq!(
            parse_command("/bogus"),
            Some(HostEvent::Unknown("/bogus".to_string()))
        );
    }

    #[test]
    fn other_lines_are_sent_verbatim() {
        assert_eq!(
            parse_command("  hello there \n"),
            Some(HostEvent::Send("  hello there ".to_string()))
        );
        assert_eq!(
            parse_command("//shrug"),
            Some(HostEvent::Send("/shrug".to_string()))
        );
        assert_eq!(parse_command("   \n"), None);
    }

    #[test]
    fn non_utf8_line_is_sent_not_quit() {
        let (tx, rx) = std::sync::mpsc::channel();
        let input = std::io::Cursor::new(b"caf\xe9\n/next\n".to_vec());

        forward_commands(input, &tx);

        let events: Vec<HostEvent> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                HostEvent::Send("caf\u{FFFD}".to_string()),
                HostEvent::Core(Msg::NavigateNewer),
                HostEvent::Quit,
            ]
        );
    }

    #[test]
    fn last_line_without_newline_is_kept() {
        let (tx, rx) = std::sync::mpsc::channel();

        forward_commands(std::io::Cursor::new(b"hello".to_vec()), &tx);

        let events: Vec<HostEvent> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![HostEvent::Send("hello".to_string()), HostEvent::Quit]
        );
    }

    #[test]
    fn render_shows_title_status_and_messages() {
        let view = ChatViewModel {
            title: "Chat - upper_bound=9".to_string(),
            is_latest: false,
            markers: Markers {
                up: Some(9),
                down: Some(4),
                tag: None,
            },
            fragments: vec!["bob: later<br>".to_string(), "alice: hi<br>".to_string()],
            permission: Permission::Granted,
            last_warning: Some("unable to select next chat".to_string()),
            ..ChatViewModel::default()
        };

        let lines = render(&view, &PlainTextRenderer);

        assert_eq!(
            lines,
            vec![
                "== Chat - upper_bound=9 ==",
                "[paged | paused | messages #4..#9 | notifications on]",
                "bob: later",
                "alice: hi",
                "! unable to select next chat",
            ]
        );
    }
}
