use std::io::{self, IsTerminal, Write};

use chat_core::Permission;
use chat_logging::{chat_debug, chat_warn};
use serde::{Deserialize, Serialize};

/// How the host answers a notification permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationMode {
    /// Granted when stdout is a terminal, denied otherwise.
    #[default]
    Ask,
    Granted,
    Denied,
}

impl NotificationMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "ask" => Some(Self::Ask),
            "granted" => Some(Self::Granted),
            "denied" => Some(Self::Denied),
            _ => None,
        }
    }
}

pub trait Notifier {
    /// Permission as known before any request is made.
    fn permission(&self) -> Permission;
    fn request_permission(&mut self) -> Permission;
    fn show(&mut self, title: &str);
}

/// Rings the terminal bell and prints the notification title.
pub struct TerminalNotifier<W: Write> {
    mode: NotificationMode,
    resolved: Option<Permission>,
    interactive: bool,
    out: W,
}

impl TerminalNotifier<io::Stdout> {
    pub fn stdout(mode: NotificationMode, remembered: Option<Permission>) -> Self {
        let out = io::stdout();
        let interactive = out.is_terminal();
        Self::new(mode, remembered, interactive, out)
    }
}

impl<W: Write> TerminalNotifier<W> {
    pub fn new(
        mode: NotificationMode,
        remembered: Option<Permission>,
        interactive: bool,
        out: W,
    ) -> Self {
        let resolved = match mode {
            NotificationMode::Granted => Some(Permission::Granted),
            NotificationMode::Denied => Some(Permission::Denied),
            NotificationMode::Ask => remembered.filter(|p| *p != Permission::Undecided),
        };
        Self {
            mode,
            resolved,
            interactive,
            out,
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Notifier for TerminalNotifier<W> {
    fn permission(&self) -> Permission {
        self.resolved.unwrap_or_default()
    }

    fn request_permission(&mut self) -> Permission {
        let permission = match self.resolved {
            Some(permission) => permission,
            None if self.interactive => Permission::Granted,
            None => Permission::Denied,
        };
        chat_debug!(
            "notification permission ({:?}) resolved to {:?}",
            self.mode,
            permission
        );
        self.resolved = Some(permission);
        permission
    }

    fn show(&mut self, title: &str) {
        if let Err(err) = writeln!(self.out, "\x07*** {title} ***").and_then(|()| self.out.flush())
        {
            chat_warn!("failed to show notification: {}", err);
        }
    }
}
