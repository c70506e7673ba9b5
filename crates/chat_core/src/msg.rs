use crate::{Generation, Permission};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Host finished setup; carries the platform's current notification permission.
    Started { permission: Permission },
    /// Outcome of a permission request.
    PermissionResolved(Permission),
    /// The open notification was dismissed.
    NotificationClosed,
    /// Periodic poll timer fired.
    PollTimerFired,
    /// User asked for a manual refresh of the current view.
    RefreshRequested,
    /// Engine finished a GET issued for `generation`.
    FetchCompleted {
        generation: Generation,
        query: String,
        outcome: FetchOutcome,
    },
    /// User asked for newer messages ("next").
    NavigateNewer,
    /// User asked for older messages ("prev").
    NavigateOlder,
    /// User asked to jump back to latest mode.
    NavigateLatest,
    /// Host restored a history entry (back/forward); carries its `show_chat` value.
    HistoryRestored(String),
    /// User edited the outgoing message box.
    InputChanged(String),
    /// User submitted the outgoing message box.
    SendSubmitted,
    /// Engine finished the POST of an outgoing message.
    PostCompleted(Result<(), String>),
    /// UI/render tick to coalesce rendering.
    Tick,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// HTTP 304.
    NotModified,
    /// Any failure: transport error or status outside 2xx.
    Failed { reason: String },
    Fresh {
        body: String,
        headers: ResponseHeaders,
    },
}

/// Raw pagination headers as the server sent them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResponseHeaders {
    pub first_msg_id: Option<String>,
    pub last_msg_id: Option<String>,
    pub chat_tag: Option<String>,
}
