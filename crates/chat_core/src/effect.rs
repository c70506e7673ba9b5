use std::time::Duration;

use crate::{Generation, HistoryEntry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Fetch(FetchRequest),
    PostMessage { body: String },
    StartPollTimer { interval: Duration },
    StopPollTimer,
    PushHistory(HistoryEntry),
    RequestNotificationPermission,
    ShowNotification { title: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub generation: Generation,
    pub query: String,
}
