use crate::{Markers, Permission, TimerState};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChatViewModel {
    pub show_chat: String,
    pub title: String,
    pub is_latest: bool,
    pub timer: TimerState,
    pub markers: Markers,
    /// Newest first.
    pub fragments: Vec<String>,
    pub input: String,
    pub permission: Permission,
    pub notification_open: bool,
    pub last_warning: Option<String>,
    pub generation: u64,
    pub dirty: bool,
}
