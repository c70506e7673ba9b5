use std::collections::VecDeque;
use std::time::Duration;

use crate::view_model::ChatViewModel;
use crate::{HistoryEntry, MessageId, MonthTag, Protocol, ViewState};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_NOTIFICATION_TITLE: &str = "New chat message";

/// Identifies one initialisation of the current view; bumped on every view change.
pub type Generation = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSettings {
    pub protocol: Protocol,
    pub poll_interval: Duration,
    pub notification_title: String,
    /// Raw view string that replaces latest mode on startup.
    pub initial_view: Option<String>,
    /// Month the host considers current; only consulted by the chat-tag protocol.
    pub current_month: Option<MonthTag>,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            protocol: Protocol::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            notification_title: DEFAULT_NOTIFICATION_TITLE.to_string(),
            initial_view: None,
            current_month: None,
        }
    }
}

/// Newest/oldest known message ids (and chat tag) for the current view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Markers {
    pub up: Option<MessageId>,
    pub down: Option<MessageId>,
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerState {
    #[default]
    Stopped,
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Permission {
    /// Neither granted nor denied yet.
    #[default]
    Undecided,
    Granted,
    Denied,
}

/// Rendered message fragments, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transcript {
    fragments: VecDeque<String>,
}

impl Transcript {
    pub fn fragments(&self) -> impl Iterator<Item = &str> {
        self.fragments.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub(crate) fn prepend(&mut self, fragment: String) {
        self.fragments.push_front(fragment);
    }

    pub(crate) fn replace(&mut self, fragment: String) {
        self.fragments.clear();
        if !fragment.is_empty() {
            self.fragments.push_back(fragment);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.fragments.clear();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChatState {
    settings: ChatSettings,
    view: ViewState,
    markers: Markers,
    transcript: Transcript,
    generation: Generation,
    timer: TimerState,
    permission: Permission,
    notification_open: bool,
    input: String,
    last_warning: Option<String>,
    started: bool,
    dirty: bool,
}

impl ChatState {
    pub fn new(settings: ChatSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn view(&self) -> ChatViewModel {
        let protocol = self.settings.protocol;
        let entry = HistoryEntry::for_view(protocol, &self.view);
        ChatViewModel {
            show_chat: entry.show_chat,
            title: entry.title,
            is_latest: self.view.is_latest(),
            timer: self.timer,
            markers: self.markers.clone(),
            fragments: self.transcript.fragments().map(str::to_owned).collect(),
            input: self.input.clone(),
            permission: self.permission,
            notification_open: self.notification_open,
            last_warning: self.last_warning.clone(),
            generation: self.generation,
            dirty: self.dirty,
        }
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    pub fn protocol(&self) -> Protocol {
        self.settings.protocol
    }

    pub fn current_view(&self) -> &ViewState {
        &self.view
    }

    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn timer(&self) -> TimerState {
        self.timer
    }

    pub fn permission(&self) -> Permission {
        self.permission
    }

    pub fn notification_open(&self) -> bool {
        self.notification_open
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Returns whether anything visible changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn mark_started(&mut self) {
        self.started = true;
    }

    pub(crate) fn set_view(&mut self, view: ViewState) {
        self.view = view;
        self.mark_dirty();
    }

    /// Clears markers and transcript and starts a new generation.
    pub(crate) fn reset_view_data(&mut self) {
        self.markers = Markers::default();
        self.transcript.clear();
        self.generation += 1;
        self.last_warning = None;
        self.mark_dirty();
    }

    pub(crate) fn markers_mut(&mut self) -> &mut Markers {
        &mut self.markers
    }

    pub(crate) fn transcript_mut(&mut self) -> &mut Transcript {
        &mut self.transcript
    }

    pub(crate) fn set_timer(&mut self, timer: TimerState) {
        self.timer = timer;
        self.mark_dirty();
    }

    pub(crate) fn set_permission(&mut self, permission: Permission) {
        self.permission = permission;
        self.mark_dirty();
    }

    pub(crate) fn set_notification_open(&mut self, open: bool) {
        self.notification_open = open;
    }

    pub(crate) fn set_input(&mut self, input: String) {
        self.input = input;
        self.mark_dirty();
    }

    pub(crate) fn take_input(&mut self) -> String {
        self.mark_dirty();
        std::mem::take(&mut self.input)
    }

    pub(crate) fn set_warning(&mut self, message: String) {
        self.last_warning = Some(message);
        self.mark_dirty();
    }
}
