//! Chat poller core: pure state machine and view-model helpers.
mod effect;
mod history;
mod msg;
mod state;
mod update;
mod view_model;
mod view_state;

pub use effect::{Effect, FetchRequest};
pub use history::{show_chat_from_page_url, HistoryEntry};
pub use msg::{FetchOutcome, Msg, ResponseHeaders};
pub use state::{
    ChatSettings, ChatState, Generation, Markers, Permission, TimerState, Transcript,
    DEFAULT_NOTIFICATION_TITLE, DEFAULT_POLL_INTERVAL,
};
pub use update::update;
pub use view_model::ChatViewModel;
pub use view_state::{MessageId, MonthTag, Protocol, RangeKind, ViewState};
