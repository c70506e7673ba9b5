use std::fmt;

/// Opaque id the caller attaches to a fetch so it can match the completion.
pub type Ticket = u64;

pub const HEADER_LAST_MSG_ID: &str = "X-LastMsgId";
pub const HEADER_FIRST_MSG_ID: &str = "X-FirstMsgId";
pub const HEADER_CHAT_TAG: &str = "X-ChatTag";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    FetchCompleted {
        ticket: Ticket,
        query: String,
        result: Result<FetchReply, TransportError>,
    },
    PostCompleted {
        result: Result<(), TransportError>,
    },
    PollTick,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchReply {
    /// HTTP 304.
    NotModified,
    Content {
        html: String,
        markers: PaginationHeaders,
        encoding_label: String,
    },
}

/// Pagination headers exactly as sent by the server.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PaginationHeaders {
    pub first_msg_id: Option<String>,
    pub last_msg_id: Option<String>,
    pub chat_tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: FailureKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
