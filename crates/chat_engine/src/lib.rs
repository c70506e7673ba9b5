//! Chat poller engine: HTTP transport, poll timer and transcript IO.
mod decode;
mod engine;
mod export;
mod filename;
mod persist;
mod render;
mod transport;
mod types;

pub use decode::{decode_body, DecodedText};
pub use engine::{EngineError, EngineHandle};
pub use export::{ExportError, ExportSummary, TranscriptExporter, TranscriptSource};
pub use filename::transcript_stem;
pub use persist::{ensure_dir, AtomicFileWriter, PersistError};
pub use render::{FragmentRenderer, MarkdownRenderer, PlainTextRenderer};
pub use transport::{ChatTransport, ReqwestTransport, TransportSettings};
pub use types::{
    EngineEvent, FailureKind, FetchReply, PaginationHeaders, Ticket, TransportError,
    HEADER_CHAT_TAG, HEADER_FIRST_MSG_ID, HEADER_LAST_MSG_ID,
};
