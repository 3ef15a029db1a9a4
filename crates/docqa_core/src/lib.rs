//! DocQA core: pure state machine for the transcript, the document mirror and
//! the upload/query coordinators. All I/O lives behind [`Effect`]s.
mod effect;
mod links;
mod msg;
mod registry;
mod state;
mod transcript;
mod update;
mod view_model;

pub use effect::Effect;
pub use links::{source_file_url, LinkError};
pub use msg::{Answer, Msg, ServiceHealth};
pub use registry::{Document, DocumentKind, DocumentRegistry, FetchError};
pub use state::{
    AppState, HealthStatus, QueryError, QueryPolicy, UploadError, UploadId, UploadRow,
    UploadStatus, ERROR_REPLY_TEXT, PLACEHOLDER_TEXT,
};
pub use transcript::{ChatMessage, Citation, MessageDraft, MessageId, Role, Transcript};
pub use update::update;
pub use view_model::{
    AppViewModel, CitationView, DocumentRowView, MessageView, UploadRowView,
};
