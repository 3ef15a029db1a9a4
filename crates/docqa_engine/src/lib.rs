//! DocQA engine: service client and effect execution.
mod client;
mod engine;
mod persist;
mod types;

pub use client::{guess_content_type, ClientSettings, ReqwestServiceClient, ServiceClient};
pub use engine::{EngineConfig, EngineHandle};
pub use persist::{ensure_output_dir, safe_file_name, AtomicFileWriter, PersistError};
pub use types::{
    CitationRecord, ClientError, DocumentRecord, EngineEvent, FailureKind, HealthReply,
    QueryReply, QueryRequest, QueryTicket, UploadId,
};
