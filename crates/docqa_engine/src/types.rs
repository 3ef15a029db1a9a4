use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub type UploadId = u64;

/// Caller-chosen token that pairs a query with its completion event.
pub type QueryTicket = u64;

/// One row of `GET /documents/`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DocumentRecord {
    #[serde(default)]
    pub id: Option<String>,
    pub filename: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub upload_time: Option<String>,
    #[serde(default)]
    pub chunk_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRequest<'a> {
    pub query: &'a str,
    pub top_k: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CitationRecord {
    pub source_file: String,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
}

/// Body of a successful `POST /query/`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QueryReply {
    pub answer: String,
    #[serde(default)]
    pub citations: Option<Vec<CitationRecord>>,
    #[serde(default)]
    pub processing_time: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthReply {
    pub status: String,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    DocumentsListed(Result<Vec<DocumentRecord>, ClientError>),
    UploadCompleted {
        upload_id: UploadId,
        result: Result<(), ClientError>,
    },
    QueryCompleted {
        ticket: QueryTicket,
        result: Result<QueryReply, ClientError>,
    },
    DocumentDeleted {
        document_id: String,
        result: Result<(), ClientError>,
    },
    DownloadCompleted {
        source_file: String,
        result: Result<PathBuf, ClientError>,
    },
    HealthChecked(Result<HealthReply, ClientError>),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ClientError {
    pub kind: FailureKind,
    pub message: String,
}

impl ClientError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FailureKind {
    #[error("invalid url")]
    InvalidUrl,
    #[error("io error")]
    Io,
    #[error("network error")]
    Network,
    #[error("timeout")]
    Timeout,
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("malformed response")]
    MalformedResponse,
    #[error("response too large (max {max_bytes}, actual {actual:?})")]
    TooLarge { max_bytes: u64, actual: Option<u64> },
}
