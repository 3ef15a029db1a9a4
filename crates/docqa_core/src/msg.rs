use std::path::PathBuf;

use crate::{Citation, Document, FetchError, MessageId, QueryError, UploadId};

/// A resolved answer from the query endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub text: String,
    pub citations: Vec<Citation>,
    pub processing_time: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceHealth {
    pub status: String,
    pub model: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Front end finished booting; probe the service and load the document list.
    Started,
    /// User edited the question input.
    InputChanged(String),
    /// User submitted the current question input.
    SendClicked,
    /// User picked a batch of files to upload.
    FilesSelected(Vec<PathBuf>),
    /// User asked for the document list to be reloaded.
    RefreshRequested,
    /// User clicked delete on a document row.
    DeleteDocumentClicked { document_id: String },
    /// User asked to download a cited source file.
    DownloadSourceClicked { source_file: String },
    /// Engine finished a document list fetch.
    DocumentsFetched(Result<Vec<Document>, FetchError>),
    /// Engine finished one upload. The error carries the transport detail.
    UploadFinished {
        upload_id: UploadId,
        result: Result<(), String>,
    },
    /// Engine finished a query dispatched for the given placeholder.
    QueryResolved {
        placeholder_id: MessageId,
        result: Result<Answer, QueryError>,
    },
    /// Engine finished a document delete.
    DocumentDeleted {
        document_id: String,
        result: Result<(), String>,
    },
    /// Engine finished a source download; `Ok` holds where the file landed.
    DownloadFinished {
        source_file: String,
        result: Result<PathBuf, String>,
    },
    /// Engine finished the health probe.
    HealthChecked(Result<ServiceHealth, String>),
}
