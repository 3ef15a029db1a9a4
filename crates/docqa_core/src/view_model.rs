use crate::{DocumentKind, HealthStatus, MessageId, Role, UploadId, UploadStatus};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub input: String,
    pub messages: Vec<MessageView>,
    pub documents: Vec<DocumentRowView>,
    pub document_count: usize,
    pub uploads: Vec<UploadRowView>,
    pub pending_queries: usize,
    pub health: HealthStatus,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageView {
    pub id: MessageId,
    pub role: Role,
    pub text: String,
    pub pending: bool,
    pub citations: Vec<CitationView>,
    pub processing_time: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CitationView {
    pub source_file: String,
    pub label: String,
    pub snippet: Option<String>,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRowView {
    pub id: Option<String>,
    pub filename: String,
    pub kind: DocumentKind,
    pub upload_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRowView {
    pub upload_id: UploadId,
    pub filename: String,
    pub status: UploadStatus,
}
