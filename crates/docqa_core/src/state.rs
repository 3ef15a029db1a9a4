use std::collections::BTreeMap;
use std::path::Path;

use crate::view_model::{
    AppViewModel, CitationView, DocumentRowView, MessageView, UploadRowView,
};
use crate::{
    Answer, Document, DocumentRegistry, FetchError, MessageDraft, MessageId, ServiceHealth,
    Transcript,
};

pub type UploadId = u64;

/// Text shown in the assistant placeholder while a query is in flight.
pub const PLACEHOLDER_TEXT: &str = "Thinking...";

/// The single user-facing text for any failed query.
pub const ERROR_REPLY_TEXT: &str = "Error: the assistant could not answer this question.";

/// What happens when the user sends while another question is unanswered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryPolicy {
    /// Every send runs its own query; answers land in arrival order.
    #[default]
    AllowOverlap,
    /// Refuse a new send while any placeholder is pending.
    RejectWhileInFlight,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("query transport failed: {0}")]
    Transport(String),
    #[error("query response malformed: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Failed to upload {filename}")]
pub struct UploadError {
    pub filename: String,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStatus {
    InFlight,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRow {
    pub upload_id: UploadId,
    pub filename: String,
    pub status: UploadStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HealthStatus {
    #[default]
    Unknown,
    Online {
        model: Option<String>,
    },
    Offline,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    transcript: Transcript,
    registry: DocumentRegistry,
    input: String,
    uploads: BTreeMap<UploadId, UploadRow>,
    next_upload_id: UploadId,
    policy: QueryPolicy,
    health: HealthStatus,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: QueryPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn registry(&self) -> &DocumentRegistry {
        &self.registry
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn policy(&self) -> QueryPolicy {
        self.policy
    }

    pub fn upload(&self, upload_id: UploadId) -> Option<&UploadRow> {
        self.uploads.get(&upload_id)
    }

    pub fn view(&self) -> AppViewModel {
        let messages = self
            .transcript
            .iter()
            .map(|message| MessageView {
                id: message.id,
                role: message.role,
                text: message.text.clone(),
                pending: message.pending,
                citations: message
                    .citations
                    .iter()
                    .map(|citation| CitationView {
                        source_file: citation.source_file.clone(),
                        label: citation.label(),
                        snippet: citation.snippet.clone(),
                        score: citation.score,
                    })
                    .collect(),
                processing_time: message.processing_time,
            })
            .collect();

        let documents = self
            .registry
            .documents()
            .iter()
            .map(|doc| DocumentRowView {
                id: doc.id.clone(),
                filename: doc.filename.clone(),
                kind: doc.kind(),
                upload_time: doc.upload_time.clone(),
            })
            .collect();

        let uploads = self
            .uploads
            .values()
            .map(|row| UploadRowView {
                upload_id: row.upload_id,
                filename: row.filename.clone(),
                status: row.status,
            })
            .collect();

        AppViewModel {
            input: self.input.clone(),
            messages,
            documents,
            document_count: self.registry.len(),
            uploads,
            pending_queries: self.transcript.pending_count(),
            health: self.health.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_input(&mut self, text: String) {
        if self.input != text {
            self.input = text;
            self.mark_dirty();
        }
    }

    pub(crate) fn take_input(&mut self) -> String {
        self.mark_dirty();
        std::mem::take(&mut self.input)
    }

    pub(crate) fn has_pending_query(&self) -> bool {
        self.transcript.pending_count() > 0
    }

    pub(crate) fn append(&mut self, draft: MessageDraft) -> MessageId {
        self.mark_dirty();
        self.transcript.append(draft)
    }

    /// Swaps a pending placeholder for its final message: delete, then append.
    pub(crate) fn resolve_placeholder(&mut self, placeholder_id: MessageId, draft: MessageDraft) {
        self.transcript.remove_by_id(placeholder_id);
        self.append(draft);
    }

    pub(crate) fn resolve_with_answer(&mut self, placeholder_id: MessageId, answer: Answer) {
        self.resolve_placeholder(
            placeholder_id,
            MessageDraft::answer(answer.text, answer.citations, answer.processing_time),
        );
    }

    pub(crate) fn apply_documents(
        &mut self,
        result: Result<Vec<Document>, FetchError>,
    ) -> Result<(), FetchError> {
        self.registry.apply_refresh(result)?;
        self.mark_dirty();
        Ok(())
    }

    pub(crate) fn begin_upload(&mut self, path: &Path) -> UploadId {
        self.next_upload_id += 1;
        let upload_id = self.next_upload_id;
        self.uploads.insert(
            upload_id,
            UploadRow {
                upload_id,
                filename: display_filename(path),
                status: UploadStatus::InFlight,
            },
        );
        self.mark_dirty();
        upload_id
    }

    /// Marks an in-flight upload finished and returns its row. Unknown ids and
    /// uploads that already finished yield `None`.
    pub(crate) fn finish_upload(&mut self, upload_id: UploadId, ok: bool) -> Option<&UploadRow> {
        let row = self.uploads.get_mut(&upload_id)?;
        if row.status != UploadStatus::InFlight {
            return None;
        }
        row.status = if ok {
            UploadStatus::Succeeded
        } else {
            UploadStatus::Failed
        };
        self.dirty = true;
        Some(row)
    }

    pub(crate) fn set_health(&mut self, result: Result<ServiceHealth, String>) {
        self.health = match result {
            Ok(health) => HealthStatus::Online {
                model: health.model,
            },
            Err(_) => HealthStatus::Offline,
        };
        self.mark_dirty();
    }
}

fn display_filename(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
