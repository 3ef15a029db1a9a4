use std::collections::HashMap;

use docqa_core::{
    Answer, Citation, Document, Effect, FetchError, MessageId, Msg, QueryError, ServiceHealth,
};
use docqa_engine::{
    CitationRecord, ClientError, DocumentRecord, EngineEvent, EngineHandle, FailureKind,
    QueryTicket,
};
use engine_logging::{clip, engine_debug, engine_info, engine_warn, LOG_PREVIEW_CHARS};

/// Executes core effects against the engine and turns engine events back into
/// core messages.
pub struct EffectRunner {
    engine: EngineHandle,
    placeholders: HashMap<QueryTicket, MessageId>,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self {
            engine,
            placeholders: HashMap::new(),
        }
    }

    pub fn engine(&self) -> &EngineHandle {
        &self.engine
    }

    /// Runs effects and returns the notices the user must see.
    pub fn run(&mut self, effects: Vec<Effect>) -> Vec<String> {
        let mut notices = Vec::new();
        for effect in effects {
            match effect {
                Effect::FetchDocuments => {
                    engine_debug!("FetchDocuments");
                    self.engine.list_documents();
                }
                Effect::UploadFile { upload_id, path } => {
                    engine_info!("UploadFile upload_id={} path={}", upload_id, path.display());
                    self.engine.upload(upload_id, path);
                }
                Effect::SubmitQuery {
                    placeholder_id,
                    query,
                } => {
                    engine_info!(
                        "SubmitQuery placeholder={} query={}",
                        placeholder_id,
                        clip(&query, LOG_PREVIEW_CHARS)
                    );
                    let ticket = placeholder_id.get();
                    self.placeholders.insert(ticket, placeholder_id);
                    self.engine.query(ticket, query);
                }
                Effect::DeleteDocument { document_id } => {
                    engine_info!("DeleteDocument id={}", document_id);
                    self.engine.delete_document(document_id);
                }
                Effect::DownloadSource { source_file } => {
                    engine_info!("DownloadSource {}", source_file);
                    self.engine.download(source_file);
                }
                Effect::CheckHealth => self.engine.check_health(),
                Effect::NotifyUser { message } => notices.push(message),
            }
        }
        notices
    }

    /// Maps an engine event to the message the core expects, logging failures
    /// with their full detail.
    pub fn translate(&mut self, event: EngineEvent) -> Option<Msg> {
        let msg = match event {
            EngineEvent::DocumentsListed(result) => Msg::DocumentsFetched(
                result
                    .map(|records| records.into_iter().map(map_document).collect())
                    .map_err(|err| {
                        engine_warn!("Document list refresh failed: {}", err);
                        FetchError::new(err.to_string())
                    }),
            ),
            EngineEvent::UploadCompleted { upload_id, result } => Msg::UploadFinished {
                upload_id,
                result: result.map_err(|err| {
                    engine_warn!("Upload {} failed: {}", upload_id, err);
                    err.to_string()
                }),
            },
            EngineEvent::QueryCompleted { ticket, result } => {
                let Some(placeholder_id) = self.placeholders.remove(&ticket) else {
                    engine_warn!("Query completion for unknown ticket {}", ticket);
                    return None;
                };
                Msg::QueryResolved {
                    placeholder_id,
                    result: result.map(map_answer).map_err(|err| {
                        engine_warn!("Query {} failed: {}", ticket, err);
                        map_query_error(err)
                    }),
                }
            }
            EngineEvent::DocumentDeleted {
                document_id,
                result,
            } => Msg::DocumentDeleted {
                result: result.map_err(|err| {
                    engine_warn!("Delete of document {} failed: {}", document_id, err);
                    err.to_string()
                }),
                document_id,
            },
            EngineEvent::DownloadCompleted {
                source_file,
                result,
            } => Msg::DownloadFinished {
                result: result.map_err(|err| {
                    engine_warn!("Download of {} failed: {}", source_file, err);
                    err.to_string()
                }),
                source_file,
            },
            EngineEvent::HealthChecked(result) => Msg::HealthChecked(
                result
                    .map(|reply| {
                        engine_info!(
                            "Service health: {} (model {:?})",
                            reply.status,
                            reply.model
                        );
                        ServiceHealth {
                            status: reply.status,
                            model: reply.model,
                        }
                    })
                    .map_err(|err| {
                        engine_warn!("Health check failed: {}", err);
                        err.to_string()
                    }),
            ),
        };
        Some(msg)
    }
}

fn map_document(record: DocumentRecord) -> Document {
    Document {
        id: record.id,
        filename: record.filename,
        content_type: record.content_type.unwrap_or_default(),
        upload_time: record.upload_time,
        chunk_count: record.chunk_count,
    }
}

fn map_citation(record: CitationRecord) -> Citation {
    Citation {
        source_file: record.source_file,
        page: record.page,
        timestamp: record.timestamp,
        snippet: record.snippet,
        score: record.score,
    }
}

fn map_answer(reply: docqa_engine::QueryReply) -> Answer {
    Answer {
        text: reply.answer,
        citations: reply
            .citations
            .unwrap_or_default()
            .into_iter()
            .map(map_citation)
            .collect(),
        processing_time: reply.processing_time,
    }
}

fn map_query_error(err: ClientError) -> QueryError {
    match err.kind {
        FailureKind::MalformedResponse => QueryError::MalformedResponse(err.message),
        _ => QueryError::Transport(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_and_transport_errors_are_told_apart() {
        assert_eq!(
            map_query_error(ClientError::new(FailureKind::MalformedResponse, "eof")),
            QueryError::MalformedResponse("eof".to_string())
        );
        assert_eq!(
            map_query_error(ClientError::new(FailureKind::HttpStatus(502), "bad gateway")),
            QueryError::Transport("http status 502: bad gateway".to_string())
        );
    }

    #[test]
    fn missing_content_type_maps_to_empty() {
        let doc = map_document(DocumentRecord {
            id: Some("d1".to_string()),
            filename: "memo".to_string(),
            content_type: None,
            upload_time: None,
            chunk_count: None,
        });
        assert_eq!(doc.content_type, "");
        assert_eq!(doc.kind(), docqa_core::DocumentKind::Other);
    }
}
