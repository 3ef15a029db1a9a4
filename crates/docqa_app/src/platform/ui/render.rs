use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDateTime};
use docqa_core::{
    source_file_url, AppViewModel, CitationView, DocumentKind, DocumentRowView, HealthStatus,
    MessageId, MessageView, Role, UploadId, UploadStatus,
};
use engine_logging::clip;

const SNIPPET_CHARS: usize = 100;

/// Tracks what has already been printed so each frame only emits changes.
#[derive(Debug, Default)]
pub struct Screen {
    base_url: String,
    printed: HashSet<MessageId>,
    uploads: HashMap<UploadId, UploadStatus>,
    document_count: Option<usize>,
    health: Option<HealthStatus>,
}

impl Screen {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Lines to print for everything that changed since the previous frame.
    pub fn frame(&mut self, view: &AppViewModel) -> Vec<String> {
        let mut lines = Vec::new();

        if self.health.as_ref() != Some(&view.health) {
            match &view.health {
                HealthStatus::Unknown => {}
                HealthStatus::Online { model } => lines.push(match model {
                    Some(model) => format!("* service online ({model})"),
                    None => "* service online".to_string(),
                }),
                HealthStatus::Offline => lines.push("* service offline".to_string()),
            }
            self.health = Some(view.health.clone());
        }

        for upload in &view.uploads {
            if self.uploads.get(&upload.upload_id) == Some(&upload.status) {
                continue;
            }
            self.uploads.insert(upload.upload_id, upload.status);
            let label = match upload.status {
                UploadStatus::InFlight => "uploading",
                UploadStatus::Succeeded => "uploaded",
                UploadStatus::Failed => "upload failed",
            };
            lines.push(format!("* {label}: {}", upload.filename));
        }

        for message in &view.messages {
            if self.printed.insert(message.id) {
                lines.extend(render_message(message, &self.base_url));
            }
        }
        // Placeholders that were swapped out no longer need tracking.
        self.printed
            .retain(|id| view.messages.iter().any(|message| message.id == *id));

        if self.document_count != Some(view.document_count) {
            if self.document_count.is_some() || view.document_count > 0 {
                lines.push(format!("* documents: {}", view.document_count));
            }
            self.document_count = Some(view.document_count);
        }

        lines
    }
}

pub fn render_message(message: &MessageView, base_url: &str) -> Vec<String> {
    let speaker = match message.role {
        Role::User => "you",
        Role::Assistant => "assistant",
    };
    let mut lines: Vec<String> = message
        .text
        .lines()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                format!("{speaker}> {line}")
            } else {
                format!("{:width$}  {line}", "", width = speaker.len())
            }
        })
        .collect();
    if lines.is_empty() {
        lines.push(format!("{speaker}>"));
    }

    if !message.citations.is_empty() {
        lines.push("  SOURCES".to_string());
        for (index, citation) in message.citations.iter().enumerate() {
            let link = source_file_url(base_url, &citation.source_file)
                .map(|url| format!("  {url}"))
                .unwrap_or_default();
            lines.push(format!("  [{}] {}{link}", index + 1, citation.label));
            if let Some(detail) = citation_detail(citation) {
                lines.push(format!("      {detail}"));
            }
        }
    }
    if let Some(seconds) = message.processing_time {
        lines.push(format!("  ({seconds:.1}s)"));
    }
    lines
}

/// Quoted excerpt and relevance score under a source line, when the service
/// sent them.
fn citation_detail(citation: &CitationView) -> Option<String> {
    let snippet = citation
        .snippet
        .as_deref()
        .map(str::trim)
        .filter(|snippet| !snippet.is_empty())
        .map(|snippet| format!("\"{}\"", clip(snippet, SNIPPET_CHARS)));
    let score = citation.score.map(|score| format!("(score {score:.2})"));
    match (snippet, score) {
        (Some(snippet), Some(score)) => Some(format!("{snippet} {score}")),
        (snippet, score) => snippet.or(score),
    }
}

pub fn render_documents(view: &AppViewModel) -> Vec<String> {
    if view.documents.is_empty() {
        return vec!["No documents indexed yet.".to_string()];
    }
    let mut lines = vec![format!("Documents ({})", view.document_count)];
    lines.extend(view.documents.iter().map(format_document_row));
    lines
}

fn format_document_row(doc: &DocumentRowView) -> String {
    let icon = match doc.kind {
        DocumentKind::Pdf => "[pdf]",
        DocumentKind::Image => "[img]",
        DocumentKind::Audio => "[aud]",
        DocumentKind::Other => "[doc]",
    };
    let date = doc
        .upload_time
        .as_deref()
        .map(format_upload_date)
        .unwrap_or_default();
    let id = doc
        .id
        .as_deref()
        .map(|id| format!("  id={id}"))
        .unwrap_or_default();
    format!("{icon} {}  {date}{id}", doc.filename)
        .trim_end()
        .to_string()
}

/// Shows the date part of the service timestamp; unknown formats pass through.
fn format_upload_date(raw: &str) -> String {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.format("%Y-%m-%d").to_string();
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return parsed.format("%Y-%m-%d").to_string();
    }
    raw.to_string()
}
