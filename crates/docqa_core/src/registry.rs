/// A document as listed by the service. Read-only on the client.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    pub id: Option<String>,
    pub filename: String,
    pub content_type: String,
    /// Upload timestamp exactly as the service formats it.
    pub upload_time: Option<String>,
    pub chunk_count: Option<u32>,
}

impl Document {
    pub fn kind(&self) -> DocumentKind {
        DocumentKind::from_content_type(&self.content_type)
    }
}

/// Display category selected from the MIME-like content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Image,
    Audio,
    Other,
}

impl DocumentKind {
    pub fn from_content_type(content_type: &str) -> Self {
        let ct = content_type.to_ascii_lowercase();
        if ct.contains("pdf") {
            DocumentKind::Pdf
        } else if ct.contains("image") {
            DocumentKind::Image
        } else if ct.contains("audio") {
            DocumentKind::Audio
        } else {
            DocumentKind::Other
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("document list refresh failed: {message}")]
pub struct FetchError {
    pub message: String,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Client-side copy of the service's document list. Only ever replaced as a
/// whole, never merged.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentRegistry {
    documents: Vec<Document>,
}

impl DocumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies the outcome of a full list fetch. On success the mirror becomes
    /// exactly `documents`; on failure it is left untouched.
    pub fn apply_refresh(
        &mut self,
        result: Result<Vec<Document>, FetchError>,
    ) -> Result<&[Document], FetchError> {
        let documents = result?;
        self.documents = documents;
        Ok(&self.documents)
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
