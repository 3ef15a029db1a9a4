use std::fmt;

/// Identifier of a transcript message. Allocated by [`Transcript`] from a
/// monotonic counter, so two messages never share an id within one store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(u64);

impl MessageId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "msg-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// Reference from an answer back to an uploaded source file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Citation {
    pub source_file: String,
    pub page: Option<u32>,
    /// Position inside audio sources, as reported by the service.
    pub timestamp: Option<String>,
    pub snippet: Option<String>,
    pub score: Option<f64>,
}

impl Citation {
    pub fn new(source_file: impl Into<String>, page: Option<u32>) -> Self {
        Self {
            source_file: source_file.into(),
            page,
            ..Self::default()
        }
    }

    /// Short human label, e.g. `policy.pdf (Pg 2)` or `talk.mp3 (at 01:23)`.
    pub fn label(&self) -> String {
        let mut position = Vec::new();
        if let Some(page) = self.page {
            position.push(format!("Pg {page}"));
        }
        if let Some(timestamp) = self.timestamp.as_deref().filter(|t| !t.is_empty()) {
            position.push(format!("at {timestamp}"));
        }
        if position.is_empty() {
            self.source_file.clone()
        } else {
            format!("{} ({})", self.source_file, position.join(", "))
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub role: Role,
    pub text: String,
    pub pending: bool,
    pub citations: Vec<Citation>,
    pub processing_time: Option<f64>,
}

/// Everything about a message except its id, which the store assigns.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageDraft {
    pub role: Role,
    pub text: String,
    pub pending: bool,
    pub citations: Vec<Citation>,
    pub processing_time: Option<f64>,
}

impl MessageDraft {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            pending: false,
            citations: Vec::new(),
            processing_time: None,
        }
    }

    pub fn placeholder(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            pending: true,
            citations: Vec::new(),
            processing_time: None,
        }
    }

    pub fn answer(
        text: impl Into<String>,
        citations: Vec<Citation>,
        processing_time: Option<f64>,
    ) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            pending: false,
            citations,
            processing_time,
        }
    }

    pub fn assistant_error(text: impl Into<String>) -> Self {
        Self::answer(text, Vec::new(), None)
    }
}

/// Ordered chat log. Append order is preserved; the only other mutation is
/// removal by id.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    next_id: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message at the end and returns its freshly allocated id.
    pub fn append(&mut self, draft: MessageDraft) -> MessageId {
        self.next_id += 1;
        let id = MessageId(self.next_id);
        // User messages and placeholders never carry citations.
        let citations = match (draft.role, draft.pending) {
            (Role::Assistant, false) => draft.citations,
            _ => Vec::new(),
        };
        self.messages.push(ChatMessage {
            id,
            role: draft.role,
            text: draft.text,
            pending: draft.pending,
            citations,
            processing_time: draft.processing_time,
        });
        id
    }

    /// Removes the message with `id`. Returns `false` when no such message
    /// exists, which is not an error.
    pub fn remove_by_id(&mut self, id: MessageId) -> bool {
        match self.messages.iter().position(|message| message.id == id) {
            Some(index) => {
                self.messages.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: MessageId) -> Option<&ChatMessage> {
        self.messages.iter().find(|message| message.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }

    pub fn pending_count(&self) -> usize {
        self.messages.iter().filter(|message| message.pending).count()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
