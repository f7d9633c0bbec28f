use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who wrote a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    Assistant,
}

impl Author {
    pub fn as_str(self) -> &'static str {
        match self {
            Author::User => "user",
            Author::Assistant => "assistant",
        }
    }

    pub fn is_user(self) -> bool {
        self == Author::User
    }
}

/// Opaque message identity, unique within one controller's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(String);

impl MessageId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single transcript entry. Fields are private so a message cannot be
/// edited once it has been appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    author: Author,
    /// Plain text for user turns, markdown source for assistant turns.
    text: String,
    created_at: DateTime<Utc>,
}

impl Message {
    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn author(&self) -> Author {
        self.author
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_user(&self) -> bool {
        self.author.is_user()
    }
}

/// Hands out messages with time-based ids. The millisecond timestamp is
/// suffixed with a per-generator sequence number, so two messages created in
/// the same millisecond still get distinct ids.
#[derive(Debug, Default)]
pub struct MessageFactory {
    next_seq: u64,
}

impl MessageFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(&mut self, text: impl Into<String>) -> Message {
        self.create(Author::User, text.into())
    }

    pub fn assistant(&mut self, text: impl Into<String>) -> Message {
        self.create(Author::Assistant, text.into())
    }

    fn create(&mut self, author: Author, text: String) -> Message {
        let created_at = Utc::now();
        let seq = self.next_seq;
        self.next_seq += 1;
        Message {
            id: MessageId(format!("{}-{}", created_at.timestamp_millis(), seq)),
            author,
            text,
            created_at,
        }
    }
}
