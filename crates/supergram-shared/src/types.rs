use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Conversation identifier, also the durable storage key for its history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ChatId(pub String);

impl ChatId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChatId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// Message identifier, derived from the creation time in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn from_millis(ms: i64) -> Self {
        Self(ms.to_string())
    }

    /// Numeric value of the id when it was generated from a timestamp.
    pub fn as_millis(&self) -> Option<i64> {
        self.0.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// Handle to a captured voice clip held by the media clip library
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ClipHandle(pub Uuid);

impl ClipHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClipHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClipHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "clip:{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    /// The local user.
    SelfUser,
    /// The other side of the conversation.
    Peer,
}

impl Sender {
    pub fn is_self(&self) -> bool {
        matches!(self, Sender::SelfUser)
    }
}
