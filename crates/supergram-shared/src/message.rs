//! Chat messages and their identifiers.
//!
//! A message body is either text or a reference to a captured voice note,
//! never both. Histories are append-only and kept in creation order, which is
//! also id order since ids come from a strictly increasing generator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::VOICE_NOTE_PREVIEW;
use crate::types::{ClipHandle, MessageId, Sender};

/// A voice note attached to a message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VoiceNote {
    /// Playable resource in the clip library.
    pub clip: ClipHandle,
    /// Length of the recording in whole seconds.
    pub duration_secs: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum MessageBody {
    Text(String),
    Voice(VoiceNote),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub body: MessageBody,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn text(id: MessageId, sender: Sender, text: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            id,
            body: MessageBody::Text(text.into()),
            sender,
            timestamp: at,
        }
    }

    pub fn voice(id: MessageId, sender: Sender, note: VoiceNote, at: DateTime<Utc>) -> Self {
        Self {
            id,
            body: MessageBody::Voice(note),
            sender,
            timestamp: at,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.body {
            MessageBody::Text(text) => Some(text),
            MessageBody::Voice(_) => None,
        }
    }

    pub fn as_voice(&self) -> Option<&VoiceNote> {
        match &self.body {
            MessageBody::Voice(note) => Some(note),
            MessageBody::Text(_) => None,
        }
    }

    /// One-line summary used for the chat list preview.
    pub fn preview(&self) -> String {
        match &self.body {
            MessageBody::Text(text) => text.clone(),
            MessageBody::Voice(note) => {
                format!("{VOICE_NOTE_PREVIEW} ({} с)", note.duration_secs)
            }
        }
    }
}

/// Generates message ids from the creation time.
///
/// Two messages created within the same millisecond would collide, so the
/// generator never hands out an id lower than or equal to the last one.
#[derive(Debug, Clone, Default)]
pub struct MessageIdGenerator {
    last_ms: i64,
}

impl MessageIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self, at: DateTime<Utc>) -> MessageId {
        let ms = at.timestamp_millis().max(self.last_ms + 1);
        self.last_ms = ms;
        MessageId::from_millis(ms)
    }

    /// Make sure future ids sort after an id that already exists (e.g. one
    /// reloaded from storage).
    pub fn observe(&mut self, id: &MessageId) {
        if let Some(ms) = id.as_millis() {
            self.last_ms = self.last_ms.max(ms);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_strictly_increase_within_same_millisecond() {
        let mut gen = MessageIdGenerator::new();
        let now = Utc::now();

        let a = gen.next(now);
        let b = gen.next(now);

        assert_eq!(a.as_millis(), Some(now.timestamp_millis()));
        assert_eq!(b.as_millis(), Some(now.timestamp_millis() + 1));
    }

    #[test]
    fn test_observe_moves_generator_past_stored_ids() {
        let mut gen = MessageIdGenerator::new();
        let now = Utc::now();
        let future = MessageId::from_millis(now.timestamp_millis() + 10_000);

        gen.observe(&future);
        let next = gen.next(now);

        assert!(next.as_millis() > future.as_millis());
    }

    #[test]
    fn test_voice_note_preview_mentions_duration() {
        let msg = Message::voice(
            MessageId::from_millis(1),
            Sender::SelfUser,
            VoiceNote {
                clip: ClipHandle::new(),
                duration_secs: 7,
            },
            Utc::now(),
        );

        assert!(msg.preview().contains("7 с"));
        assert!(msg.as_text().is_none());
    }

    #[test]
    fn test_body_serializes_with_kind_tag() {
        let msg = Message::text(MessageId::from_millis(5), Sender::Peer, "hey", Utc::now());
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["body"]["kind"], "text");
        assert_eq!(json["body"]["data"], "hey");
        assert_eq!(json["sender"], "peer");
    }
}
