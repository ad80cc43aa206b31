use std::sync::Arc;

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use supergram_shared::{ChatId, Message};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::AppSettings;

/// Durable message history, one entry per conversation.
pub trait HistoryStore {
    /// Load the stored history of `chat`, oldest first.
    ///
    /// Returns `Ok(None)` when nothing was ever stored for the conversation
    /// and [`StoreError::Corrupt`] when the stored value does not parse.
    fn load_history(&self, chat: &ChatId) -> Result<Option<Vec<Message>>>;

    /// Replace the stored history of `chat` with `messages`.
    fn save_history(&self, chat: &ChatId, messages: &[Message]) -> Result<()>;
}

pub trait SettingsStore {
    fn load_settings(&self) -> Result<Option<AppSettings>>;

    fn save_settings(&self, settings: &AppSettings) -> Result<()>;
}

/// Everything the client persists.
pub trait LocalStore: HistoryStore + SettingsStore + Send {}

impl<T: HistoryStore + SettingsStore + Send> LocalStore for T {}

impl<T: HistoryStore + ?Sized> HistoryStore for Arc<T> {
    fn load_history(&self, chat: &ChatId) -> Result<Option<Vec<Message>>> {
        (**self).load_history(chat)
    }

    fn save_history(&self, chat: &ChatId, messages: &[Message]) -> Result<()> {
        (**self).save_history(chat, messages)
    }
}

impl<T: SettingsStore + ?Sized> SettingsStore for Arc<T> {
    fn load_settings(&self) -> Result<Option<AppSettings>> {
        (**self).load_settings()
    }

    fn save_settings(&self, settings: &AppSettings) -> Result<()> {
        (**self).save_settings(settings)
    }
}

/// Parse a stored history payload, tagging failures with the chat id.
pub(crate) fn decode_history(chat: &ChatId, payload: &str) -> Result<Vec<Message>> {
    serde_json::from_str(payload).map_err(|source| StoreError::Corrupt {
        key: chat.to_string(),
        source,
    })
}

impl Database {
    /// Raw JSON stored for `chat`, if any.
    pub fn history_payload(&self, chat: &ChatId) -> Result<Option<String>> {
        let payload = self
            .conn()
            .query_row(
                "SELECT payload FROM chat_history WHERE chat_id = ?1",
                params![chat.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(payload)
    }

    /// Write a raw payload for `chat` without validating it.
    pub fn put_history_payload(&self, chat: &ChatId, payload: &str) -> Result<()> {
        self.conn().execute(
            "INSERT INTO chat_history (chat_id, payload, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(chat_id) DO UPDATE SET payload = excluded.payload,
                                                updated_at = excluded.updated_at",
            params![chat.as_str(), payload, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn delete_history(&self, chat: &ChatId) -> Result<bool> {
        let affected = self.conn().execute(
            "DELETE FROM chat_history WHERE chat_id = ?1",
            params![chat.as_str()],
        )?;
        Ok(affected > 0)
    }
}

impl HistoryStore for Database {
    fn load_history(&self, chat: &ChatId) -> Result<Option<Vec<Message>>> {
        match self.history_payload(chat)? {
            Some(payload) => decode_history(chat, &payload).map(Some),
            None => Ok(None),
        }
    }

    fn save_history(&self, chat: &ChatId, messages: &[Message]) -> Result<()> {
        let payload = serde_json::to_string(messages)?;
        self.put_history_payload(chat, &payload)?;
        tracing::debug!(chat = %chat, count = messages.len(), "history saved");
        Ok(())
    }
}
