//! In-process store with the same semantics as [`Database`](crate::Database).
//!
//! Values are kept serialized so that corruption and round-trip behaviour
//! match the SQLite backend.

use std::collections::HashMap;
use std::sync::Mutex;

use supergram_shared::{ChatId, Message};

use crate::error::{Result, StoreError};
use crate::history::{decode_history, HistoryStore, SettingsStore};
use crate::models::AppSettings;

#[derive(Default)]
pub struct MemoryStore {
    histories: Mutex<HashMap<ChatId, String>>,
    settings: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw payload for `chat` without validating it.
    pub fn put_raw(&self, chat: &ChatId, payload: impl Into<String>) {
        self.histories
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(chat.clone(), payload.into());
    }

    pub fn raw(&self, chat: &ChatId) -> Option<String> {
        self.histories
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(chat)
            .cloned()
    }
}

impl HistoryStore for MemoryStore {
    fn load_history(&self, chat: &ChatId) -> Result<Option<Vec<Message>>> {
        match self.raw(chat) {
            Some(payload) => decode_history(chat, &payload).map(Some),
            None => Ok(None),
        }
    }

    fn save_history(&self, chat: &ChatId, messages: &[Message]) -> Result<()> {
        let payload = serde_json::to_string(messages)?;
        self.put_raw(chat, payload);
        Ok(())
    }
}

impl SettingsStore for MemoryStore {
    fn load_settings(&self) -> Result<Option<AppSettings>> {
        let guard = self.settings.lock().unwrap_or_else(|e| e.into_inner());
        match guard.as_deref() {
            Some(json) => serde_json::from_str(json)
                .map(Some)
                .map_err(|source| StoreError::Corrupt {
                    key: "settings".into(),
                    source,
                }),
            None => Ok(None),
        }
    }

    fn save_settings(&self, settings: &AppSettings) -> Result<()> {
        let json = serde_json::to_string(settings)?;
        *self.settings.lock().unwrap_or_else(|e| e.into_inner()) = Some(json);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use supergram_shared::{MessageId, Sender};

    #[test]
    fn test_round_trip() {
        let store = MemoryStore::new();
        let chat = ChatId::new("1");
        let history = vec![
            Message::text(MessageId::from_millis(1), Sender::Peer, "a", Utc::now()),
            Message::text(MessageId::from_millis(2), Sender::SelfUser, "b", Utc::now()),
        ];

        store.save_history(&chat, &history).unwrap();

        assert_eq!(store.load_history(&chat).unwrap(), Some(history));
    }

    #[test]
    fn test_corrupt_value() {
        let store = MemoryStore::new();
        let chat = ChatId::new("1");
        store.put_raw(&chat, "[{\"id\":");

        assert!(matches!(
            store.load_history(&chat),
            Err(StoreError::Corrupt { .. })
        ));
    }
}
