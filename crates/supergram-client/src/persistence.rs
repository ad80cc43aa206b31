use supergram_shared::{ChatId, Message};
use supergram_store::{AppSettings, LocalStore, StoreError};

/// The durable side of a session, if it has one.
///
/// Without a store the client behaves like the original static prototype:
/// seed histories are never replaced and nothing outlives the process.
pub struct Persistence {
    store: Option<Box<dyn LocalStore>>,
}

impl Persistence {
    pub fn new(store: impl LocalStore + 'static) -> Self {
        Self {
            store: Some(Box::new(store)),
        }
    }

    pub fn none() -> Self {
        Self { store: None }
    }

    pub fn is_durable(&self) -> bool {
        self.store.is_some()
    }

    pub fn load_history(&self, chat: &ChatId) -> Result<Option<Vec<Message>>, StoreError> {
        match &self.store {
            Some(store) => store.load_history(chat),
            None => Ok(None),
        }
    }

    pub fn save_history(&self, chat: &ChatId, messages: &[Message]) -> Result<(), StoreError> {
        match &self.store {
            Some(store) => store.save_history(chat, messages),
            None => Ok(()),
        }
    }

    pub fn load_settings(&self) -> Result<Option<AppSettings>, StoreError> {
        match &self.store {
            Some(store) => store.load_settings(),
            None => Ok(None),
        }
    }

    pub fn save_settings(&self, settings: &AppSettings) -> Result<(), StoreError> {
        match &self.store {
            Some(store) => store.save_settings(settings),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for Persistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persistence")
            .field("durable", &self.is_durable())
            .finish()
    }
}
