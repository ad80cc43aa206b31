use tracing::{debug, warn};

use crate::events::SessionEvent;
use crate::persistence::Persistence;
use crate::state::{Notice, SessionState};

/// Replace the in-memory settings with the stored ones, if any.
pub fn load(state: &mut SessionState, persistence: &Persistence) {
    match persistence.load_settings() {
        Ok(Some(settings)) => {
            debug!(?settings, "Loaded stored settings");
            state.settings = settings;
        }
        Ok(None) => {}
        Err(e) => {
            warn!(error = %e, "Stored settings unreadable, using defaults");
            state.push_notice(Notice::Storage {
                chat: None,
                detail: e.to_string(),
            });
        }
    }
}

pub fn set_dark_mode(state: &mut SessionState, persistence: &Persistence, enabled: bool) {
    state.settings.dark_mode = enabled;
    commit(state, persistence);
}

pub fn set_push_notifications(state: &mut SessionState, persistence: &Persistence, enabled: bool) {
    state.settings.push_notifications = enabled;
    commit(state, persistence);
}

fn commit(state: &mut SessionState, persistence: &Persistence) {
    if let Err(e) = persistence.save_settings(&state.settings) {
        warn!(error = %e, "Failed to persist settings");
        state.push_notice(Notice::Storage {
            chat: None,
            detail: e.to_string(),
        });
    }
    state.emit(SessionEvent::SettingsChanged);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use supergram_store::{MemoryStore, SettingsStore};

    #[test]
    fn test_settings_survive_a_restart() {
        let store = Arc::new(MemoryStore::new());
        let persistence = Persistence::new(store.clone());
        let mut state = SessionState::seeded();

        set_dark_mode(&mut state, &persistence, false);
        set_push_notifications(&mut state, &persistence, false);
        assert!(!store.load_settings().unwrap().unwrap().dark_mode);

        let mut restarted = SessionState::seeded();
        load(&mut restarted, &persistence);
        assert!(!restarted.settings.dark_mode);
        assert!(!restarted.settings.push_notifications);
    }

    #[test]
    fn test_nothing_stored_keeps_defaults() {
        let mut state = SessionState::seeded();
        load(&mut state, &Persistence::none());

        assert!(state.settings.dark_mode);
        assert!(state.settings.push_notifications);
        assert!(state.notices().is_empty());
    }
}
