use chrono::Utc;
use tracing::{debug, info, warn};

use supergram_shared::{ChatId, Message, MessageBody, MessageId, Sender};

use crate::events::SessionEvent;
use crate::persistence::Persistence;
use crate::state::{Notice, SessionState};

/// Open a conversation and load its stored history.
///
/// Returns whether the conversation is now active. Nothing stored keeps the
/// seeded history; an unreadable value replaces it with an empty one.
pub fn select_conversation(
    state: &mut SessionState,
    persistence: &Persistence,
    chat: &ChatId,
) -> bool {
    if !state.is_registered() {
        debug!(chat = %chat, "Ignoring chat selection before registration");
        return false;
    }
    let Some(entry) = state.chat_mut(chat) else {
        debug!(chat = %chat, "Ignoring selection of unknown chat");
        return false;
    };
    entry.unread_count = 0;
    state.set_active_chat(Some(chat.clone()));
    state.emit(SessionEvent::ChatSelected(chat.clone()));

    match persistence.load_history(chat) {
        Ok(Some(history)) => {
            debug!(chat = %chat, count = history.len(), "Loaded stored history");
            state.replace_history(chat, history);
        }
        Ok(None) => {}
        Err(e) => {
            warn!(chat = %chat, error = %e, "Stored history unreadable, starting empty");
            state.replace_history(chat, Vec::new());
            state.push_notice(Notice::Storage {
                chat: Some(chat.clone()),
                detail: e.to_string(),
            });
        }
    }

    let count = state.messages(chat).len();
    state.emit(SessionEvent::HistoryLoaded {
        chat: chat.clone(),
        count,
    });
    true
}

pub fn deselect_conversation(state: &mut SessionState) {
    if state.active_chat_id().is_some() {
        state.set_active_chat(None);
        state.emit(SessionEvent::ChatClosed);
    }
}

pub fn set_compose(state: &mut SessionState, input: &str) {
    state.compose = input.to_string();
}

/// Append a text message to the active conversation.
///
/// Blank bodies are ignored; the body is otherwise stored exactly as typed.
pub fn send_text(
    state: &mut SessionState,
    persistence: &Persistence,
    body: &str,
) -> Option<MessageId> {
    if body.trim().is_empty() {
        return None;
    }
    let Some(chat) = state.active_chat_id().cloned() else {
        debug!("No active chat, message not sent");
        return None;
    };

    let id = append(state, persistence, &chat, MessageBody::Text(body.to_string()));
    state.compose.clear();
    Some(id)
}

/// Send whatever is in the compose buffer.
pub fn send_compose(state: &mut SessionState, persistence: &Persistence) -> Option<MessageId> {
    let body = state.compose.clone();
    send_text(state, persistence, &body)
}

/// Append a self-authored message to `chat` and persist the full history.
///
/// A failed save is reported as a notice; the message stays appended.
pub(crate) fn append(
    state: &mut SessionState,
    persistence: &Persistence,
    chat: &ChatId,
    body: MessageBody,
) -> MessageId {
    let now = Utc::now();
    let id = state.next_message_id(now);
    let message = Message {
        id: id.clone(),
        body,
        sender: Sender::SelfUser,
        timestamp: now,
    };

    state.push_message(chat, message);
    info!(chat = %chat, id = %id, "Message appended");
    state.emit(SessionEvent::MessageAppended {
        chat: chat.clone(),
        id: id.clone(),
    });

    if let Err(e) = persistence.save_history(chat, state.messages(chat)) {
        warn!(chat = %chat, error = %e, "Failed to persist history");
        state.push_notice(Notice::Storage {
            chat: Some(chat.clone()),
            detail: e.to_string(),
        });
    }

    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::registration;
    use supergram_store::{HistoryStore, MemoryStore};

    fn registered() -> SessionState {
        let mut state = SessionState::seeded();
        registration::set_phone(&mut state, "+79991234567");
        registration::advance(&mut state);
        registration::set_display_name(&mut state, "Иван");
        registration::set_handle(&mut state, "ivan");
        registration::advance(&mut state);
        state
    }

    #[test]
    fn test_selection_requires_registration() {
        let mut state = SessionState::seeded();
        let persistence = Persistence::none();

        assert!(!select_conversation(&mut state, &persistence, &ChatId::new("1")));
        assert!(state.active_chat().is_none());
    }

    #[test]
    fn test_unknown_chat_is_ignored() {
        let mut state = registered();
        let persistence = Persistence::none();

        assert!(!select_conversation(&mut state, &persistence, &ChatId::new("99")));
        assert!(state.active_chat().is_none());
    }

    #[test]
    fn test_selection_resets_unread() {
        let mut state = registered();
        let persistence = Persistence::none();
        let chat = ChatId::new("1");
        assert!(state.chat(&chat).unwrap().unread_count > 0);

        select_conversation(&mut state, &persistence, &chat);

        assert_eq!(state.chat(&chat).unwrap().unread_count, 0);
        assert_eq!(state.active_chat_id(), Some(&chat));
    }

    #[test]
    fn test_blank_text_is_not_sent() {
        let mut state = registered();
        let persistence = Persistence::none();
        let chat = ChatId::new("1");
        select_conversation(&mut state, &persistence, &chat);

        assert!(send_text(&mut state, &persistence, "").is_none());
        assert!(send_text(&mut state, &persistence, "   ").is_none());
        assert!(send_text(&mut state, &persistence, "\n\t").is_none());
        assert_eq!(state.messages(&chat).len(), 2);
    }

    #[test]
    fn test_text_without_active_chat_is_not_sent() {
        let mut state = registered();
        assert!(send_text(&mut state, &Persistence::none(), "hi").is_none());
    }

    #[test]
    fn test_send_keeps_body_as_typed() {
        let mut state = registered();
        let persistence = Persistence::none();
        let chat = ChatId::new("2");
        select_conversation(&mut state, &persistence, &chat);
        set_compose(&mut state, "  привет ");

        send_compose(&mut state, &persistence).unwrap();

        let last = state.messages(&chat).last().unwrap();
        assert_eq!(last.as_text(), Some("  привет "));
        assert_eq!(last.sender, Sender::SelfUser);
        assert!(state.compose.is_empty());
        assert_eq!(state.chat(&chat).unwrap().last_message_preview, "  привет ");
    }

    #[test]
    fn test_sent_messages_are_persisted() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let persistence = Persistence::new(store.clone());
        let mut state = registered();
        let chat = ChatId::new("3");
        select_conversation(&mut state, &persistence, &chat);

        send_text(&mut state, &persistence, "Спасибо").unwrap();

        let stored = store.load_history(&chat).unwrap().unwrap();
        assert_eq!(stored, state.messages(&chat));
    }

    #[test]
    fn test_corrupt_history_falls_back_to_empty() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let chat = ChatId::new("1");
        store.put_raw(&chat, "[{\"id\":");
        let persistence = Persistence::new(store);
        let mut state = registered();

        assert!(select_conversation(&mut state, &persistence, &chat));

        assert!(state.messages(&chat).is_empty());
        assert!(matches!(
            state.notices(),
            [Notice::Storage { chat: Some(c), .. }] if c == &chat
        ));
    }

    #[test]
    fn test_deselect() {
        let mut state = registered();
        let persistence = Persistence::none();
        select_conversation(&mut state, &persistence, &ChatId::new("1"));

        deselect_conversation(&mut state);

        assert!(state.active_chat().is_none());
        assert!(state.active_messages().is_empty());
    }
}
