use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::Message;
use crate::types::{ChatId, MessageId, Sender};

/// A conversation with one peer, as shown in the chat list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: ChatId,
    pub display_name: String,
    pub handle: String,
    pub last_message_preview: String,
    /// Either `HH:MM` or a relative label such as "Вчера".
    pub last_activity_label: String,
    pub unread_count: u32,
    pub verified: bool,
    pub online: bool,
}

impl Chat {
    /// First character of the display name, used as the avatar fallback.
    pub fn initial(&self) -> Option<char> {
        self.display_name.chars().next()
    }

    /// Case-insensitive match against the chat-list search box.
    ///
    /// A leading `@` restricts the match to the handle. Both forms match
    /// anywhere in the field.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() {
            return true;
        }
        if let Some(handle_query) = query.strip_prefix('@') {
            return self
                .handle
                .to_lowercase()
                .contains(&handle_query.to_lowercase());
        }
        let query = query.to_lowercase();
        self.display_name.to_lowercase().contains(&query)
            || self.handle.to_lowercase().contains(&query)
    }
}

/// The conversations every session starts with.
pub fn seed_chats() -> Vec<Chat> {
    vec![
        Chat {
            id: ChatId::new("1"),
            display_name: "Алексей Смирнов".into(),
            handle: "alex_dev".into(),
            last_message_preview: "Привет! Как дела?".into(),
            last_activity_label: "14:32".into(),
            unread_count: 2,
            verified: true,
            online: true,
        },
        Chat {
            id: ChatId::new("2"),
            display_name: "Мария Петрова".into(),
            handle: "maria_p".into(),
            last_message_preview: "Созвон в 15:00".into(),
            last_activity_label: "13:15".into(),
            unread_count: 0,
            verified: false,
            online: false,
        },
        Chat {
            id: ChatId::new("3"),
            display_name: "Дмитрий".into(),
            handle: "dmitry_k".into(),
            last_message_preview: "Отправил файлы".into(),
            last_activity_label: "Вчера".into(),
            unread_count: 1,
            verified: false,
            online: true,
        },
    ]
}

/// Static history a conversation shows before anything is stored for it.
pub fn seed_history(chat: &Chat, at: DateTime<Utc>) -> Vec<Message> {
    if chat.id.as_str() == "1" {
        return vec![
            Message::text(MessageId("1".into()), Sender::Peer, "Привет! Как дела?", at),
            Message::text(
                MessageId("2".into()),
                Sender::SelfUser,
                "Отлично! Работаю над новым проектом",
                at,
            ),
        ];
    }
    vec![Message::text(
        MessageId("1".into()),
        Sender::Peer,
        chat.last_message_preview.clone(),
        at,
    )]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_chats_have_unique_ids() {
        let chats = seed_chats();
        let mut ids: Vec<_> = chats.iter().map(|c| c.id.clone()).collect();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_first_chat_seeds_two_messages() {
        let chats = seed_chats();
        let history = seed_history(&chats[0], Utc::now());

        assert_eq!(history.len(), 2);
        assert_eq!(history[0].sender, Sender::Peer);
        assert_eq!(history[1].sender, Sender::SelfUser);
    }

    #[test]
    fn test_matches_name_and_handle() {
        let chats = seed_chats();
        let alex = &chats[0];

        assert!(alex.matches("алексей"));
        assert!(alex.matches("ALEX"));
        assert!(alex.matches("@alex"));
        assert!(alex.matches("@_DEV"));
        assert!(!alex.matches("@смирнов"));
        assert!(!alex.matches("maria"));
        assert!(alex.matches("   "));
    }
}
