//! Session state shared by every controller.
//!
//! [`SessionState`] is the single source of truth for one running client.
//! It is owned by the [`Session`](crate::Session) and handed to controllers
//! by `&mut` reference; nothing here is global.

use std::collections::HashMap;

use chrono::{DateTime, Local, Utc};
use tokio::sync::mpsc;

use supergram_media::{CaptureError, StreamId};
use supergram_shared::chat::{seed_chats, seed_history};
use supergram_shared::constants::DEVELOPER_BADGE;
use supergram_shared::{Chat, ChatId, Message, MessageId, MessageIdGenerator};
use supergram_store::AppSettings;

use crate::events::{EventSink, SessionEvent};

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// The identity entered during registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub phone: String,
    pub display_name: String,
    pub handle: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    PhoneEntry {
        phone: String,
    },
    ProfileEntry {
        phone: String,
        display_name: String,
        handle: String,
    },
    Registered(Profile),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStep {
    PhoneEntry,
    ProfileEntry,
    Registered,
}

impl Registration {
    pub fn step(&self) -> RegistrationStep {
        match self {
            Registration::PhoneEntry { .. } => RegistrationStep::PhoneEntry,
            Registration::ProfileEntry { .. } => RegistrationStep::ProfileEntry,
            Registration::Registered(_) => RegistrationStep::Registered,
        }
    }
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Chats,
    Search,
    Contacts,
    Profile,
    Settings,
}

impl View {
    pub const ALL: [View; 5] = [
        View::Chats,
        View::Search,
        View::Contacts,
        View::Profile,
        View::Settings,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            View::Chats => "Чаты",
            View::Search => "Поиск",
            View::Contacts => "Контакты",
            View::Profile => "Профиль",
            View::Settings => "Настройки",
        }
    }
}

// ---------------------------------------------------------------------------
// Media
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordingState {
    Idle,
    RequestingPermission,
    Recording {
        /// Conversation the finished note is appended to.
        chat: ChatId,
        started_at: DateTime<Utc>,
    },
}

/// What a call pane renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneFeed {
    /// The local camera.
    Local(StreamId),
    /// The local camera shown in place of a remote feed. There is no remote
    /// side, so the peer pane mirrors the user's own stream.
    LocalMirror(StreamId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pane {
    pub label: String,
    pub feed: PaneFeed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallDialog {
    pub chat: ChatId,
    pub self_pane: Pane,
    pub peer_pane: Pane,
    pub muted: bool,
    pub video_enabled: bool,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallStatus {
    Idle,
    RequestingPermission,
    Active(CallDialog),
}

// ---------------------------------------------------------------------------
// Dialogs and notices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedeemDialog {
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDraft {
    pub display_name: String,
    pub handle: String,
}

/// A recoverable failure the user should see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Capture(CaptureError),
    Storage { chat: Option<ChatId>, detail: String },
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::Capture(e) => write!(f, "{e}"),
            Notice::Storage {
                chat: Some(chat),
                detail,
            } => write!(f, "Storage problem in chat {chat}: {detail}"),
            Notice::Storage { chat: None, detail } => write!(f, "Storage problem: {detail}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

pub struct SessionState {
    registration: Registration,
    chats: Vec<Chat>,
    histories: HashMap<ChatId, Vec<Message>>,
    active_chat: Option<ChatId>,
    recording: RecordingState,
    call: CallStatus,
    verified: bool,
    redeem_dialog: Option<RedeemDialog>,
    profile_draft: Option<ProfileDraft>,
    notices: Vec<Notice>,
    ids: MessageIdGenerator,
    events: EventSink,

    /// Pending outgoing text.
    pub compose: String,
    pub view: View,
    pub search_query: String,
    pub settings: AppSettings,
}

impl SessionState {
    /// Start a session over `chats`, each with its seed history.
    pub fn new(chats: Vec<Chat>) -> Self {
        let now = Utc::now();
        let mut ids = MessageIdGenerator::new();
        let mut histories = HashMap::new();
        for chat in &chats {
            let history = seed_history(chat, now);
            for message in &history {
                ids.observe(&message.id);
            }
            histories.insert(chat.id.clone(), history);
        }

        Self {
            registration: Registration::PhoneEntry {
                phone: String::new(),
            },
            chats,
            histories,
            active_chat: None,
            recording: RecordingState::Idle,
            call: CallStatus::Idle,
            verified: false,
            redeem_dialog: None,
            profile_draft: None,
            notices: Vec::new(),
            ids,
            events: EventSink::default(),
            compose: String::new(),
            view: View::Chats,
            search_query: String::new(),
            settings: AppSettings::default(),
        }
    }

    /// Start a session over the built-in conversation list.
    pub fn seeded() -> Self {
        Self::new(seed_chats())
    }

    /// Receive every [`SessionEvent`] from now on. A new subscription
    /// replaces the previous one.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.events = EventSink::new(tx);
        rx
    }

    pub(crate) fn emit(&self, event: SessionEvent) {
        self.events.emit(event);
    }

    // -- registration -------------------------------------------------------

    pub fn registration(&self) -> &Registration {
        &self.registration
    }

    pub(crate) fn registration_mut(&mut self) -> &mut Registration {
        &mut self.registration
    }

    pub(crate) fn set_registration(&mut self, registration: Registration) {
        let step = registration.step();
        self.registration = registration;
        self.emit(SessionEvent::RegistrationChanged(step));
    }

    pub fn is_registered(&self) -> bool {
        matches!(self.registration, Registration::Registered(_))
    }

    pub fn profile(&self) -> Option<&Profile> {
        match &self.registration {
            Registration::Registered(profile) => Some(profile),
            _ => None,
        }
    }

    pub(crate) fn profile_mut(&mut self) -> Option<&mut Profile> {
        match &mut self.registration {
            Registration::Registered(profile) => Some(profile),
            _ => None,
        }
    }

    // -- conversations ------------------------------------------------------

    pub fn chats(&self) -> &[Chat] {
        &self.chats
    }

    pub fn chat(&self, id: &ChatId) -> Option<&Chat> {
        self.chats.iter().find(|c| &c.id == id)
    }

    pub(crate) fn chat_mut(&mut self, id: &ChatId) -> Option<&mut Chat> {
        self.chats.iter_mut().find(|c| &c.id == id)
    }

    /// Chat list filtered by the search box.
    pub fn visible_chats(&self) -> Vec<&Chat> {
        self.chats
            .iter()
            .filter(|c| c.matches(&self.search_query))
            .collect()
    }

    pub fn active_chat_id(&self) -> Option<&ChatId> {
        self.active_chat.as_ref()
    }

    pub fn active_chat(&self) -> Option<&Chat> {
        self.active_chat.as_ref().and_then(|id| self.chat(id))
    }

    pub(crate) fn set_active_chat(&mut self, chat: Option<ChatId>) {
        self.active_chat = chat;
    }

    pub fn messages(&self, chat: &ChatId) -> &[Message] {
        self.histories.get(chat).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn active_messages(&self) -> &[Message] {
        match &self.active_chat {
            Some(chat) => self.messages(chat),
            None => &[],
        }
    }

    pub(crate) fn replace_history(&mut self, chat: &ChatId, history: Vec<Message>) {
        for message in &history {
            self.ids.observe(&message.id);
        }
        self.histories.insert(chat.clone(), history);
    }

    pub(crate) fn next_message_id(&mut self, at: DateTime<Utc>) -> MessageId {
        self.ids.next(at)
    }

    /// Append to a conversation's history and refresh its list entry.
    pub(crate) fn push_message(&mut self, chat: &ChatId, message: Message) {
        let preview = message.preview();
        let label = message
            .timestamp
            .with_timezone(&Local)
            .format("%H:%M")
            .to_string();

        self.histories.entry(chat.clone()).or_default().push(message);

        if let Some(entry) = self.chat_mut(chat) {
            entry.last_message_preview = preview;
            entry.last_activity_label = label;
        }
    }

    // -- media --------------------------------------------------------------

    pub fn recording(&self) -> &RecordingState {
        &self.recording
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.recording, RecordingState::Recording { .. })
    }

    pub(crate) fn set_recording(&mut self, recording: RecordingState) {
        let active = matches!(recording, RecordingState::Recording { .. });
        let was_active = self.is_recording();
        self.recording = recording;
        if active != was_active {
            self.emit(SessionEvent::RecordingChanged { active });
        }
    }

    pub fn call(&self) -> &CallStatus {
        &self.call
    }

    pub fn call_dialog(&self) -> Option<&CallDialog> {
        match &self.call {
            CallStatus::Active(dialog) => Some(dialog),
            _ => None,
        }
    }

    pub(crate) fn call_dialog_mut(&mut self) -> Option<&mut CallDialog> {
        match &mut self.call {
            CallStatus::Active(dialog) => Some(dialog),
            _ => None,
        }
    }

    pub(crate) fn set_call(&mut self, call: CallStatus) {
        let open = matches!(call, CallStatus::Active(_));
        let was_open = self.call_dialog().is_some();
        self.call = call;
        if open != was_open {
            self.emit(SessionEvent::CallChanged { open });
        }
    }

    // -- entitlement --------------------------------------------------------

    pub fn is_verified(&self) -> bool {
        self.verified
    }

    pub(crate) fn set_verified(&mut self) {
        self.verified = true;
        self.emit(SessionEvent::Verified);
    }

    /// Badge shown next to the app title and on the profile.
    pub fn badge(&self) -> Option<&'static str> {
        self.verified.then_some(DEVELOPER_BADGE)
    }

    pub fn redeem_dialog(&self) -> Option<&RedeemDialog> {
        self.redeem_dialog.as_ref()
    }

    pub(crate) fn redeem_dialog_mut(&mut self) -> &mut Option<RedeemDialog> {
        &mut self.redeem_dialog
    }

    // -- profile ------------------------------------------------------------

    pub fn profile_draft(&self) -> Option<&ProfileDraft> {
        self.profile_draft.as_ref()
    }

    pub(crate) fn profile_draft_mut(&mut self) -> &mut Option<ProfileDraft> {
        &mut self.profile_draft
    }

    // -- notices ------------------------------------------------------------

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub(crate) fn push_notice(&mut self, notice: Notice) {
        self.emit(SessionEvent::Notice(notice.clone()));
        self.notices.push(notice);
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::seeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use supergram_shared::Sender;

    #[test]
    fn test_new_session_starts_at_phone_entry() {
        let state = SessionState::seeded();

        assert_eq!(state.registration().step(), RegistrationStep::PhoneEntry);
        assert!(state.active_chat().is_none());
        assert_eq!(state.view, View::Chats);
        assert!(state.settings.dark_mode);
        assert!(state.badge().is_none());
    }

    #[test]
    fn test_push_message_updates_preview() {
        let mut state = SessionState::seeded();
        let chat = ChatId::new("2");
        let id = state.next_message_id(Utc::now());

        state.push_message(&chat, Message::text(id, Sender::SelfUser, "Буду", Utc::now()));

        assert_eq!(state.messages(&chat).len(), 2);
        assert_eq!(state.chat(&chat).unwrap().last_message_preview, "Буду");
        assert_eq!(state.chat(&chat).unwrap().last_activity_label.len(), 5);
    }

    #[test]
    fn test_visible_chats_follow_search_query() {
        let mut state = SessionState::seeded();
        state.search_query = "мария".into();

        let visible = state.visible_chats();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].handle, "maria_p");
    }

    #[test]
    fn test_unknown_chat_has_no_messages() {
        let state = SessionState::seeded();
        assert!(state.messages(&ChatId::new("404")).is_empty());
    }
}
