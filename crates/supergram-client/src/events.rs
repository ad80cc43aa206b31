use tokio::sync::mpsc;

use supergram_shared::{ChatId, MessageId};

use crate::state::{Notice, RegistrationStep, View};

/// Change notifications for whatever renders the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    RegistrationChanged(RegistrationStep),
    ViewChanged(View),
    ChatSelected(ChatId),
    ChatClosed,
    HistoryLoaded { chat: ChatId, count: usize },
    MessageAppended { chat: ChatId, id: MessageId },
    RecordingChanged { active: bool },
    CallChanged { open: bool },
    Verified,
    ProfileUpdated,
    SettingsChanged,
    Notice(Notice),
}

#[derive(Debug, Clone, Default)]
pub(crate) struct EventSink {
    tx: Option<mpsc::UnboundedSender<SessionEvent>>,
}

impl EventSink {
    pub(crate) fn new(tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    pub(crate) fn emit(&self, event: SessionEvent) {
        let Some(tx) = &self.tx else {
            return;
        };
        if let Err(e) = tx.send(event) {
            tracing::debug!(event = ?e.0, "Event dropped, no subscriber");
        }
    }
}
