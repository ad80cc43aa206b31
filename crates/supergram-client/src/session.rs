//! One running client: state, storage, devices and the entitlement
//! authority wired together.
//!
//! Front ends talk to a [`Session`] only. Each method forwards to the
//! matching controller in [`crate::controllers`].

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use supergram_media::{AudioConfig, CaptureError, ClipLibrary, DeviceLock, MediaDevices, VideoConfig};
use supergram_shared::entitlement::EntitlementAuthority;
use supergram_shared::{ChatId, MessageId};

use crate::config::ClientConfig;
use crate::controllers::{
    conversation, navigation, profile, registration, settings, CallController,
    EntitlementController, RedeemOutcome, VoiceNoteController,
};
use crate::error::ClientError;
use crate::events::SessionEvent;
use crate::persistence::Persistence;
use crate::state::{SessionState, View};

pub struct Session<D> {
    state: SessionState,
    persistence: Persistence,
    voice: VoiceNoteController<D>,
    call: CallController<D>,
    entitlement: EntitlementController,
}

impl<D: MediaDevices> Session<D> {
    pub fn new(
        state: SessionState,
        persistence: Persistence,
        devices: D,
        authority: Box<dyn EntitlementAuthority>,
        audio: AudioConfig,
        video: VideoConfig,
    ) -> Self {
        let devices = Arc::new(devices);
        let lock = DeviceLock::new();
        let mut session = Self {
            state,
            voice: VoiceNoteController::new(devices.clone(), lock.clone(), audio.clone()),
            call: CallController::new(devices, lock, audio, video),
            entitlement: EntitlementController::from_boxed(authority),
            persistence,
        };
        settings::load(&mut session.state, &session.persistence);
        session
    }

    /// Build a seeded session from `config`.
    pub fn from_config(config: &ClientConfig, devices: D) -> Result<Self, ClientError> {
        let persistence = config.open_persistence()?;
        let authority = config.authority()?;
        info!(durable = persistence.is_durable(), "Session starting");
        Ok(Self::new(
            SessionState::seeded(),
            persistence,
            devices,
            authority,
            config.audio.clone(),
            config.video.clone(),
        ))
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SessionEvent> {
        self.state.subscribe()
    }

    pub fn persistence(&self) -> &Persistence {
        &self.persistence
    }

    pub fn clips(&self) -> &ClipLibrary {
        self.voice.clips()
    }

    // -- registration -------------------------------------------------------

    pub fn set_phone(&mut self, input: &str) {
        registration::set_phone(&mut self.state, input);
    }

    pub fn set_display_name(&mut self, input: &str) {
        registration::set_display_name(&mut self.state, input);
    }

    pub fn set_handle(&mut self, input: &str) {
        registration::set_handle(&mut self.state, input);
    }

    pub fn can_advance(&self) -> bool {
        registration::can_advance(&self.state)
    }

    pub fn advance(&mut self) -> bool {
        registration::advance(&mut self.state)
    }

    pub fn back(&mut self) -> bool {
        registration::back(&mut self.state)
    }

    // -- navigation ---------------------------------------------------------

    pub fn navigate(&mut self, view: View) -> bool {
        navigation::navigate(&mut self.state, view)
    }

    pub fn set_search_query(&mut self, query: &str) {
        navigation::set_search_query(&mut self.state, query);
    }

    // -- conversations ------------------------------------------------------

    pub fn select_conversation(&mut self, chat: &ChatId) -> bool {
        conversation::select_conversation(&mut self.state, &self.persistence, chat)
    }

    pub fn deselect_conversation(&mut self) {
        conversation::deselect_conversation(&mut self.state);
    }

    pub fn set_compose(&mut self, input: &str) {
        conversation::set_compose(&mut self.state, input);
    }

    pub fn send_text(&mut self, body: &str) -> Option<MessageId> {
        conversation::send_text(&mut self.state, &self.persistence, body)
    }

    pub fn send_compose(&mut self) -> Option<MessageId> {
        conversation::send_compose(&mut self.state, &self.persistence)
    }

    // -- voice notes --------------------------------------------------------

    pub async fn start_recording(&mut self) -> Result<bool, CaptureError> {
        self.voice.start(&mut self.state).await
    }

    pub async fn stop_recording(&mut self) -> Option<MessageId> {
        self.voice.stop(&mut self.state, &self.persistence).await
    }

    // -- calls --------------------------------------------------------------

    pub async fn start_call(&mut self) -> Result<bool, CaptureError> {
        self.call.start(&mut self.state).await
    }

    pub fn end_call(&mut self) -> bool {
        self.call.end(&mut self.state)
    }

    pub fn toggle_mute(&mut self) -> Option<bool> {
        self.call.toggle_mute(&mut self.state)
    }

    pub fn toggle_video(&mut self) -> Option<bool> {
        self.call.toggle_video(&mut self.state)
    }

    // -- entitlement --------------------------------------------------------

    pub fn open_redeem_dialog(&mut self) -> bool {
        self.entitlement.open_dialog(&mut self.state)
    }

    pub fn close_redeem_dialog(&mut self) {
        self.entitlement.close_dialog(&mut self.state);
    }

    pub fn set_redeem_input(&mut self, input: &str) {
        self.entitlement.set_input(&mut self.state, input);
    }

    pub fn submit_redeem(&mut self) -> Option<RedeemOutcome> {
        self.entitlement.submit(&mut self.state)
    }

    pub fn redeem(&mut self, code: &str) -> RedeemOutcome {
        self.entitlement.redeem(&mut self.state, code)
    }

    // -- profile and settings -----------------------------------------------

    pub fn begin_profile_edit(&mut self) -> bool {
        profile::begin_edit(&mut self.state)
    }

    pub fn set_draft_display_name(&mut self, input: &str) {
        profile::set_draft_display_name(&mut self.state, input);
    }

    pub fn set_draft_handle(&mut self, input: &str) {
        profile::set_draft_handle(&mut self.state, input);
    }

    pub fn save_profile_edit(&mut self) -> bool {
        profile::save(&mut self.state)
    }

    pub fn cancel_profile_edit(&mut self) {
        profile::cancel(&mut self.state);
    }

    pub fn set_dark_mode(&mut self, enabled: bool) {
        settings::set_dark_mode(&mut self.state, &self.persistence, enabled);
    }

    pub fn set_push_notifications(&mut self, enabled: bool) {
        settings::set_push_notifications(&mut self.state, &self.persistence, enabled);
    }

    pub fn take_notices(&mut self) -> Vec<crate::state::Notice> {
        self.state.take_notices()
    }
}
