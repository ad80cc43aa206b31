//! Voice-note recording: `Idle -> RequestingPermission -> Recording -> Idle`.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use supergram_media::{
    AudioConfig, CaptureError, CaptureOwner, ClipLibrary, DeviceLease, DeviceLock, MediaDevices,
    RecordingSession,
};
use supergram_shared::{ChatId, MessageBody, MessageId, VoiceNote};

use super::{conversation, PendingPermission};
use crate::persistence::Persistence;
use crate::state::{Notice, RecordingState, SessionState};

struct ActiveRecording {
    session: RecordingSession,
    chat: ChatId,
    _lease: DeviceLease,
}

pub struct VoiceNoteController<D> {
    devices: Arc<D>,
    lock: DeviceLock,
    clips: ClipLibrary,
    config: AudioConfig,
    active: Option<ActiveRecording>,
}

impl<D: MediaDevices> VoiceNoteController<D> {
    pub fn new(devices: Arc<D>, lock: DeviceLock, config: AudioConfig) -> Self {
        Self {
            devices,
            lock,
            clips: ClipLibrary::new(),
            config,
            active: None,
        }
    }

    /// Finished clips, keyed by the handle stored in each voice-note message.
    pub fn clips(&self) -> &ClipLibrary {
        &self.clips
    }

    pub fn config(&self) -> &AudioConfig {
        &self.config
    }

    /// Time spent in the current recording, if any.
    pub fn elapsed(&self) -> Option<Duration> {
        self.active.as_ref().map(|a| a.session.elapsed())
    }

    /// Ask for the microphone and start recording into the active chat.
    ///
    /// Returns `Ok(false)` without touching any device unless the user is
    /// registered, a chat is open and nothing is being recorded. Failures
    /// leave the recorder idle and are also pushed as a notice.
    pub async fn start(&mut self, state: &mut SessionState) -> Result<bool, CaptureError> {
        if !state.is_registered() {
            debug!("Ignoring recording request before registration");
            return Ok(false);
        }
        if *state.recording() != RecordingState::Idle || self.active.is_some() {
            debug!("Recording already in progress");
            return Ok(false);
        }
        let Some(chat) = state.active_chat_id().cloned() else {
            debug!("No active chat, not recording");
            return Ok(false);
        };

        let lease = match self.lock.try_acquire(CaptureOwner::VoiceNote) {
            Ok(lease) => lease,
            Err(owner) => return Err(fail(state, CaptureError::DeviceBusy(owner))),
        };

        let pending = PendingPermission::new(
            state,
            |s| s.set_recording(RecordingState::RequestingPermission),
            |s| s.set_recording(RecordingState::Idle),
        );
        let capture = match self.devices.request_microphone(&self.config).await {
            Ok(capture) => {
                pending.granted();
                capture
            }
            Err(e) => {
                drop(pending);
                drop(lease);
                return Err(fail(state, e));
            }
        };

        let session = RecordingSession::begin(capture);
        state.set_recording(RecordingState::Recording {
            chat: chat.clone(),
            started_at: Utc::now(),
        });
        info!(chat = %chat, "Voice recording started");

        self.active = Some(ActiveRecording {
            session,
            chat,
            _lease: lease,
        });
        Ok(true)
    }

    /// Stop recording and append the voice note to the chat the recording
    /// started in. Returns the new message id, or `None` when idle.
    pub async fn stop(
        &mut self,
        state: &mut SessionState,
        persistence: &Persistence,
    ) -> Option<MessageId> {
        let Some(ActiveRecording {
            session,
            chat,
            _lease: lease,
        }) = self.active.take()
        else {
            debug!("Not recording, nothing to stop");
            return None;
        };

        let clip = session.finish().await;
        drop(lease);

        let duration_secs = clip.duration_secs();
        let handle = self.clips.insert(clip);
        state.set_recording(RecordingState::Idle);
        info!(chat = %chat, duration_secs, clip = %handle, "Voice recording finished");

        let note = VoiceNote {
            clip: handle,
            duration_secs,
        };
        Some(conversation::append(
            state,
            persistence,
            &chat,
            MessageBody::Voice(note),
        ))
    }
}

fn fail(state: &mut SessionState, error: CaptureError) -> CaptureError {
    warn!(error = %error, "Microphone unavailable");
    state.push_notice(Notice::Capture(error.clone()));
    error
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::{conversation, registration};
    use supergram_media::{DeviceKind, FrameSource, Permission, SimulatedDevices};
    use supergram_shared::Sender;

    fn registered_in_chat(chat: &str) -> SessionState {
        let mut state = SessionState::seeded();
        registration::set_phone(&mut state, "+79991234567");
        registration::advance(&mut state);
        registration::set_display_name(&mut state, "Иван");
        registration::set_handle(&mut state, "ivan");
        registration::advance(&mut state);
        conversation::select_conversation(&mut state, &Persistence::none(), &ChatId::new(chat));
        state
    }

    fn scripted(seconds: u32) -> Arc<SimulatedDevices> {
        let config = AudioConfig::default();
        Arc::new(SimulatedDevices::new(FrameSource::scripted_seconds(
            &config, seconds,
        )))
    }

    #[tokio::test]
    async fn test_record_and_stop_appends_voice_note() {
        let devices = scripted(3);
        let mut voice =
            VoiceNoteController::new(devices, DeviceLock::new(), AudioConfig::default());
        let mut state = registered_in_chat("2");
        let persistence = Persistence::none();

        assert!(voice.start(&mut state).await.unwrap());
        assert!(state.is_recording());

        let id = voice.stop(&mut state, &persistence).await.unwrap();

        let last = state.messages(&ChatId::new("2")).last().unwrap();
        assert_eq!(last.id, id);
        assert_eq!(last.sender, Sender::SelfUser);
        let note = last.as_voice().unwrap();
        assert_eq!(note.duration_secs, 3);
        assert_eq!(voice.clips().get(&note.clip).unwrap().duration_secs(), 3);
        assert_eq!(*state.recording(), RecordingState::Idle);
    }

    #[tokio::test]
    async fn test_start_while_recording_is_noop() {
        let devices = scripted(1);
        let mut voice =
            VoiceNoteController::new(devices.clone(), DeviceLock::new(), AudioConfig::default());
        let mut state = registered_in_chat("1");

        assert!(voice.start(&mut state).await.unwrap());
        assert!(!voice.start(&mut state).await.unwrap());

        assert_eq!(devices.request_count(), 1);
        assert!(state.is_recording());
    }

    #[tokio::test]
    async fn test_requires_active_chat() {
        let devices = scripted(1);
        let mut voice =
            VoiceNoteController::new(devices.clone(), DeviceLock::new(), AudioConfig::default());
        let mut state = registered_in_chat("1");
        conversation::deselect_conversation(&mut state);

        assert!(!voice.start(&mut state).await.unwrap());
        assert_eq!(devices.request_count(), 0);
    }

    #[tokio::test]
    async fn test_denied_microphone_returns_to_idle() {
        let devices = Arc::new(
            SimulatedDevices::granting().with_permissions(Permission::Denied, Permission::Granted),
        );
        let lock = DeviceLock::new();
        let mut voice = VoiceNoteController::new(devices, lock.clone(), AudioConfig::default());
        let mut state = registered_in_chat("1");

        let err = voice.start(&mut state).await.unwrap_err();

        assert_eq!(err, CaptureError::PermissionDenied(DeviceKind::Microphone));
        assert_eq!(*state.recording(), RecordingState::Idle);
        assert_eq!(lock.holder(), None);
        assert_eq!(state.notices(), &[Notice::Capture(err)]);
    }

    #[tokio::test]
    async fn test_busy_devices_are_reported() {
        let lock = DeviceLock::new();
        let _call = lock.try_acquire(CaptureOwner::Call).unwrap();
        let devices = scripted(1);
        let mut voice = VoiceNoteController::new(devices.clone(), lock, AudioConfig::default());
        let mut state = registered_in_chat("1");

        let err = voice.start(&mut state).await.unwrap_err();

        assert_eq!(err, CaptureError::DeviceBusy(CaptureOwner::Call));
        assert_eq!(devices.request_count(), 0);
        assert_eq!(*state.recording(), RecordingState::Idle);
    }

    #[tokio::test]
    async fn test_note_goes_to_chat_where_recording_started() {
        let devices = scripted(1);
        let mut voice =
            VoiceNoteController::new(devices, DeviceLock::new(), AudioConfig::default());
        let persistence = Persistence::none();
        let mut state = registered_in_chat("1");

        voice.start(&mut state).await.unwrap();
        conversation::select_conversation(&mut state, &persistence, &ChatId::new("3"));
        voice.stop(&mut state, &persistence).await.unwrap();

        assert_eq!(state.messages(&ChatId::new("1")).len(), 3);
        assert_eq!(state.messages(&ChatId::new("3")).len(), 1);
    }

    #[tokio::test]
    async fn test_stop_when_idle_is_noop() {
        let mut voice =
            VoiceNoteController::new(scripted(1), DeviceLock::new(), AudioConfig::default());
        let mut state = registered_in_chat("1");

        assert!(voice.stop(&mut state, &Persistence::none()).await.is_none());
        assert_eq!(state.messages(&ChatId::new("1")).len(), 2);
    }

    #[tokio::test]
    async fn test_cancelled_start_leaves_recorder_idle() {
        let devices = scripted(1);
        let lock = DeviceLock::new();
        let mut voice =
            VoiceNoteController::new(devices.clone(), lock.clone(), AudioConfig::default());
        let mut state = registered_in_chat("1");

        let cancelled = tokio::time::timeout(Duration::ZERO, voice.start(&mut state)).await;

        assert!(cancelled.is_err());
        assert_eq!(*state.recording(), RecordingState::Idle);
        assert_eq!(lock.holder(), None);

        assert!(voice.start(&mut state).await.unwrap());
        assert!(state.is_recording());
        assert_eq!(devices.request_count(), 2);
    }
}
