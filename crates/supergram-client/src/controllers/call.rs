//! The video call dialog.
//!
//! There is no remote side. The dialog shows two panes, and the peer pane
//! mirrors the local camera so the layout can be exercised end to end.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use supergram_media::{
    AudioConfig, CaptureError, CaptureOwner, DeviceLease, DeviceLock, LocalStream, MediaDevices,
    TrackKind, VideoConfig,
};

use super::PendingPermission;
use crate::state::{CallDialog, CallStatus, Notice, Pane, PaneFeed, SessionState};

pub const SELF_PANE_LABEL: &str = "Вы";

struct ActiveCall {
    stream: LocalStream,
    _lease: DeviceLease,
}

pub struct CallController<D> {
    devices: Arc<D>,
    lock: DeviceLock,
    audio: AudioConfig,
    video: VideoConfig,
    active: Option<ActiveCall>,
}

impl<D: MediaDevices> CallController<D> {
    pub fn new(devices: Arc<D>, lock: DeviceLock, audio: AudioConfig, video: VideoConfig) -> Self {
        Self {
            devices,
            lock,
            audio,
            video,
            active: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Open the camera and microphone and show the call dialog for the
    /// active chat.
    pub async fn start(&mut self, state: &mut SessionState) -> Result<bool, CaptureError> {
        if !state.is_registered() {
            debug!("Ignoring call request before registration");
            return Ok(false);
        }
        if *state.call() != CallStatus::Idle || self.active.is_some() {
            debug!("Call already in progress");
            return Ok(false);
        }
        let Some((chat, peer_name)) = state
            .active_chat()
            .map(|c| (c.id.clone(), c.display_name.clone()))
        else {
            debug!("No active chat, not calling");
            return Ok(false);
        };

        let lease = match self.lock.try_acquire(CaptureOwner::Call) {
            Ok(lease) => lease,
            Err(owner) => return Err(fail(state, CaptureError::DeviceBusy(owner))),
        };

        let pending = PendingPermission::new(
            state,
            |s| s.set_call(CallStatus::RequestingPermission),
            |s| s.set_call(CallStatus::Idle),
        );
        let stream = match self
            .devices
            .request_camera_and_microphone(&self.audio, &self.video)
            .await
        {
            Ok(stream) => {
                pending.granted();
                stream
            }
            Err(e) => {
                drop(pending);
                drop(lease);
                return Err(fail(state, e));
            }
        };

        let dialog = CallDialog {
            chat: chat.clone(),
            self_pane: Pane {
                label: SELF_PANE_LABEL.to_string(),
                feed: PaneFeed::Local(stream.id),
            },
            peer_pane: Pane {
                label: peer_name,
                feed: PaneFeed::LocalMirror(stream.id),
            },
            muted: !stream.is_enabled(TrackKind::Audio),
            video_enabled: stream.is_enabled(TrackKind::Video),
            started_at: Utc::now(),
        };

        info!(chat = %chat, stream = %stream.id, "Call started");
        state.set_call(CallStatus::Active(dialog));
        self.active = Some(ActiveCall {
            stream,
            _lease: lease,
        });
        Ok(true)
    }

    /// Hang up: stop every local track and release the devices.
    pub fn end(&mut self, state: &mut SessionState) -> bool {
        let Some(ActiveCall {
            mut stream,
            _lease: lease,
        }) = self.active.take()
        else {
            debug!("No call to end");
            return false;
        };

        stream.stop_all();
        drop(lease);

        let seconds = state
            .call_dialog()
            .map(|d| (Utc::now() - d.started_at).num_seconds())
            .unwrap_or_default();
        state.set_call(CallStatus::Idle);
        info!(stream = %stream.id, seconds, "Call ended");
        true
    }

    /// Flip the microphone; returns whether the call is now muted.
    pub fn toggle_mute(&mut self, state: &mut SessionState) -> Option<bool> {
        let active = self.active.as_mut()?;
        let dialog = state.call_dialog_mut()?;

        let muted = !dialog.muted;
        active.stream.set_enabled(TrackKind::Audio, !muted);
        dialog.muted = muted;
        debug!(muted, "Call microphone toggled");
        Some(muted)
    }

    /// Flip the camera; returns whether video is now on.
    pub fn toggle_video(&mut self, state: &mut SessionState) -> Option<bool> {
        let active = self.active.as_mut()?;
        let dialog = state.call_dialog_mut()?;

        let enabled = !dialog.video_enabled;
        active.stream.set_enabled(TrackKind::Video, enabled);
        dialog.video_enabled = enabled;
        debug!(enabled, "Call camera toggled");
        Some(enabled)
    }
}

fn fail(state: &mut SessionState, error: CaptureError) -> CaptureError {
    warn!(error = %error, "Camera or microphone unavailable");
    state.push_notice(Notice::Capture(error.clone()));
    error
}
