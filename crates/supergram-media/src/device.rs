//! The host capture capability.
//!
//! Two requests exist: audio only (voice notes) and audio plus video
//! (calls). Both may suspend while the user or the OS decides on the
//! permission, then resolve to live tracks or an error.

use std::future::Future;

use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::audio::AudioConfig;
use crate::lock::CaptureOwner;
use crate::video::VideoConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Microphone,
    Camera,
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceKind::Microphone => f.write_str("microphone"),
            DeviceKind::Camera => f.write_str("camera"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("Permission to use the {0} was denied")]
    PermissionDenied(DeviceKind),

    #[error("No {0} available")]
    NoDevice(DeviceKind),

    #[error("Capture devices are in use by the {0}")]
    DeviceBusy(CaptureOwner),

    #[error("Capture device error: {0}")]
    Device(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Audio,
    Video,
}

/// A live local track. Stopping a track releases the underlying device.
pub trait MediaTrack: Send {
    fn kind(&self) -> TrackKind;

    /// Disabled audio tracks produce silence, disabled video tracks black
    /// frames; the device stays open.
    fn set_enabled(&mut self, enabled: bool);

    fn is_enabled(&self) -> bool;

    fn stop(&mut self);

    fn is_live(&self) -> bool;
}

/// Microphone access granted for a voice note.
///
/// `frames` yields interleaved PCM frames until the track is stopped, at
/// which point the device side closes the channel.
pub struct AudioCapture {
    pub track: Box<dyn MediaTrack>,
    pub frames: mpsc::Receiver<Vec<f32>>,
    pub config: AudioConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamId(pub Uuid);

impl StreamId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StreamId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StreamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "stream:{}", self.0)
    }
}

/// Camera and microphone access granted for a call.
pub struct LocalStream {
    pub id: StreamId,
    pub tracks: Vec<Box<dyn MediaTrack>>,
    pub video: VideoConfig,
}

impl LocalStream {
    /// Enable or disable every track of `kind`; returns the new state, or
    /// `None` when the stream has no such track.
    pub fn set_enabled(&mut self, kind: TrackKind, enabled: bool) -> Option<bool> {
        let mut found = false;
        for track in self.tracks.iter_mut().filter(|t| t.kind() == kind) {
            track.set_enabled(enabled);
            found = true;
        }
        found.then_some(enabled)
    }

    pub fn is_enabled(&self, kind: TrackKind) -> bool {
        self.tracks
            .iter()
            .filter(|t| t.kind() == kind)
            .any(|t| t.is_enabled())
    }

    pub fn stop_all(&mut self) {
        for track in &mut self.tracks {
            track.stop();
        }
    }

    pub fn is_live(&self) -> bool {
        self.tracks.iter().any(|t| t.is_live())
    }
}

impl std::fmt::Debug for LocalStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStream")
            .field("id", &self.id)
            .field("tracks", &self.tracks.len())
            .finish()
    }
}

/// Access to the host's capture devices.
pub trait MediaDevices: Send + Sync {
    fn request_microphone(
        &self,
        config: &AudioConfig,
    ) -> impl Future<Output = Result<AudioCapture, CaptureError>> + Send;

    fn request_camera_and_microphone(
        &self,
        audio: &AudioConfig,
        video: &VideoConfig,
    ) -> impl Future<Output = Result<LocalStream, CaptureError>> + Send;
}
