//! # supergram-media
//!
//! Local capture for voice notes and the simulated video call.
//!
//! Host devices sit behind the [`MediaDevices`] capability so that the
//! controllers never talk to hardware directly: the client runs against
//! [`SimulatedDevices`] in tests and in the terminal front end, and against
//! the cpal microphone backend when built with the `native-audio` feature.
//! A single [`DeviceLock`] makes sure only one capture session (a recording
//! or a call) holds the devices at a time.

pub mod audio;
pub mod clip;
pub mod device;
pub mod lock;
#[cfg(feature = "native-audio")]
pub mod native;
pub mod simulated;
pub mod video;

pub use audio::{AudioConfig, RecordingSession};
pub use clip::{ClipLibrary, VoiceClip};
pub use device::{
    AudioCapture, CaptureError, DeviceKind, LocalStream, MediaDevices, MediaTrack, StreamId,
    TrackKind,
};
pub use lock::{CaptureOwner, DeviceLease, DeviceLock};
#[cfg(feature = "native-audio")]
pub use native::CpalDevices;
pub use simulated::{FrameSource, Permission, SimulatedDevices};
pub use video::VideoConfig;
