//! Software stand-in for the host's microphone and camera.
//!
//! Permission answers can be flipped at runtime, and microphone frames come
//! either from a fixed script (deterministic, used by tests) or from a
//! generator that emits a quiet tone at the configured frame rate.

use std::f32::consts::TAU;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::audio::{AudioConfig, FRAME_QUEUE_DEPTH};
use crate::device::{
    AudioCapture, CaptureError, DeviceKind, LocalStream, MediaDevices, MediaTrack, StreamId,
    TrackKind,
};
use crate::video::VideoConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

#[derive(Debug, Clone)]
pub enum FrameSource {
    /// Deliver these frames as soon as the microphone opens, then stay
    /// silent until stopped.
    Scripted(Vec<Vec<f32>>),
    /// Emit one frame of a sine tone every `frame_size_ms`.
    Tone { frequency_hz: f32, amplitude: f32 },
}

impl FrameSource {
    /// `seconds` worth of full-scale frames for `config`.
    pub fn scripted_seconds(config: &AudioConfig, seconds: u32) -> Self {
        let frame = config.frame_size_samples();
        let per_second = (config.sample_rate as usize * config.channels as usize) / frame.max(1);
        let frames = (0..per_second * seconds as usize)
            .map(|_| vec![0.25f32; frame])
            .collect();
        FrameSource::Scripted(frames)
    }
}

pub struct SimulatedDevices {
    microphone: AtomicBool,
    camera: AtomicBool,
    source: FrameSource,
    requests: AtomicUsize,
}

impl SimulatedDevices {
    pub fn new(source: FrameSource) -> Self {
        Self {
            microphone: AtomicBool::new(true),
            camera: AtomicBool::new(true),
            source,
            requests: AtomicUsize::new(0),
        }
    }

    /// Devices that grant every request and play a quiet 440 Hz tone.
    pub fn granting() -> Self {
        Self::new(FrameSource::Tone {
            frequency_hz: 440.0,
            amplitude: 0.1,
        })
    }

    pub fn with_permissions(self, microphone: Permission, camera: Permission) -> Self {
        self.set_microphone_permission(microphone);
        self.set_camera_permission(camera);
        self
    }

    pub fn set_microphone_permission(&self, permission: Permission) {
        self.microphone
            .store(permission == Permission::Granted, Ordering::SeqCst);
    }

    pub fn set_camera_permission(&self, permission: Permission) {
        self.camera
            .store(permission == Permission::Granted, Ordering::SeqCst);
    }

    /// Number of device requests made so far, granted or not.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn spawn_microphone(&self, config: &AudioConfig) -> AudioCapture {
        let (frame_tx, frames) = mpsc::channel(FRAME_QUEUE_DEPTH);
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        match self.source.clone() {
            FrameSource::Scripted(script) => {
                tokio::spawn(async move {
                    for frame in script {
                        if frame_tx.send(frame).await.is_err() {
                            return;
                        }
                    }
                    let _ = stop_rx.await;
                });
            }
            FrameSource::Tone {
                frequency_hz,
                amplitude,
            } => {
                let config = config.clone();
                tokio::spawn(async move {
                    let mut stop_rx = stop_rx;
                    let mut ticker =
                        tokio::time::interval(Duration::from_millis(config.frame_size_ms as u64));
                    let step = TAU * frequency_hz / config.sample_rate as f32;
                    let mut phase = 0.0f32;
                    loop {
                        tokio::select! {
                            _ = &mut stop_rx => break,
                            _ = ticker.tick() => {
                                let mut frame = Vec::with_capacity(config.frame_size_samples());
                                for _ in 0..config.frame_size_samples() / config.channels.max(1) as usize {
                                    let sample = amplitude * phase.sin();
                                    phase = (phase + step) % TAU;
                                    for _ in 0..config.channels.max(1) {
                                        frame.push(sample);
                                    }
                                }
                                if frame_tx.send(frame).await.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                });
            }
        }

        AudioCapture {
            track: Box::new(SimulatedTrack::new(TrackKind::Audio, Some(stop_tx))),
            frames,
            config: config.clone(),
        }
    }
}

impl Default for SimulatedDevices {
    fn default() -> Self {
        Self::granting()
    }
}

impl MediaDevices for SimulatedDevices {
    async fn request_microphone(&self, config: &AudioConfig) -> Result<AudioCapture, CaptureError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        if !self.microphone.load(Ordering::SeqCst) {
            debug!("Simulated microphone request denied");
            return Err(CaptureError::PermissionDenied(DeviceKind::Microphone));
        }

        info!(sample_rate = config.sample_rate, "Simulated microphone opened");
        Ok(self.spawn_microphone(config))
    }

    async fn request_camera_and_microphone(
        &self,
        _audio: &AudioConfig,
        video: &VideoConfig,
    ) -> Result<LocalStream, CaptureError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        if !self.camera.load(Ordering::SeqCst) {
            debug!("Simulated camera request denied");
            return Err(CaptureError::PermissionDenied(DeviceKind::Camera));
        }
        if !self.microphone.load(Ordering::SeqCst) {
            debug!("Simulated microphone request denied");
            return Err(CaptureError::PermissionDenied(DeviceKind::Microphone));
        }

        info!(
            width = video.width,
            height = video.height,
            fps = video.fps,
            "Simulated camera opened"
        );

        Ok(LocalStream {
            id: StreamId::new(),
            tracks: vec![
                Box::new(SimulatedTrack::new(TrackKind::Audio, None)),
                Box::new(SimulatedTrack::new(TrackKind::Video, None)),
            ],
            video: video.clone(),
        })
    }
}

struct SimulatedTrack {
    kind: TrackKind,
    enabled: bool,
    live: bool,
    stop_tx: Option<oneshot::Sender<()>>,
}

impl SimulatedTrack {
    fn new(kind: TrackKind, stop_tx: Option<oneshot::Sender<()>>) -> Self {
        Self {
            kind,
            enabled: true,
            live: true,
            stop_tx,
        }
    }
}

impl MediaTrack for SimulatedTrack {
    fn kind(&self) -> TrackKind {
        self.kind
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        self.live = false;
    }

    fn is_live(&self) -> bool {
        self.live
    }
}
