//! Microphone capture through cpal.
//!
//! cpal streams are not `Send`, so each capture owns a dedicated thread that
//! builds the input stream, plays it and keeps it alive until the track is
//! stopped. Dropping the stream drops the callback and with it the frame
//! sender, which ends the recorder's collector.
//!
//! There is no camera backend: calls fail with [`CaptureError::NoDevice`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc as std_mpsc;
use std::sync::Arc;
use std::thread;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::audio::{AudioConfig, FRAME_QUEUE_DEPTH};
use crate::device::{
    AudioCapture, CaptureError, DeviceKind, LocalStream, MediaDevices, MediaTrack, TrackKind,
};
use crate::video::VideoConfig;

#[derive(Debug, Clone, Copy, Default)]
pub struct CpalDevices;

impl CpalDevices {
    pub fn new() -> Self {
        Self
    }
}

impl MediaDevices for CpalDevices {
    async fn request_microphone(&self, config: &AudioConfig) -> Result<AudioCapture, CaptureError> {
        let config = config.clone();
        let (frame_tx, frames) = mpsc::channel(FRAME_QUEUE_DEPTH);
        let (ready_tx, ready_rx) = oneshot::channel();
        let (stop_tx, stop_rx) = std_mpsc::channel::<()>();
        let enabled = Arc::new(AtomicBool::new(true));

        let thread_config = config.clone();
        let thread_enabled = enabled.clone();
        thread::Builder::new()
            .name("supergram-mic".into())
            .spawn(move || {
                run_input_stream(thread_config, frame_tx, thread_enabled, ready_tx, stop_rx)
            })
            .map_err(|e| CaptureError::Device(e.to_string()))?;

        match ready_rx.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(CaptureError::Device("capture thread exited".into())),
        }

        Ok(AudioCapture {
            track: Box::new(CpalTrack {
                enabled,
                stop_tx: Some(stop_tx),
            }),
            frames,
            config,
        })
    }

    async fn request_camera_and_microphone(
        &self,
        _audio: &AudioConfig,
        _video: &VideoConfig,
    ) -> Result<LocalStream, CaptureError> {
        Err(CaptureError::NoDevice(DeviceKind::Camera))
    }
}

fn run_input_stream(
    config: AudioConfig,
    frame_tx: mpsc::Sender<Vec<f32>>,
    enabled: Arc<AtomicBool>,
    ready_tx: oneshot::Sender<Result<(), CaptureError>>,
    stop_rx: std_mpsc::Receiver<()>,
) {
    let stream = match build_input_stream(&config, frame_tx, enabled) {
        Ok(stream) => stream,
        Err(e) => {
            let _ = ready_tx.send(Err(e));
            return;
        }
    };

    if let Err(e) = stream.play() {
        let _ = ready_tx.send(Err(CaptureError::Device(e.to_string())));
        return;
    }

    let _ = ready_tx.send(Ok(()));
    debug!("Audio capture started");

    // Returns on stop() or when the track is dropped.
    let _ = stop_rx.recv();
    drop(stream);
    debug!("Audio capture stopped");
}

fn build_input_stream(
    config: &AudioConfig,
    frame_tx: mpsc::Sender<Vec<f32>>,
    enabled: Arc<AtomicBool>,
) -> Result<cpal::Stream, CaptureError> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or(CaptureError::NoDevice(DeviceKind::Microphone))?;

    info!(device = ?device.name(), "Using input device");

    let stream_config = cpal::StreamConfig {
        channels: config.channels,
        sample_rate: cpal::SampleRate(config.sample_rate),
        buffer_size: cpal::BufferSize::Default,
    };

    if !config.has_frames() {
        return Err(CaptureError::Device(format!(
            "{} Hz is too low for {} ms frames",
            config.sample_rate, config.frame_size_ms
        )));
    }
    let frame_size = config.frame_size_samples();
    let mut buffer = Vec::with_capacity(frame_size);

    device
        .build_input_stream(
            &stream_config,
            move |data: &[f32], _info: &cpal::InputCallbackInfo| {
                if enabled.load(Ordering::Relaxed) {
                    buffer.extend_from_slice(data);
                } else {
                    // Silence keeps the clip length in step with wall time.
                    buffer.extend(std::iter::repeat(0.0f32).take(data.len()));
                }
                while buffer.len() >= frame_size {
                    let frame: Vec<f32> = buffer.drain(..frame_size).collect();
                    if frame_tx.try_send(frame).is_err() {
                        warn!("Audio frame channel full, dropping frame");
                    }
                }
            },
            move |err| {
                error!("Audio input error: {err}");
            },
            None,
        )
        .map_err(|e| CaptureError::Device(e.to_string()))
}

struct CpalTrack {
    enabled: Arc<AtomicBool>,
    stop_tx: Option<std_mpsc::Sender<()>>,
}

impl MediaTrack for CpalTrack {
    fn kind(&self) -> TrackKind {
        TrackKind::Audio
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
    }

    fn is_live(&self) -> bool {
        self.stop_tx.is_some()
    }
}
