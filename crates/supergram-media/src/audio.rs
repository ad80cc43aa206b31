use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::clip::VoiceClip;
use crate::device::{AudioCapture, MediaTrack};

/// How long [`RecordingSession::finish`] waits for the device side to close
/// the frame channel after the track is stopped.
const FINISH_TIMEOUT: Duration = Duration::from_secs(2);

/// Depth of the frame channel between a device and the recorder.
pub const FRAME_QUEUE_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub channels: u16,
    pub frame_size_ms: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            channels: 1,
            frame_size_ms: 20,
        }
    }
}

impl AudioConfig {
    pub fn frame_size_samples(&self) -> usize {
        (self.sample_rate as usize * self.frame_size_ms as usize) / 1000 * self.channels as usize
    }

    /// Whether a frame holds at least one sample.
    pub fn has_frames(&self) -> bool {
        self.frame_size_samples() > 0
    }

    /// Playback length of `samples` interleaved samples.
    pub fn duration_of(&self, samples: usize) -> Duration {
        let per_second = self.sample_rate as f64 * self.channels.max(1) as f64;
        if per_second <= 0.0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(samples as f64 / per_second)
    }
}

/// An in-progress voice-note recording.
///
/// Frames are drained from the device by a background task for as long as
/// the track is live; [`finish`](Self::finish) stops the track and turns the
/// buffered samples into a [`VoiceClip`].
pub struct RecordingSession {
    track: Box<dyn MediaTrack>,
    collector: JoinHandle<Vec<f32>>,
    config: AudioConfig,
    started_at: Instant,
}

impl RecordingSession {
    /// Start buffering. Must be called from within a tokio runtime.
    pub fn begin(capture: AudioCapture) -> Self {
        let AudioCapture {
            track,
            mut frames,
            config,
        } = capture;

        let collector = tokio::spawn(async move {
            let mut samples = Vec::new();
            while let Some(frame) = frames.recv().await {
                samples.extend_from_slice(&frame);
            }
            samples
        });

        debug!(sample_rate = config.sample_rate, "Voice recording started");

        Self {
            track,
            collector,
            config,
            started_at: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn config(&self) -> &AudioConfig {
        &self.config
    }

    /// Stop the microphone and assemble everything captured so far.
    ///
    /// The duration comes from the sample count; when the device delivered
    /// nothing it falls back to the wall-clock time spent recording.
    pub async fn finish(mut self) -> VoiceClip {
        let elapsed = self.started_at.elapsed();
        self.track.stop();

        let samples = match tokio::time::timeout(FINISH_TIMEOUT, &mut self.collector).await {
            Ok(Ok(samples)) => samples,
            Ok(Err(e)) => {
                warn!(error = %e, "Voice collector task failed");
                Vec::new()
            }
            Err(_) => {
                warn!("Microphone did not close its frame channel, dropping buffered audio");
                self.collector.abort();
                Vec::new()
            }
        };

        let duration = if samples.is_empty() {
            elapsed
        } else {
            self.config.duration_of(samples.len())
        };

        debug!(
            samples = samples.len(),
            duration_ms = duration.as_millis() as u64,
            "Voice recording finished"
        );

        VoiceClip::new(samples, self.config, duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_size_samples() {
        let config = AudioConfig::default();
        assert_eq!(config.frame_size_samples(), 960);

        let stereo = AudioConfig {
            channels: 2,
            ..AudioConfig::default()
        };
        assert_eq!(stereo.frame_size_samples(), 1920);
    }

    #[test]
    fn test_low_sample_rate_has_no_frames() {
        let config = AudioConfig {
            sample_rate: 10,
            ..AudioConfig::default()
        };
        assert_eq!(config.frame_size_samples(), 0);
        assert!(!config.has_frames());
        assert!(AudioConfig::default().has_frames());
    }

    #[test]
    fn test_duration_of() {
        let config = AudioConfig::default();
        assert_eq!(config.duration_of(48000), Duration::from_secs(1));
        assert_eq!(config.duration_of(24000), Duration::from_millis(500));

        let stereo = AudioConfig {
            channels: 2,
            ..AudioConfig::default()
        };
        assert_eq!(stereo.duration_of(96000), Duration::from_secs(1));
    }
}
