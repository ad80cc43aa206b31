//! Finished voice clips and the library that keeps them playable.
//!
//! A voice-note message only stores a [`ClipHandle`]; the samples live here
//! for the lifetime of the session.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use supergram_shared::ClipHandle;

use crate::audio::AudioConfig;

#[derive(Debug, Clone)]
pub struct VoiceClip {
    pub samples: Vec<f32>,
    pub config: AudioConfig,
    pub duration: Duration,
}

impl VoiceClip {
    pub fn new(samples: Vec<f32>, config: AudioConfig, duration: Duration) -> Self {
        Self {
            samples,
            config,
            duration,
        }
    }

    /// Duration rounded to whole seconds, as shown on the message bubble.
    /// Any captured audio counts as at least one second.
    pub fn duration_secs(&self) -> u32 {
        let secs = self.duration.as_secs_f64().round() as u32;
        if secs == 0 && !self.duration.is_zero() {
            1
        } else {
            secs
        }
    }

    /// Peak absolute amplitude, 0.0 for silence.
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |peak, s| peak.max(s.abs()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClipLibrary {
    clips: Arc<Mutex<HashMap<ClipHandle, Arc<VoiceClip>>>>,
}

impl ClipLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, clip: VoiceClip) -> ClipHandle {
        let handle = ClipHandle::new();
        self.clips
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(handle, Arc::new(clip));
        handle
    }

    pub fn get(&self, handle: &ClipHandle) -> Option<Arc<VoiceClip>> {
        self.clips
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(handle)
            .cloned()
    }

    /// Drop a clip. Messages that still reference it stay valid but become
    /// unplayable.
    pub fn release(&self, handle: &ClipHandle) -> bool {
        self.clips
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(handle)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.clips.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_get_release() {
        let library = ClipLibrary::new();
        let clip = VoiceClip::new(vec![0.5, -0.75], AudioConfig::default(), Duration::from_millis(1400));

        let handle = library.insert(clip);
        let stored = library.get(&handle).unwrap();

        assert_eq!(stored.duration_secs(), 1);
        assert_eq!(stored.peak(), 0.75);
        assert!(library.release(&handle));
        assert!(library.get(&handle).is_none());
        assert!(library.is_empty());
    }

    #[test]
    fn test_short_clip_shows_one_second() {
        let short = VoiceClip::new(
            vec![0.1; 960],
            AudioConfig::default(),
            Duration::from_millis(20),
        );
        let empty = VoiceClip::new(Vec::new(), AudioConfig::default(), Duration::ZERO);

        assert_eq!(short.duration_secs(), 1);
        assert_eq!(empty.duration_secs(), 0);
    }
}
