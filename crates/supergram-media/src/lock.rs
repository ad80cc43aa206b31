//! Exclusive ownership of the capture devices.
//!
//! The microphone and camera are held by at most one session at a time:
//! either a voice-note recording or a call. A [`DeviceLease`] is acquired
//! before the permission request and released when dropped.

use std::sync::{Arc, Mutex};

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOwner {
    VoiceNote,
    Call,
}

impl std::fmt::Display for CaptureOwner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureOwner::VoiceNote => f.write_str("voice recorder"),
            CaptureOwner::Call => f.write_str("call"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeviceLock {
    holder: Arc<Mutex<Option<CaptureOwner>>>,
}

impl DeviceLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the devices for `owner`, or report who holds them.
    pub fn try_acquire(&self, owner: CaptureOwner) -> Result<DeviceLease, CaptureOwner> {
        let mut holder = self.holder.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(current) = *holder {
            return Err(current);
        }
        *holder = Some(owner);
        debug!(%owner, "capture devices acquired");
        Ok(DeviceLease {
            lock: self.clone(),
            owner,
        })
    }

    pub fn holder(&self) -> Option<CaptureOwner> {
        *self.holder.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[derive(Debug)]
pub struct DeviceLease {
    lock: DeviceLock,
    owner: CaptureOwner,
}

impl DeviceLease {
    pub fn owner(&self) -> CaptureOwner {
        self.owner
    }
}

impl Drop for DeviceLease {
    fn drop(&mut self) {
        let mut holder = self.lock.holder.lock().unwrap_or_else(|e| e.into_inner());
        if *holder == Some(self.owner) {
            *holder = None;
            debug!(owner = %self.owner, "capture devices released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_owner_is_refused() {
        let lock = DeviceLock::new();
        let _lease = lock.try_acquire(CaptureOwner::VoiceNote).unwrap();

        assert_eq!(
            lock.try_acquire(CaptureOwner::Call).unwrap_err(),
            CaptureOwner::VoiceNote
        );
        assert_eq!(
            lock.try_acquire(CaptureOwner::VoiceNote).unwrap_err(),
            CaptureOwner::VoiceNote
        );
    }

    #[test]
    fn test_drop_releases() {
        let lock = DeviceLock::new();
        let lease = lock.try_acquire(CaptureOwner::Call).unwrap();
        assert_eq!(lock.holder(), Some(CaptureOwner::Call));

        drop(lease);

        assert_eq!(lock.holder(), None);
        assert!(lock.try_acquire(CaptureOwner::VoiceNote).is_ok());
    }
}
