//! Operations on a [`SessionState`](crate::state::SessionState).
//!
//! Stateless controllers are free functions taking the state by `&mut`.
//! The media controllers own their device handles and are structs; the
//! entitlement controller owns its authority.

pub mod call;
pub mod conversation;
pub mod entitlement;
pub mod navigation;
pub mod profile;
pub mod registration;
pub mod settings;
pub mod voice;

pub use call::CallController;
pub use entitlement::{EntitlementController, RedeemOutcome};
pub use voice::VoiceNoteController;

use crate::state::SessionState;

/// Holds the state while a device prompt is pending. Dropping it before
/// [`PendingPermission::granted`] runs `reset`, so a cancelled request
/// cannot leave the state stuck in `RequestingPermission`.
pub(crate) struct PendingPermission<'a> {
    state: &'a mut SessionState,
    reset: fn(&mut SessionState),
    armed: bool,
}

impl<'a> PendingPermission<'a> {
    pub(crate) fn new(
        state: &'a mut SessionState,
        enter: fn(&mut SessionState),
        reset: fn(&mut SessionState),
    ) -> Self {
        enter(state);
        Self {
            state,
            reset,
            armed: true,
        }
    }

    pub(crate) fn granted(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingPermission<'_> {
    fn drop(&mut self) {
        if self.armed {
            (self.reset)(self.state);
        }
    }
}
