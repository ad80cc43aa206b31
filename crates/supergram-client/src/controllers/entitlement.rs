//! Redeeming a code for the "Developer" badge.
//!
//! The controller never decides on its own whether a code is good; it hands
//! the code and the user's handle to the configured authority.

use tracing::{debug, info};

use supergram_shared::entitlement::{DenyAll, EntitlementAuthority};
use supergram_shared::EntitlementError;

use crate::state::{RedeemDialog, SessionState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedeemOutcome {
    Granted,
    Rejected(EntitlementError),
    AlreadyVerified,
    NotRegistered,
}

pub struct EntitlementController {
    authority: Box<dyn EntitlementAuthority>,
}

impl EntitlementController {
    pub fn new(authority: impl EntitlementAuthority + 'static) -> Self {
        Self::from_boxed(Box::new(authority))
    }

    pub fn from_boxed(authority: Box<dyn EntitlementAuthority>) -> Self {
        Self { authority }
    }

    /// Show the redeem dialog. Verified users have nothing to redeem.
    pub fn open_dialog(&self, state: &mut SessionState) -> bool {
        if !state.is_registered() || state.is_verified() {
            return false;
        }
        state
            .redeem_dialog_mut()
            .get_or_insert_with(RedeemDialog::default);
        true
    }

    pub fn close_dialog(&self, state: &mut SessionState) {
        state.redeem_dialog_mut().take();
    }

    pub fn set_input(&self, state: &mut SessionState, input: &str) {
        if let Some(dialog) = state.redeem_dialog_mut() {
            dialog.code = input.to_string();
        }
    }

    /// Redeem whatever is typed in the open dialog. `None` when no dialog is
    /// open.
    pub fn submit(&self, state: &mut SessionState) -> Option<RedeemOutcome> {
        let code = state.redeem_dialog()?.code.clone();
        Some(self.redeem(state, &code))
    }

    /// Ask the authority about `code`.
    ///
    /// On success the user becomes verified and the dialog closes. On
    /// rejection nothing changes: the dialog stays open with its input.
    pub fn redeem(&self, state: &mut SessionState, code: &str) -> RedeemOutcome {
        let Some(holder) = state.profile().map(|p| p.handle.clone()) else {
            debug!("Ignoring redemption before registration");
            return RedeemOutcome::NotRegistered;
        };
        if state.is_verified() {
            debug!("Already verified");
            return RedeemOutcome::AlreadyVerified;
        }

        match self.authority.verify(code, &holder) {
            Ok(grant) => {
                info!(badge = ?grant.badge, valid_until = ?grant.valid_until, "Code redeemed");
                state.set_verified();
                state.redeem_dialog_mut().take();
                RedeemOutcome::Granted
            }
            Err(e) => {
                info!(reason = %e, "Code rejected");
                RedeemOutcome::Rejected(e)
            }
        }
    }
}

impl Default for EntitlementController {
    fn default() -> Self {
        Self::new(DenyAll)
    }
}
