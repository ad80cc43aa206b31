use thiserror::Error;

use supergram_media::CaptureError;
use supergram_shared::EntitlementError;
use supergram_store::StoreError;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("Entitlement error: {0}")]
    Entitlement(#[from] EntitlementError),
}
