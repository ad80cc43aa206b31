use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntitlementError {
    #[error("Code rejected by the entitlement authority")]
    Rejected,

    #[error("Redemption token expired")]
    Expired,

    #[error("Redemption token was issued to another user")]
    WrongHolder,

    #[error("Malformed redemption token: {0}")]
    MalformedToken(String),

    #[error("Invalid authority key: {0}")]
    InvalidKey(String),
}
