//! # supergram-shared
//!
//! Domain types shared by every superGram crate: identifiers, messages,
//! the seeded conversation list, input validation rules and the
//! entitlement authorities used to unlock the "Developer" badge.

pub mod chat;
pub mod constants;
pub mod entitlement;
pub mod error;
pub mod message;
pub mod types;
pub mod validation;

pub use chat::Chat;
pub use error::EntitlementError;
pub use message::{Message, MessageBody, MessageIdGenerator, VoiceNote};
pub use types::{ChatId, ClipHandle, MessageId, Sender};
