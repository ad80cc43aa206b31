//! # supergram-client
//!
//! View-state core of the superGram messenger: registration, the chat list
//! and conversations, voice notes, the simulated video call, the
//! "Developer" entitlement, profile and settings.
//!
//! There is no network. Conversations are seeded locally and histories are
//! persisted per chat through [`supergram_store`]; capture devices come from
//! [`supergram_media`].

pub mod config;
pub mod controllers;
pub mod error;
pub mod events;
pub mod persistence;
pub mod session;
pub mod state;

use tracing_subscriber::{fmt, EnvFilter};

pub use config::{ClientConfig, StorageMode};
pub use controllers::RedeemOutcome;
pub use error::ClientError;
pub use events::SessionEvent;
pub use persistence::Persistence;
pub use session::Session;
pub use state::{Notice, SessionState, View};

pub const DEFAULT_LOG_FILTER: &str =
    "supergram_client=debug,supergram_store=info,supergram_media=info,warn";

/// Install the global fmt subscriber, logging to stderr. `RUST_LOG`
/// overrides [`DEFAULT_LOG_FILTER`]. Calling it twice is harmless.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}
