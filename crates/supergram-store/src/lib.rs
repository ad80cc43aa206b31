//! # supergram-store
//!
//! Durable local storage for the superGram client.
//!
//! The store is a small key/value space: one entry per conversation holding
//! the JSON-serialized, ordered message history, plus one entry for the
//! user's settings. Two backends implement the [`HistoryStore`] and
//! [`SettingsStore`] seams: a SQLite-backed [`Database`] and an in-process
//! [`MemoryStore`].

pub mod database;
pub mod history;
pub mod memory;
pub mod migrations;
pub mod models;
pub mod settings;

mod error;

pub use database::Database;
pub use error::StoreError;
pub use history::{HistoryStore, LocalStore, SettingsStore};
pub use memory::MemoryStore;
pub use models::AppSettings;
