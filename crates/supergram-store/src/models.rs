//! Persisted structs other than messages.

use serde::{Deserialize, Serialize};

/// User preferences from the settings screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub dark_mode: bool,
    pub push_notifications: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            dark_mode: true,
            push_notifications: true,
        }
    }
}
