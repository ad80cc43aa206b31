//! v001 -- Initial schema creation.
//!
//! Creates `chat_history` (one row per conversation) and the single-row
//! `app_settings` table.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Message history, one row per conversation
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS chat_history (
    chat_id    TEXT PRIMARY KEY NOT NULL,
    payload    TEXT NOT NULL,               -- JSON array of messages, oldest first
    updated_at TEXT NOT NULL                -- RFC-3339
);

-- ----------------------------------------------------------------
-- Settings
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS app_settings (
    id   INTEGER PRIMARY KEY CHECK (id = 1),
    json TEXT NOT NULL
);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
