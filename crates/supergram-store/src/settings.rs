use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::history::SettingsStore;
use crate::models::AppSettings;

impl SettingsStore for Database {
    fn load_settings(&self) -> Result<Option<AppSettings>> {
        let json: Option<String> = self
            .conn()
            .query_row("SELECT json FROM app_settings WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()?;

        match json {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|source| StoreError::Corrupt {
                    key: "settings".into(),
                    source,
                }),
            None => Ok(None),
        }
    }

    fn save_settings(&self, settings: &AppSettings) -> Result<()> {
        let json = serde_json::to_string(settings)?;
        self.conn().execute(
            "INSERT OR REPLACE INTO app_settings (id, json) VALUES (1, ?1)",
            params![json],
        )?;
        tracing::info!("Settings updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_round_trip() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.load_settings().unwrap().is_none());

        let settings = AppSettings {
            dark_mode: false,
            push_notifications: true,
        };
        db.save_settings(&settings).unwrap();

        assert_eq!(db.load_settings().unwrap(), Some(settings));
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let db = Database::open_in_memory().unwrap();
        db.conn()
            .execute(
                "INSERT INTO app_settings (id, json) VALUES (1, ?1)",
                params![r#"{"darkMode":false}"#],
            )
            .unwrap();

        let settings = db.load_settings().unwrap().unwrap();
        assert!(!settings.dark_mode);
        assert!(settings.push_notifications);
    }
}
