//! Client configuration loaded from environment variables.
//!
//! Every setting has a default so the client starts with zero
//! configuration: SQLite storage in the platform data directory, 48 kHz mono
//! audio and an authority that rejects every code.

use std::path::PathBuf;
use std::str::FromStr;

use tracing::{info, warn};

use supergram_media::{AudioConfig, VideoConfig};
use supergram_shared::entitlement::{
    DenyAll, DigestAuthority, EntitlementAuthority, TokenAuthority,
};
use supergram_store::{Database, MemoryStore};

use crate::error::ClientError;
use crate::persistence::Persistence;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    #[default]
    Sqlite,
    Memory,
    None,
}

impl FromStr for StorageMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StorageMode::Sqlite),
            "memory" => Ok(StorageMode::Memory),
            "none" => Ok(StorageMode::None),
            other => Err(format!("unknown storage mode: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Env: `SUPERGRAM_STORAGE` (`sqlite` | `memory` | `none`)
    /// Default: `sqlite`
    pub storage: StorageMode,

    /// Directory holding `supergram.db`.
    /// Env: `SUPERGRAM_DATA_DIR`
    /// Default: the platform data directory.
    pub data_dir: Option<PathBuf>,

    /// BLAKE3 digest of the accepted redemption code (hex, 64 chars).
    /// Env: `SUPERGRAM_PROMO_DIGEST`
    pub promo_digest: Option<String>,

    /// Ed25519 key of the token issuer (hex, 64 chars). Wins over
    /// `promo_digest` when both are set.
    /// Env: `SUPERGRAM_ENTITLEMENT_PUBKEY`
    pub entitlement_pubkey: Option<String>,

    /// Env: `SUPERGRAM_SAMPLE_RATE`, `SUPERGRAM_CHANNELS`
    pub audio: AudioConfig,

    pub video: VideoConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            storage: StorageMode::default(),
            data_dir: None,
            promo_digest: None,
            entitlement_pubkey: None,
            audio: AudioConfig::default(),
            video: VideoConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, falling back to defaults for
    /// missing or unparsable values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(val) = lookup("SUPERGRAM_STORAGE") {
            match val.parse() {
                Ok(mode) => config.storage = mode,
                Err(e) => warn!(error = %e, "Invalid SUPERGRAM_STORAGE, using default"),
            }
        }

        if let Some(dir) = lookup("SUPERGRAM_DATA_DIR") {
            if !dir.trim().is_empty() {
                config.data_dir = Some(PathBuf::from(dir));
            }
        }

        config.promo_digest = lookup("SUPERGRAM_PROMO_DIGEST").filter(|v| !v.trim().is_empty());
        config.entitlement_pubkey =
            lookup("SUPERGRAM_ENTITLEMENT_PUBKEY").filter(|v| !v.trim().is_empty());

        if let Some(val) = lookup("SUPERGRAM_SAMPLE_RATE") {
            let audio = val.trim().parse::<u32>().ok().map(|sample_rate| AudioConfig {
                sample_rate,
                ..config.audio.clone()
            });
            match audio {
                Some(audio) if audio.has_frames() => config.audio = audio,
                _ => warn!(value = %val, "Invalid SUPERGRAM_SAMPLE_RATE, using default"),
            }
        }

        if let Some(val) = lookup("SUPERGRAM_CHANNELS") {
            match val.trim().parse::<u16>() {
                Ok(channels @ 1..=2) => config.audio.channels = channels,
                _ => warn!(value = %val, "Invalid SUPERGRAM_CHANNELS, using default"),
            }
        }

        config
    }

    /// Open the configured store.
    pub fn open_persistence(&self) -> Result<Persistence, ClientError> {
        let persistence = match self.storage {
            StorageMode::Sqlite => {
                let db = match &self.data_dir {
                    Some(dir) => Database::open_in_dir(dir)?,
                    None => Database::new()?,
                };
                info!(path = ?db.path(), "Using SQLite storage");
                Persistence::new(db)
            }
            StorageMode::Memory => {
                info!("Using in-memory storage");
                Persistence::new(MemoryStore::new())
            }
            StorageMode::None => {
                info!("Storage disabled, histories are not persisted");
                Persistence::none()
            }
        };
        Ok(persistence)
    }

    /// Build the entitlement authority. A malformed key is an error rather
    /// than a silent fallback to rejecting everything.
    pub fn authority(&self) -> Result<Box<dyn EntitlementAuthority>, ClientError> {
        if let Some(key) = &self.entitlement_pubkey {
            info!("Redemption codes are verified as signed tokens");
            return Ok(Box::new(TokenAuthority::from_hex(key.trim())?));
        }
        if let Some(digest) = &self.promo_digest {
            info!("Redemption codes are verified against a digest");
            return Ok(Box::new(DigestAuthority::from_hex(digest.trim())?));
        }
        info!("No entitlement authority configured, codes are rejected");
        Ok(Box::new(DenyAll))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(|_| None);

        assert_eq!(config.storage, StorageMode::Sqlite);
        assert!(config.data_dir.is_none());
        assert_eq!(config.audio, AudioConfig::default());
        assert!(config.authority().is_ok());
    }

    #[test]
    fn test_values_are_read() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("SUPERGRAM_STORAGE", "Memory"),
            ("SUPERGRAM_DATA_DIR", "/tmp/supergram"),
            ("SUPERGRAM_SAMPLE_RATE", "16000"),
            ("SUPERGRAM_CHANNELS", "2"),
        ]));

        assert_eq!(config.storage, StorageMode::Memory);
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/supergram")));
        assert_eq!(config.audio.sample_rate, 16000);
        assert_eq!(config.audio.channels, 2);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("SUPERGRAM_STORAGE", "postgres"),
            ("SUPERGRAM_SAMPLE_RATE", "fast"),
            ("SUPERGRAM_CHANNELS", "6"),
        ]));

        assert_eq!(config.storage, StorageMode::Sqlite);
        assert_eq!(config.audio, AudioConfig::default());
    }

    #[test]
    fn test_sample_rate_too_low_for_a_frame_falls_back() {
        for rate in ["0", "10", "49"] {
            let config = ClientConfig::from_lookup(lookup(&[("SUPERGRAM_SAMPLE_RATE", rate)]));

            assert_eq!(config.audio, AudioConfig::default());
            assert!(config.audio.has_frames());
        }

        let config = ClientConfig::from_lookup(lookup(&[("SUPERGRAM_SAMPLE_RATE", "50")]));
        assert_eq!(config.audio.sample_rate, 50);
    }

    #[test]
    fn test_digest_authority_accepts_its_code() {
        let digest = hex::encode(DigestAuthority::digest_code("super123q"));
        let config = ClientConfig::from_lookup(lookup(&[("SUPERGRAM_PROMO_DIGEST", digest.as_str())]));

        let authority = config.authority().unwrap();
        assert!(authority.verify("super123q", "ivan").is_ok());
        assert!(authority.verify("other", "ivan").is_err());
    }

    #[test]
    fn test_malformed_digest_is_an_error() {
        let config = ClientConfig::from_lookup(lookup(&[("SUPERGRAM_PROMO_DIGEST", "abcd")]));

        assert!(matches!(
            config.authority(),
            Err(ClientError::Entitlement(_))
        ));
    }

    #[test]
    fn test_sqlite_in_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig {
            data_dir: Some(dir.path().to_path_buf()),
            ..ClientConfig::default()
        };

        let persistence = config.open_persistence().unwrap();

        assert!(persistence.is_durable());
        assert!(dir.path().join("supergram.db").exists());
    }

    #[test]
    fn test_no_storage() {
        let config = ClientConfig {
            storage: StorageMode::None,
            ..ClientConfig::default()
        };
        assert!(!config.open_persistence().unwrap().is_durable());
    }
}
