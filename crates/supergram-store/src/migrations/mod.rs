//! Schema versions, tracked in `PRAGMA user_version`.

pub mod v001_initial;

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{Result, StoreError};

type Step = fn(&Connection) -> rusqlite::Result<()>;

/// Ordered upgrades. Entry `i` moves the schema from version `i` to `i + 1`.
const STEPS: &[(&str, Step)] = &[("v001_initial", v001_initial::up)];

pub const CURRENT_VERSION: u32 = STEPS.len() as u32;

/// Bring the schema up to [`CURRENT_VERSION`].
///
/// Each step commits together with its version bump. A database written by
/// a newer build is refused rather than opened with an unknown schema.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let found: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    if found > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "schema version {found} is newer than supported version {CURRENT_VERSION}"
        )));
    }
    debug!(found, target = CURRENT_VERSION, "Schema version");

    for (version, (name, step)) in (1u32..).zip(STEPS).skip(found as usize) {
        info!(migration = name, "Applying migration");
        let tx = conn.unchecked_transaction()?;
        step(&tx).map_err(|e| StoreError::Migration(format!("{name}: {e}")))?;
        tx.pragma_update(None, "user_version", version)?;
        tx.commit()?;
    }

    Ok(())
}
