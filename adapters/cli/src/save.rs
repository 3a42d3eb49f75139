//! JSON persistence of the player snapshot between sessions.

use std::{fs, io, path::Path};

use survival_core::{PlayerSnapshot, SnapshotError};
use thiserror::Error;
use tracing::{debug, warn};

/// Failure to read, parse or accept a save file.
#[derive(Debug, Error)]
pub(crate) enum SaveError {
    /// The file could not be read or written.
    #[error("save file i/o failed: {0}")]
    Io(#[from] io::Error),
    /// The file is not a valid snapshot document.
    #[error("save file is malformed: {0}")]
    Format(#[from] serde_json::Error),
    /// The snapshot parsed but is internally inconsistent.
    #[error("save file is inconsistent: {0}")]
    Invalid(#[from] SnapshotError),
}

/// Writes `snapshot` to `path` as pretty-printed JSON.
pub(crate) fn save(path: &Path, snapshot: &PlayerSnapshot) -> Result<(), SaveError> {
    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, json)?;
    debug!(path = %path.display(), "saved player snapshot");
    Ok(())
}

/// Reads and validates the snapshot at `path`.
pub(crate) fn try_load(path: &Path, max_health: u32) -> Result<PlayerSnapshot, SaveError> {
    let contents = fs::read_to_string(path)?;
    let snapshot: PlayerSnapshot = serde_json::from_str(&contents)?;
    snapshot.validate(max_health)?;
    Ok(snapshot)
}

/// Loads the snapshot at `path`, treating every failure as "no saved state".
pub(crate) fn load(path: &Path, max_health: u32) -> Option<PlayerSnapshot> {
    match try_load(path, max_health) {
        Ok(snapshot) => Some(snapshot),
        Err(SaveError::Io(error)) if error.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no save file");
            None
        }
        Err(error) => {
            warn!(path = %path.display(), %error, "ignoring save file");
            None
        }
    }
}
