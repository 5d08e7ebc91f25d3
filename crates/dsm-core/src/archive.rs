//! Archived ("former") profiles: what deleting a profile leaves behind.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::backup::zip_backup_dir;
use crate::domain::ARCHIVED_SUFFIX;
use crate::error::{ManagerError, Result};

/// Archived profile directories in `game_dir`, sorted by name.
pub fn list_archived(game_dir: &Path) -> Result<Vec<PathBuf>> {
    if !game_dir.is_dir() {
        return Err(ManagerError::DirectoryUnavailable(game_dir.to_path_buf()));
    }
    let mut out = Vec::new();
    for entry in fs::read_dir(game_dir)? {
        let path = entry?.path();
        let archived = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.len() > ARCHIVED_SUFFIX.len() && n.ends_with(ARCHIVED_SUFFIX));
        if archived && path.is_dir() {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Purged {
    pub removed: Vec<PathBuf>,
    pub backups: Vec<PathBuf>,
}

/// Permanently remove every archived profile, zipping each one first when
/// `backup` is set. Stops at the first failure; what was removed stays removed.
pub fn purge_archived(game_dir: &Path, backup: bool) -> Result<Purged> {
    let mut purged = Purged::default();
    for dir in list_archived(game_dir)? {
        if backup {
            purged.backups.push(zip_backup_dir(&dir)?);
        }
        fs::remove_dir_all(&dir)?;
        info!(path = %dir.display(), "removed archived profile");
        purged.removed.push(dir);
    }
    Ok(purged)
}
