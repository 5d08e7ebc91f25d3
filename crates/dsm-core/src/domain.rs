//! The two kinds of collections: saves inside a profile, and the profiles
//! themselves. They share all ordering logic and differ only in what happens
//! to the backing file on create, delete and load.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{ManagerError, Result};

pub const SAVE_SUFFIX: &str = ".sl2";
pub const PROFILE_SUFFIX: &str = ".profile";
pub const ARCHIVED_SUFFIX: &str = ".formerprofile";
/// Appended to an archived profile name until it no longer collides.
pub const COLLISION_MARK: char = '\'';

/// What loading an item did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Loaded {
    /// The save was copied over the game's active slot.
    Save { name: String },
    /// The profile was picked; the caller switches to its saves.
    Profile { name: String },
}

pub trait Domain {
    /// Singular noun used in status messages ("save", "profile").
    fn noun(&self) -> &'static str;

    fn suffix(&self) -> &'static str;

    /// Whether `path` can back an item (file vs directory).
    fn is_backing(&self, path: &Path) -> bool;

    /// Create the backing entry at `target`.
    fn new_item_action(&self, target: &Path) -> Result<()>;

    /// Dispose of the backing entry of `name` inside `dir`.
    fn delete_item_action(&self, dir: &Path, name: &str) -> Result<()>;

    fn load_action(&self, dir: &Path, name: &str) -> Result<Loaded>;

    /// Whether this collection lives inside another one the user can go back to.
    fn has_parent(&self) -> bool {
        false
    }
}

/// Saves of one profile. New saves are snapshots of the game's active slot.
#[derive(Debug, Clone)]
pub struct Saves {
    active_slot: PathBuf,
}

impl Saves {
    pub fn new(active_slot: impl Into<PathBuf>) -> Self {
        Self {
            active_slot: active_slot.into(),
        }
    }

    pub fn active_slot(&self) -> &Path {
        &self.active_slot
    }
}

impl Domain for Saves {
    fn noun(&self) -> &'static str {
        "save"
    }

    fn suffix(&self) -> &'static str {
        SAVE_SUFFIX
    }

    fn is_backing(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn new_item_action(&self, target: &Path) -> Result<()> {
        if !self.active_slot.is_file() {
            return Err(ManagerError::MissingFile(self.active_slot.clone()));
        }
        // Importing under an existing name replaces that save.
        fs::copy(&self.active_slot, target)?;
        Ok(())
    }

    fn delete_item_action(&self, dir: &Path, name: &str) -> Result<()> {
        let path = dir.join(format!("{name}{SAVE_SUFFIX}"));
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            // Already gone: nothing left to keep in sync.
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn load_action(&self, dir: &Path, name: &str) -> Result<Loaded> {
        let source = dir.join(format!("{name}{SAVE_SUFFIX}"));
        if !source.is_file() {
            return Err(ManagerError::MissingFile(source));
        }
        fs::copy(&source, &self.active_slot)?;
        info!(save = name, slot = %self.active_slot.display(), "save loaded");
        Ok(Loaded::Save { name: name.into() })
    }

    fn has_parent(&self) -> bool {
        true
    }
}

/// Profiles of one game. Deleted profiles are archived, never removed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Profiles;

impl Domain for Profiles {
    fn noun(&self) -> &'static str {
        "profile"
    }

    fn suffix(&self) -> &'static str {
        PROFILE_SUFFIX
    }

    fn is_backing(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn new_item_action(&self, target: &Path) -> Result<()> {
        match fs::create_dir(target) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(ManagerError::NameCollision(
                target
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    fn delete_item_action(&self, dir: &Path, name: &str) -> Result<()> {
        let archived = archive_profile(dir, name)?;
        info!(profile = name, archived = %archived.display(), "profile archived");
        Ok(())
    }

    fn load_action(&self, dir: &Path, name: &str) -> Result<Loaded> {
        let path = dir.join(format!("{name}{PROFILE_SUFFIX}"));
        if !path.is_dir() {
            return Err(ManagerError::DirectoryUnavailable(path));
        }
        Ok(Loaded::Profile { name: name.into() })
    }
}

/// Rename `<name>.profile` to the first free `<name>{'...}.formerprofile`.
///
/// The search has no cap: every candidate is one mark longer than the last, so
/// it runs out of existing names eventually.
pub fn archive_profile(dir: &Path, name: &str) -> Result<PathBuf> {
    let source = dir.join(format!("{name}{PROFILE_SUFFIX}"));
    if !source.is_dir() {
        return Err(ManagerError::DirectoryUnavailable(source));
    }
    let mut candidate = name.to_string();
    loop {
        let target = dir.join(format!("{candidate}{ARCHIVED_SUFFIX}"));
        // rename(2) would happily replace an empty directory
        if !target.exists() {
            fs::rename(&source, &target)?;
            return Ok(target);
        }
        candidate.push(COLLISION_MARK);
    }
}
