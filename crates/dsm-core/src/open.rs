//! Build the collections a configuration points at.

use std::fs;

use tracing::info;

use crate::collection::{Collection, Options};
use crate::config::Config;
use crate::domain::{Profiles, Saves};
use crate::error::{Error, ManagerError};

/// Profiles of the configured game. Profiles are never renumbered
/// automatically: that would rename the active profile's directory behind
/// the config's back.
pub fn profiles(cfg: &Config) -> Result<Collection<Profiles>, Error> {
    let dir = cfg.game_dir()?;
    let options = Options {
        auto_renumber: false,
        ..Options::from(cfg)
    };
    Ok(Collection::open(dir, Profiles, options)?)
}

/// Saves of the active profile, `None` when no profile is selected. A missing
/// profile directory is created; a missing game directory is an error.
pub fn saves(cfg: &Config) -> Result<Option<Collection<Saves>>, Error> {
    let Some(dir) = cfg.profile_dir()? else {
        return Ok(None);
    };
    let game_dir = cfg.game_dir()?;
    if !game_dir.is_dir() {
        return Err(ManagerError::DirectoryUnavailable(game_dir.to_path_buf()).into());
    }
    if !dir.exists() {
        fs::create_dir(&dir).map_err(ManagerError::from)?;
        info!(path = %dir.display(), "created profile directory");
    }
    let domain = Saves::new(cfg.active_slot()?);
    Ok(Some(Collection::open(dir, domain, Options::from(cfg))?))
}
