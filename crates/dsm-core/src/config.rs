//! Persisted settings, read from a TOML file.
//!
//! ```toml
//! game = "ds3"
//! profile = "Main"
//! sorting_type = "alphabetical"
//! automatically_renumber = true
//! ds3_path = "C:/Users/me/AppData/Roaming/DarkSoulsIII/0110000100000000"
//! ```

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{PROFILE_SUFFIX, SAVE_SUFFIX};

pub const DEFAULT_CONFIG_FILE: &str = "config.toml";
/// Profile written by [`Config::auto`].
pub const DEFAULT_PROFILE: &str = "save_manager";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    Missing(PathBuf),
    #[error("missing config key `{0}`")]
    MissingKey(&'static str),
    #[error("invalid config {}: {reason}", .path.display())]
    Invalid { path: PathBuf, reason: String },
    #[error("failed to access config: {0}")]
    Io(#[from] io::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Game {
    Ds1,
    Ds3,
}

impl Game {
    pub const ALL: [Game; 2] = [Game::Ds1, Game::Ds3];

    pub fn key(self) -> &'static str {
        match self {
            Game::Ds1 => "ds1",
            Game::Ds3 => "ds3",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Game::Ds1 => "Dark Souls",
            Game::Ds3 => "Dark Souls III",
        }
    }

    /// File name (without suffix) of the save the game itself reads and writes.
    pub fn base_save_name(self) -> &'static str {
        match self {
            Game::Ds1 => "DRAKS0005",
            Game::Ds3 => "DS30000",
        }
    }

    pub fn active_slot_file_name(self) -> String {
        format!("{}{}", self.base_save_name(), SAVE_SUFFIX)
    }

    /// Where the game keeps its per-account save directories.
    pub fn default_search_root(self) -> Option<PathBuf> {
        match self {
            Game::Ds1 => dirs::document_dir().map(|d| d.join("NBGI").join("DarkSouls")),
            Game::Ds3 => dirs::data_dir().map(|d| d.join("DarkSoulsIII")),
        }
    }

    fn path_key(self) -> &'static str {
        match self {
            Game::Ds1 => "ds1_path",
            Game::Ds3 => "ds3_path",
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Game {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Game::ALL
            .into_iter()
            .find(|g| g.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown game `{s}` (expected ds1 or ds3)"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortingType {
    #[default]
    Alphabetical,
    /// Insertion / reorder order.
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub game: Game,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(default)]
    pub sorting_type: SortingType,
    #[serde(default = "default_renumber")]
    pub automatically_renumber: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ds1_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ds3_path: Option<PathBuf>,
}

fn default_renumber() -> bool {
    true
}

impl Config {
    /// Settings of a fresh installation pointing `game` at `game_dir`.
    pub fn auto(game: Game, game_dir: impl Into<PathBuf>) -> Self {
        let mut cfg = Config {
            game,
            profile: Some(DEFAULT_PROFILE.into()),
            sorting_type: SortingType::Alphabetical,
            automatically_renumber: true,
            ds1_path: None,
            ds3_path: None,
        };
        cfg.set_game_dir(game, game_dir);
        cfg
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::Missing(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        let cfg = Self::parse(&text, path)?;
        debug!(path = %path.display(), game = %cfg.game, "loaded config");
        Ok(cfg)
    }

    /// Parse and validate; `origin` only labels errors.
    pub fn parse(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let mut cfg: Config = toml::from_str(text).map_err(|e| {
            // A table without `game` is an incomplete config rather than a broken one.
            if e.message().contains("missing field `game`") {
                ConfigError::MissingKey("game")
            } else {
                ConfigError::Invalid {
                    path: origin.to_path_buf(),
                    reason: e.message().to_string(),
                }
            }
        })?;
        if cfg.profile.as_deref().is_some_and(|p| p.trim().is_empty()) {
            cfg.profile = None;
        }
        Ok(cfg)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = toml::to_string_pretty(self)?;
        fs::write(path, text)?;
        info!(path = %path.display(), "saved config");
        Ok(())
    }

    /// Save directory of the active game.
    pub fn game_dir(&self) -> Result<&Path, ConfigError> {
        let dir = match self.game {
            Game::Ds1 => self.ds1_path.as_deref(),
            Game::Ds3 => self.ds3_path.as_deref(),
        };
        dir.ok_or(ConfigError::MissingKey(self.game.path_key()))
    }

    pub fn set_game_dir(&mut self, game: Game, dir: impl Into<PathBuf>) {
        let dir = Some(dir.into());
        match game {
            Game::Ds1 => self.ds1_path = dir,
            Game::Ds3 => self.ds3_path = dir,
        }
    }

    /// Directory of the active profile, `None` when no profile is selected.
    pub fn profile_dir(&self) -> Result<Option<PathBuf>, ConfigError> {
        let Some(profile) = &self.profile else {
            return Ok(None);
        };
        Ok(Some(
            self.game_dir()?.join(format!("{profile}{PROFILE_SUFFIX}")),
        ))
    }

    pub fn active_slot(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.game_dir()?.join(self.game.active_slot_file_name()))
    }

    pub fn select_profile(&mut self, name: &str) {
        self.profile = Some(name.to_string());
    }

    pub fn leave_profile(&mut self) {
        self.profile = None;
    }

    /// Switching games always drops the active profile; profiles are per game.
    pub fn switch_game(&mut self, game: Game) {
        self.game = game;
        self.profile = None;
    }
}
