//! dsm-core: file-backed save and profile collections for the Souls games.
//!
//! - `collection`: ordered items, renumbering and reordering
//! - `domain`: what saves and profiles do with their backing files
//! - `session`: interaction modes driven by a display surface
//! - `config`, `open`: settings and wiring
//! - `archive`, `backup`, `discover`: maintenance and first-time setup
//!
pub mod archive;
pub mod backup;
pub mod collection;
pub mod config;
pub mod discover;
pub mod domain;
pub mod error;
pub mod item;
pub mod open;
pub mod ordinal;
pub mod session;

pub use collection::{Collection, Direction, Options};
pub use config::{Config, ConfigError, Game, SortingType};
pub use domain::{Domain, Loaded, Profiles, Saves};
pub use error::{Error, ManagerError};
pub use item::Item;
pub use session::{Command, Event, Key, MenuAction, Mode, Reaction, Session, Severity, Status};
