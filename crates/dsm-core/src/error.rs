use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures of collection operations. All of them are recoverable: the
/// collection is left consistent with what is on disk.
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("this entry should not be empty")]
    EmptyName,
    #[error("this name already exists: {0}")]
    NameCollision(String),
    #[error("not a valid file name: {0}")]
    InvalidName(String),
    #[error("directory unavailable: {}", .0.display())]
    DirectoryUnavailable(PathBuf),
    #[error("no such item: {0}")]
    UnknownItem(String),
    #[error("file not found: {}", .0.display())]
    MissingFile(PathBuf),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T, E = ManagerError> = std::result::Result<T, E>;

/// Any failure of the library, for callers that drive several concerns.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
    #[error(transparent)]
    Manager(#[from] ManagerError),
    #[error(transparent)]
    Discover(#[from] crate::discover::DiscoverError),
}
