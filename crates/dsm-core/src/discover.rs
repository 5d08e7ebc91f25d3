//! Locate the per-account save directory of a game for first-time setup.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DiscoverError {
    #[error("no save directory found under {}", .0.display())]
    NotFound(PathBuf),
    #[error("several candidate save directories, pick one: {}", list(.0))]
    Ambiguous(Vec<PathBuf>),
    #[error(transparent)]
    Io(#[from] io::Error),
}

fn list(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// The game keeps one directory per account next to a few `.xml` settings
/// files. Exactly one non-xml entry is an unambiguous answer.
pub fn find_game_dir(search_root: &Path) -> Result<PathBuf, DiscoverError> {
    if !search_root.is_dir() {
        return Err(DiscoverError::NotFound(search_root.to_path_buf()));
    }
    let mut candidates = Vec::new();
    for entry in fs::read_dir(search_root)? {
        let path = entry?.path();
        let is_xml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("xml"));
        if !is_xml {
            candidates.push(path);
        }
    }
    candidates.sort();
    debug!(root = %search_root.display(), found = candidates.len(), "save directory candidates");
    match candidates.len() {
        0 => Err(DiscoverError::NotFound(search_root.to_path_buf())),
        1 => Ok(candidates.remove(0)),
        _ => Err(DiscoverError::Ambiguous(candidates)),
    }
}
