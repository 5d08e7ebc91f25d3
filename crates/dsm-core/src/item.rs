use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::ordinal;

/// A named entry backed by `<dir>/<name><suffix>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub name: String,
    pub ordinal_prefix: Option<u32>,
    pub backing_file: PathBuf,
}

impl Item {
    pub fn new(dir: &Path, name: &str, suffix: &str) -> Self {
        Self {
            name: name.to_string(),
            ordinal_prefix: ordinal::parse(name),
            backing_file: backing_path(dir, name, suffix),
        }
    }

    /// Name without its ordinal token.
    pub fn label(&self) -> &str {
        ordinal::label(&self.name)
    }
}

pub fn backing_path(dir: &Path, name: &str, suffix: &str) -> PathBuf {
    dir.join(format!("{name}{suffix}"))
}
