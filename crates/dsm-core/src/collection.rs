//! Ordered, named, file-backed items: the save list of a profile or the
//! profile list of a game.
//!
//! The in-memory map is always in display order and always mirrors the
//! directory: an item exists here iff `<dir>/<name><suffix>` exists.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::config::{Config, SortingType};
use crate::domain::{Domain, Loaded};
use crate::error::{ManagerError, Result};
use crate::item::{Item, backing_path};
use crate::ordinal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Options {
    pub sorting: SortingType,
    pub auto_renumber: bool,
}

impl From<&Config> for Options {
    fn from(cfg: &Config) -> Self {
        Self {
            sorting: cfg.sorting_type,
            auto_renumber: cfg.automatically_renumber,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

pub struct Collection<D> {
    dir: PathBuf,
    domain: D,
    options: Options,
    items: IndexMap<String, Item>,
}

impl<D: Domain> Collection<D> {
    pub fn open(dir: impl Into<PathBuf>, domain: D, options: Options) -> Result<Self> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(ManagerError::DirectoryUnavailable(dir));
        }
        let mut collection = Self {
            dir,
            domain,
            options,
            items: IndexMap::new(),
        };
        collection.rescan()?;
        Ok(collection)
    }

    /// Rebuild from the directory listing. Names already known keep their
    /// relative order; new ones are appended in name order.
    pub fn rescan(&mut self) -> Result<()> {
        let suffix = self.domain.suffix();
        let mut found = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                warn!(entry = ?file_name, "skipping non UTF-8 entry");
                continue;
            };
            let Some(name) = file_name.strip_suffix(suffix) else {
                continue;
            };
            if name.is_empty() || !self.domain.is_backing(&entry.path()) {
                continue;
            }
            found.push(name.to_string());
        }
        found.sort();

        let present: HashSet<&str> = found.iter().map(String::as_str).collect();
        let mut names: Vec<String> = self
            .items
            .keys()
            .filter(|k| present.contains(k.as_str()))
            .cloned()
            .collect();
        let known: HashSet<String> = names.iter().cloned().collect();
        names.extend(found.iter().filter(|n| !known.contains(*n)).cloned());

        self.items = names
            .into_iter()
            .map(|n| {
                let item = Item::new(&self.dir, &n, suffix);
                (n, item)
            })
            .collect();
        self.sort();
        debug!(dir = %self.dir.display(), count = self.items.len(), "scanned {}s", self.domain.noun());
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn domain(&self) -> &D {
        &self.domain
    }

    pub fn options(&self) -> Options {
        self.options
    }

    /// Items in display order.
    pub fn list(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    pub fn names(&self) -> Vec<String> {
        self.items.keys().cloned().collect()
    }

    pub fn get(&self, name: &str) -> Option<&Item> {
        self.items.get(name)
    }

    pub fn get_index(&self, index: usize) -> Option<&Item> {
        self.items.get_index(index).map(|(_, item)| item)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Create a new item and return its final name (which carries an ordinal
    /// when auto-renumbering is on).
    pub fn create(&mut self, name: &str) -> Result<String> {
        check_name(name)?;
        let target = self.path_for(name);
        self.domain.new_item_action(&target)?;
        // Re-importing over an existing save moves it to the end.
        self.items.shift_remove(name);
        self.items
            .insert(name.to_string(), Item::new(&self.dir, name, self.domain.suffix()));
        info!(name, "created {}", self.domain.noun());

        if self.options.auto_renumber {
            self.renumber_tracking(name)
        } else {
            self.sort();
            Ok(name.to_string())
        }
    }

    /// Rename `old`, keeping its ordinal token if it has one. Returns the new
    /// full name. On collision nothing changes, in memory or on disk.
    /// The item keeps its position; it is not moved to the end.
    pub fn rename(&mut self, old: &str, new_text: &str) -> Result<String> {
        check_name(new_text)?;
        if !self.items.contains_key(old) {
            return Err(ManagerError::UnknownItem(old.to_string()));
        }
        let new_name = match ordinal::split(old) {
            Some((token, _)) => format!("{token} {new_text}"),
            None => new_text.to_string(),
        };
        if new_name == old {
            return Ok(new_name);
        }
        let target = self.path_for(&new_name);
        if target.exists() {
            return Err(ManagerError::NameCollision(new_name));
        }
        fs::rename(self.path_for(old), &target)?;
        if let Some((index, _, _)) = self.items.shift_remove_full(old) {
            let item = Item::new(&self.dir, &new_name, self.domain.suffix());
            self.items.shift_insert(index, new_name.clone(), item);
        }
        info!(old, new = %new_name, "renamed {}", self.domain.noun());

        self.sort();
        if self.options.auto_renumber {
            self.renumber_tracking(&new_name)
        } else {
            Ok(new_name)
        }
    }

    pub fn delete(&mut self, name: &str) -> Result<()> {
        if !self.items.contains_key(name) {
            return Err(ManagerError::UnknownItem(name.to_string()));
        }
        self.domain.delete_item_action(&self.dir, name)?;
        self.items.shift_remove(name);
        info!(name, "deleted {}", self.domain.noun());
        if self.options.auto_renumber {
            self.renumber()?;
        }
        Ok(())
    }

    pub fn load(&self, name: &str) -> Result<Loaded> {
        if !self.items.contains_key(name) {
            return Err(ManagerError::UnknownItem(name.to_string()));
        }
        self.domain.load_action(&self.dir, name)
    }

    /// Prefix every item, in display order, with a fresh ordinal. Existing
    /// ordinals are kept as part of the name.
    pub fn number(&mut self) -> Result<()> {
        let width = ordinal::width(self.items.len());
        let plan = self
            .items
            .keys()
            .enumerate()
            .map(|(i, name)| (name.clone(), ordinal::format(i + 1, width, name)))
            .collect();
        self.apply_plan(plan)
    }

    /// Like [`number`](Self::number) but replaces an existing ordinal instead
    /// of stacking a second one in front of it.
    pub fn renumber(&mut self) -> Result<()> {
        let plan = self.renumber_plan();
        self.apply_plan(plan)
    }

    /// Strip the ordinal of every item that has one. Colliding labels get `'`
    /// appended until unique. Despite the name, order is not inverted.
    pub fn reverse_numbering(&mut self) -> Result<()> {
        let mut taken: HashSet<String> = self
            .items
            .keys()
            .filter(|k| ordinal::split(k).is_none_or(|(_, rest)| rest.is_empty()))
            .cloned()
            .collect();
        let mut plan = Vec::with_capacity(self.items.len());
        for name in self.items.keys() {
            match ordinal::split(name) {
                Some((_, rest)) if !rest.is_empty() => {
                    let mut candidate = rest.to_string();
                    while taken.contains(&candidate) {
                        candidate.push('\'');
                    }
                    taken.insert(candidate.clone());
                    plan.push((name.clone(), candidate));
                }
                _ => plan.push((name.clone(), name.clone())),
            }
        }
        self.apply_plan(plan)
    }

    /// Exchange the ordinal of `focus` with its neighbour in `direction`.
    /// Returns the new name of `focus`, or `None` when there was nothing to
    /// swap with (no ordinal, out of range, no item holding the target).
    pub fn swap_adjacent(&mut self, focus: &str, direction: Direction) -> Result<Option<String>> {
        if !self.items.contains_key(focus) {
            return Err(ManagerError::UnknownItem(focus.to_string()));
        }
        let Some((token, label)) = ordinal::split(focus) else {
            return Ok(None);
        };
        let Ok(current) = token.parse::<usize>() else {
            return Ok(None);
        };
        let target = match direction {
            Direction::Up => current.checked_sub(1),
            Direction::Down => current.checked_add(1),
        };
        let Some(target) = target.filter(|t| (1..=self.items.len()).contains(t)) else {
            return Ok(None);
        };
        let Some((other_token, other_label)) = self
            .items
            .keys()
            .filter(|k| k.as_str() != focus)
            .filter_map(|k| ordinal::split(k))
            .find(|(t, _)| t.parse::<usize>().ok() == Some(target))
        else {
            return Ok(None);
        };

        let other = format!("{other_token} {other_label}");
        let new_focus = format!("{other_token} {label}");
        let new_other = format!("{token} {other_label}");
        self.apply_plan(vec![
            (focus.to_string(), new_focus.clone()),
            (other, new_other.clone()),
        ])?;
        if let (Some(a), Some(b)) = (
            self.items.get_index_of(&new_focus),
            self.items.get_index_of(&new_other),
        ) {
            self.items.swap_indices(a, b);
            self.sort();
        }
        info!(focus, new = %new_focus, "moved {}", self.domain.noun());
        Ok(Some(new_focus))
    }

    /// Prepend a literal `prefix` to every name.
    pub fn add_prefix(&mut self, prefix: &str) -> Result<()> {
        check_name(prefix)?;
        let plan = self
            .items
            .keys()
            .map(|name| (name.clone(), format!("{prefix}{name}")))
            .collect();
        self.apply_plan(plan)
    }

    /// Strip a literal `prefix` from the names that start with it.
    pub fn remove_prefix(&mut self, prefix: &str) -> Result<()> {
        check_name(prefix)?;
        let plan = self
            .items
            .keys()
            .map(|name| match name.strip_prefix(prefix) {
                Some(rest) if !rest.is_empty() => (name.clone(), rest.to_string()),
                _ => (name.clone(), name.clone()),
            })
            .collect();
        self.apply_plan(plan)
    }

    fn renumber_plan(&self) -> Vec<(String, String)> {
        let width = ordinal::width(self.items.len());
        self.items
            .keys()
            .enumerate()
            .map(|(i, name)| {
                let rest = ordinal::split(name).map_or(name.as_str(), |(_, rest)| rest);
                (name.clone(), ordinal::format(i + 1, width, rest))
            })
            .collect()
    }

    fn renumber_tracking(&mut self, tracked: &str) -> Result<String> {
        let plan = self.renumber_plan();
        let renamed = plan
            .iter()
            .find(|(old, _)| old == tracked)
            .map_or_else(|| tracked.to_string(), |(_, new)| new.clone());
        self.apply_plan(plan)?;
        Ok(renamed)
    }

    /// Rename many items at once. Targets are checked up front; then every
    /// changed file goes to a temporary name before its final one, so a target
    /// that is another item's current name is never overwritten.
    ///
    /// Not transactional: if a rename fails halfway the directory is rescanned
    /// and the error returned, leaving whatever is on disk.
    fn apply_plan(&mut self, plan: Vec<(String, String)>) -> Result<()> {
        let changed: Vec<(&str, &str)> = plan
            .iter()
            .filter(|(old, new)| old != new)
            .map(|(old, new)| (old.as_str(), new.as_str()))
            .collect();
        if changed.is_empty() {
            self.sort();
            return Ok(());
        }

        let leaving: HashSet<&str> = changed.iter().map(|(old, _)| *old).collect();
        let mut targets = HashSet::new();
        for (_, new) in &changed {
            if new.is_empty() || new.contains(['/', '\\']) {
                return Err(ManagerError::InvalidName(new.to_string()));
            }
            if !targets.insert(*new) || (!leaving.contains(new) && self.path_for(new).exists()) {
                return Err(ManagerError::NameCollision(new.to_string()));
            }
        }

        if let Err(e) = self.rename_files(&changed) {
            warn!(error = %e, dir = %self.dir.display(), "rename plan interrupted, rescanning");
            self.rescan()?;
            return Err(e.into());
        }

        let renames: HashMap<&str, &str> = changed.iter().copied().collect();
        let suffix = self.domain.suffix();
        let items = std::mem::take(&mut self.items);
        self.items = items
            .into_iter()
            .map(|(name, item)| match renames.get(name.as_str()) {
                Some(new) => (new.to_string(), Item::new(&self.dir, new, suffix)),
                None => (name, item),
            })
            .collect();
        self.sort();
        debug!(renamed = changed.len(), "applied rename plan");
        Ok(())
    }

    fn rename_files(&self, changed: &[(&str, &str)]) -> io::Result<()> {
        if let [(old, new)] = changed {
            return fs::rename(self.path_for(old), self.path_for(new));
        }
        let mut staged = Vec::with_capacity(changed.len());
        for (i, (old, new)) in changed.iter().enumerate() {
            let mut temp = format!("~{i} {old}");
            while self.path_for(&temp).exists() {
                temp.insert(0, '~');
            }
            fs::rename(self.path_for(old), self.path_for(&temp))?;
            staged.push((temp, *new));
        }
        for (temp, new) in staged {
            fs::rename(self.path_for(&temp), self.path_for(new))?;
        }
        Ok(())
    }

    fn sort(&mut self) {
        if self.options.sorting == SortingType::Alphabetical {
            self.items.sort_keys();
        }
    }

    fn path_for(&self, name: &str) -> PathBuf {
        backing_path(&self.dir, name, self.domain.suffix())
    }
}

fn check_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ManagerError::EmptyName);
    }
    if name.contains(['/', '\\']) {
        return Err(ManagerError::InvalidName(name.to_string()));
    }
    Ok(())
}
