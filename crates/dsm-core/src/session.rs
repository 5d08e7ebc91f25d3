//! Interaction modes on top of a [`Collection`].
//!
//! A display surface feeds [`Event`]s in and renders the collection plus the
//! [`Status`] it gets back. Errors never escape a session; they come back as
//! error statuses.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::collection::{Collection, Direction};
use crate::config::Game;
use crate::domain::{Domain, Loaded};
use crate::error::{ManagerError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Default,
    Renaming,
    Deleting,
    Reorganising,
}

/// Named keys understood by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Rename,
    Delete,
    Reorganise,
    Up,
    Down,
    Cancel,
    /// Back from a profile's saves to the profile list.
    Leave,
}

impl Key {
    pub const ALL: [Key; 7] = [
        Key::Rename,
        Key::Delete,
        Key::Reorganise,
        Key::Up,
        Key::Down,
        Key::Cancel,
        Key::Leave,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Key::Rename => "F2",
            Key::Delete => "Ctrl-w",
            Key::Reorganise => "Ctrl-Alt-r",
            Key::Up => "Up",
            Key::Down => "Down",
            Key::Cancel => "Escape",
            Key::Leave => "Delete",
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Key {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Key::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s))
            .or(match s.to_ascii_lowercase().as_str() {
                "esc" => Some(Key::Cancel),
                "del" => Some(Key::Leave),
                _ => None,
            })
            .ok_or_else(|| format!("unknown key `{s}`"))
    }
}

/// Menu entries that act on the whole collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Number,
    Renumber,
    ReverseNumbering,
    SwitchGame(Game),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// An item was clicked.
    Activate(String),
    /// Enter in the input field: create an item named after its text.
    SubmitText(String),
    /// The input field now holds this text.
    Edit(String),
    Key(Key),
    Menu(MenuAction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub message: String,
    pub severity: Severity,
}

impl Status {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }

    /// Blank the status line.
    pub fn cleared() -> Self {
        Self::new(Severity::Info, "")
    }
}

/// Requests for whoever owns the process lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    OpenProfile(String),
    LeaveProfile,
    SwitchGame(Game),
}

/// Outcome of one event. `status: None` leaves the status line as it was.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reaction {
    pub status: Option<Status>,
    pub command: Option<Command>,
}

impl Reaction {
    fn status(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            status: Some(Status::new(severity, message)),
            command: None,
        }
    }

    fn error(err: &ManagerError) -> Self {
        Self::status(Severity::Error, err.to_string())
    }

    fn from_result(res: Result<Reaction>) -> Self {
        res.unwrap_or_else(|e| Self::error(&e))
    }
}

pub struct Session<D> {
    collection: Collection<D>,
    mode: Mode,
    focus: Option<String>,
    entry: String,
}

impl<D: Domain> Session<D> {
    pub fn new(collection: Collection<D>) -> Self {
        Self {
            collection,
            mode: Mode::Default,
            focus: None,
            entry: String::new(),
        }
    }

    pub fn collection(&self) -> &Collection<D> {
        &self.collection
    }

    pub fn into_collection(self) -> Collection<D> {
        self.collection
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Item highlighted while reorganising.
    pub fn focus(&self) -> Option<&str> {
        self.focus.as_deref()
    }

    /// Current contents of the input field.
    pub fn entry(&self) -> &str {
        &self.entry
    }

    pub fn handle(&mut self, event: Event) -> Reaction {
        debug!(?event, mode = ?self.mode, "session event");
        let reaction = match event {
            Event::Edit(text) => {
                self.entry = text;
                Reaction::default()
            }
            Event::SubmitText(text) => {
                self.entry = text;
                self.submit()
            }
            Event::Activate(name) => self.activate(&name),
            Event::Key(key) => self.key(key),
            Event::Menu(action) => self.menu(action),
        };
        if self
            .focus
            .as_deref()
            .is_some_and(|f| !self.collection.contains(f))
        {
            self.focus = None;
        }
        reaction
    }

    fn noun(&self) -> &'static str {
        self.collection.domain().noun()
    }

    fn submit(&mut self) -> Reaction {
        self.stop_reorganising();
        match self.collection.create(&self.entry) {
            Ok(name) => Reaction::status(
                Severity::Success,
                format!("{} \"{name}\" has been created", self.noun()),
            ),
            Err(e) => Reaction::error(&e),
        }
    }

    fn activate(&mut self, name: &str) -> Reaction {
        if !self.collection.contains(name) {
            // rename and delete act once, even when that once fails
            if matches!(self.mode, Mode::Renaming | Mode::Deleting) {
                self.mode = Mode::Default;
            }
            return Reaction::error(&ManagerError::UnknownItem(name.to_string()));
        }
        match self.mode {
            Mode::Default => Reaction::from_result(self.load(name)),
            Mode::Renaming => {
                self.mode = Mode::Default;
                match self.collection.rename(name, &self.entry) {
                    Ok(new_name) => {
                        self.entry.clear();
                        Reaction::status(
                            Severity::Success,
                            format!("{} renamed to \"{new_name}\"", self.noun()),
                        )
                    }
                    Err(ManagerError::EmptyName) => Reaction::error(&ManagerError::EmptyName),
                    Err(e) => {
                        self.entry.clear();
                        Reaction::error(&e)
                    }
                }
            }
            Mode::Deleting => {
                self.mode = Mode::Default;
                match self.collection.delete(name) {
                    Ok(()) => Reaction::status(
                        Severity::Info,
                        format!("{} \"{name}\" has been deleted", self.noun()),
                    ),
                    Err(e) => Reaction::error(&e),
                }
            }
            Mode::Reorganising => {
                self.focus = Some(name.to_string());
                self.focus_status()
            }
        }
    }

    fn load(&mut self, name: &str) -> Result<Reaction> {
        Ok(match self.collection.load(name)? {
            Loaded::Save { name } => {
                Reaction::status(Severity::Success, format!("save \"{name}\" has been loaded"))
            }
            Loaded::Profile { name } => Reaction {
                status: Some(Status::new(
                    Severity::Success,
                    format!("profile \"{name}\" has been selected"),
                )),
                command: Some(Command::OpenProfile(name)),
            },
        })
    }

    fn key(&mut self, key: Key) -> Reaction {
        match key {
            Key::Rename => {
                self.stop_reorganising();
                self.mode = Mode::Renaming;
                Reaction::status(
                    Severity::Success,
                    format!("select a {} to rename", self.noun()),
                )
            }
            Key::Delete => {
                self.stop_reorganising();
                self.mode = Mode::Deleting;
                Reaction::status(
                    Severity::Warning,
                    format!("select a {} to delete", self.noun()),
                )
            }
            Key::Reorganise => {
                self.focus = None;
                self.mode = Mode::Reorganising;
                Reaction::status(Severity::Success, "reorganising")
            }
            Key::Up => self.move_focus(Direction::Up),
            Key::Down => self.move_focus(Direction::Down),
            Key::Cancel => {
                self.stop_reorganising();
                Reaction {
                    status: Some(Status::cleared()),
                    command: None,
                }
            }
            Key::Leave if self.collection.domain().has_parent() => {
                self.stop_reorganising();
                Reaction {
                    status: None,
                    command: Some(Command::LeaveProfile),
                }
            }
            Key::Leave => Reaction::default(),
        }
    }

    fn move_focus(&mut self, direction: Direction) -> Reaction {
        if self.mode != Mode::Reorganising {
            return Reaction::default();
        }
        let Some(focus) = self.focus.clone() else {
            return Reaction::default();
        };
        match self.collection.swap_adjacent(&focus, direction) {
            Ok(Some(new_focus)) => {
                self.focus = Some(new_focus);
                self.focus_status()
            }
            Ok(None) => Reaction::default(),
            Err(e) => Reaction::error(&e),
        }
    }

    fn menu(&mut self, action: MenuAction) -> Reaction {
        let noun = self.noun();
        let done = |what: &str| Reaction::status(Severity::Success, format!("{noun}s {what}"));
        match action {
            MenuAction::Number => match self.collection.number() {
                Ok(()) => done("numbered"),
                Err(e) => Reaction::error(&e),
            },
            MenuAction::Renumber => match self.collection.renumber() {
                Ok(()) => done("renumbered"),
                Err(e) => Reaction::error(&e),
            },
            MenuAction::ReverseNumbering => match self.collection.reverse_numbering() {
                Ok(()) => done("unnumbered"),
                Err(e) => Reaction::error(&e),
            },
            MenuAction::SwitchGame(game) => {
                self.stop_reorganising();
                Reaction {
                    status: Some(Status::new(
                        Severity::Info,
                        format!("switching to {}", game.title()),
                    )),
                    command: Some(Command::SwitchGame(game)),
                }
            }
        }
    }

    fn focus_status(&self) -> Reaction {
        match &self.focus {
            Some(focus) => Reaction::status(
                Severity::Success,
                format!("focus is currently to \"{focus}\""),
            ),
            None => Reaction::default(),
        }
    }

    fn stop_reorganising(&mut self) {
        self.mode = Mode::Default;
        self.focus = None;
    }
}
