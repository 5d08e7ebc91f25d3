//! Line-oriented display surface for a [`Session`].
//!
//! ```text
//! :F2  :Ctrl-w  :Ctrl-Alt-r  :Up  :Down  :Escape  :Delete   named keys
//! @3  @Boss                                                 click an item
//! =text                                                     type into the input field
//! text                                                      type and press Enter
//! ```

use std::io::{self, BufRead, Write};
use std::path::Path;

use dsm_core::{
    Command, Config, Domain, Error, Event, Key, ManagerError, MenuAction, Mode, Profiles,
    Reaction, Saves, Session, Severity, Status, ordinal,
};

const HELP: &str = "\
  text          create (import) an item named text
  =text         set the input field without submitting
  @N / @name    click item N or the named item
  :F2           rename mode (click an item to give it the input field's text)
  :Ctrl-w       delete mode
  :Ctrl-Alt-r   reorganise mode, then :Up / :Down, :Escape to stop
  :Delete       back to the profile list
  :number :renumber :unnumber
  :switch ds1|ds3
  :help  :q";

enum Screen {
    Profiles(Session<Profiles>),
    Saves(Session<Saves>),
}

impl Screen {
    fn handle(&mut self, event: Event) -> Reaction {
        match self {
            Screen::Profiles(s) => s.handle(event),
            Screen::Saves(s) => s.handle(event),
        }
    }

    fn item_name(&self, index: usize) -> Option<String> {
        match self {
            Screen::Profiles(s) => s.collection().get_index(index).map(|i| i.name.clone()),
            Screen::Saves(s) => s.collection().get_index(index).map(|i| i.name.clone()),
        }
    }
}

enum Input {
    Quit,
    Help,
    Event(Event),
    Invalid(String),
}

pub fn run(config_path: &Path, mut cfg: Config, start_in_profiles: bool) -> Result<(), Error> {
    let mut screen = if start_in_profiles {
        profiles_screen(&cfg)?
    } else {
        match dsm_core::open::saves(&cfg)? {
            Some(c) => Screen::Saves(Session::new(c)),
            None => profiles_screen(&cfg)?,
        }
    };
    let mut status = initial_status(&screen);

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut line = String::new();
    loop {
        render(&screen, &cfg, &status).map_err(ManagerError::from)?;
        line.clear();
        if input.read_line(&mut line).map_err(ManagerError::from)? == 0 {
            break;
        }
        let event = match parse(line.trim_end_matches(['\r', '\n']), &screen) {
            Input::Quit => break,
            Input::Help => {
                println!("{HELP}");
                continue;
            }
            Input::Invalid(msg) => {
                status = Status::new(Severity::Error, msg);
                continue;
            }
            Input::Event(event) => event,
        };

        let reaction = screen.handle(event);
        if let Some(s) = reaction.status {
            status = s;
        }
        if let Some(command) = reaction.command {
            match follow(command, &mut cfg, config_path) {
                Ok(next) => {
                    screen = next;
                    status = initial_status(&screen);
                }
                Err(e) => status = Status::new(Severity::Error, e.to_string()),
            }
        }
    }
    Ok(())
}

fn profiles_screen(cfg: &Config) -> Result<Screen, Error> {
    Ok(Screen::Profiles(Session::new(dsm_core::open::profiles(cfg)?)))
}

fn initial_status(screen: &Screen) -> Status {
    match screen {
        Screen::Profiles(_) => Status::new(Severity::Success, "Select a profile to load"),
        Screen::Saves(_) => Status::cleared(),
    }
}

/// Carry out a lifecycle command and return the screen to show next. The
/// config is only changed and saved once the new screen opened.
fn follow(command: Command, cfg: &mut Config, config_path: &Path) -> Result<Screen, Error> {
    let mut next_cfg = cfg.clone();
    let screen = match command {
        Command::OpenProfile(name) => {
            next_cfg.select_profile(&name);
            match dsm_core::open::saves(&next_cfg)? {
                Some(c) => Screen::Saves(Session::new(c)),
                None => profiles_screen(&next_cfg)?,
            }
        }
        Command::LeaveProfile => {
            next_cfg.leave_profile();
            profiles_screen(&next_cfg)?
        }
        Command::SwitchGame(game) => {
            next_cfg.switch_game(game);
            profiles_screen(&next_cfg)?
        }
    };
    next_cfg.save(config_path)?;
    *cfg = next_cfg;
    Ok(screen)
}

fn parse(line: &str, screen: &Screen) -> Input {
    if let Some(text) = line.strip_prefix('=') {
        return Input::Event(Event::Edit(text.to_string()));
    }
    if let Some(target) = line.strip_prefix('@') {
        let name = match target.parse::<usize>() {
            Ok(n) if n >= 1 => match screen.item_name(n - 1) {
                Some(name) => name,
                None => return Input::Invalid(format!("no item #{n}")),
            },
            _ => target.to_string(),
        };
        return Input::Event(Event::Activate(name));
    }
    let Some(word) = line.strip_prefix(':') else {
        return Input::Event(Event::SubmitText(line.to_string()));
    };
    let (word, arg) = word.split_once(' ').unwrap_or((word, ""));
    match word.to_ascii_lowercase().as_str() {
        "q" | "quit" => Input::Quit,
        "help" | "?" => Input::Help,
        "number" => Input::Event(Event::Menu(MenuAction::Number)),
        "renumber" => Input::Event(Event::Menu(MenuAction::Renumber)),
        "unnumber" => Input::Event(Event::Menu(MenuAction::ReverseNumbering)),
        "switch" => match arg.parse() {
            Ok(game) => Input::Event(Event::Menu(MenuAction::SwitchGame(game))),
            Err(e) => Input::Invalid(e),
        },
        _ => match word.parse::<Key>() {
            Ok(key) => Input::Event(Event::Key(key)),
            Err(e) => Input::Invalid(e),
        },
    }
}

fn render(screen: &Screen, cfg: &Config, status: &Status) -> io::Result<()> {
    let mut out = io::stdout().lock();
    match screen {
        Screen::Profiles(s) => {
            writeln!(out, "== Change profile menu ({}) ==", cfg.game.title())?;
            render_session(&mut out, s)?;
        }
        Screen::Saves(s) => {
            let profile = cfg.profile.as_deref().unwrap_or_default();
            writeln!(out, "== \"{}\" in {} ==", ordinal::label(profile), cfg.game)?;
            render_session(&mut out, s)?;
        }
    }
    if !status.message.is_empty() {
        let tag = match status.severity {
            Severity::Info => "",
            Severity::Success => "+ ",
            Severity::Warning => "! ",
            Severity::Error => "error: ",
        };
        writeln!(out, "{tag}{}", status.message)?;
    }
    write!(out, "> ")?;
    out.flush()
}

fn render_session<D: Domain>(out: &mut impl Write, s: &Session<D>) -> io::Result<()> {
    let c = s.collection();
    let width = c.len().to_string().len();
    for (i, item) in c.list().enumerate() {
        let marker = if s.focus() == Some(item.name.as_str()) {
            '>'
        } else {
            ' '
        };
        writeln!(out, "{marker}{:>width$}. {}", i + 1, item.name)?;
    }
    if c.is_empty() {
        writeln!(out, "  (no {}s)", c.domain().noun())?;
    }
    let mode = match s.mode() {
        Mode::Default => None,
        Mode::Renaming => Some("renaming"),
        Mode::Deleting => Some("deleting"),
        Mode::Reorganising => Some("reorganising"),
    };
    if let Some(mode) = mode {
        writeln!(out, "[{mode}]")?;
    }
    if !s.entry().is_empty() {
        writeln!(out, "input: {}", s.entry())?;
    }
    Ok(())
}
