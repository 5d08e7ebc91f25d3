use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use dsm_core::archive::purge_archived;
use dsm_core::backup::zip_backup_dir;
use dsm_core::discover::find_game_dir;
use dsm_core::{Collection, Config, Direction, Domain, Game, Loaded, ManagerError, Profiles, Saves};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod shell;

#[derive(Parser, Debug)]
#[command(
    name = "dsm",
    about = "Store, rename, reorder and reload Dark Souls save files by profile",
    version
)]
struct Cli {
    /// Settings file
    #[arg(long, global = true, default_value = dsm_core::config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Log what is done to the files (RUST_LOG overrides)
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    cmd: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Write a fresh config, locating the game's save directory
    Init(InitArgs),
    /// List saves of the active profile (or profiles)
    List(ListArgs),
    /// Import the game's current save (or create a profile) under a name
    New(NameArgs),
    /// Copy a save over the game's save (or select a profile)
    Load(NameArgs),
    /// Rename, keeping the ordinal
    Rename(RenameArgs),
    /// Delete a save (profiles are archived instead)
    Delete(NameArgs),
    /// Prefix every name with a fresh ordinal
    Number(ScopeArgs),
    /// Replace ordinals with a fresh dense sequence
    Renumber(ScopeArgs),
    /// Strip ordinals
    Unnumber(ScopeArgs),
    /// Swap an item's ordinal with its neighbour
    Move(MoveArgs),
    /// Add or remove a literal prefix on every name
    Prefix(PrefixArgs),
    /// Permanently remove archived profiles
    PurgeArchived(PurgeArgs),
    /// Zip a profile directory next to it
    Backup(BackupArgs),
    /// Make the other game active (clears the active profile)
    SwitchGame(SwitchArgs),
    /// Interactive session
    Shell(ScopeArgs),
}

#[derive(ClapArgs, Debug)]
struct ScopeArgs {
    /// Act on the profile list instead of the active profile's saves
    #[arg(long, default_value_t = false)]
    profiles: bool,
}

#[derive(ClapArgs, Debug)]
struct InitArgs {
    #[arg(long, default_value = "ds3")]
    game: Game,
    /// Save directory to use instead of searching for it
    #[arg(long)]
    path: Option<PathBuf>,
    /// Directory to search (defaults to the game's usual location)
    #[arg(long)]
    search_root: Option<PathBuf>,
    /// Overwrite an existing config
    #[arg(long, default_value_t = false)]
    force: bool,
}

#[derive(ClapArgs, Debug)]
struct ListArgs {
    #[command(flatten)]
    scope: ScopeArgs,
    /// Print items as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(ClapArgs, Debug)]
struct NameArgs {
    name: String,
    #[command(flatten)]
    scope: ScopeArgs,
}

#[derive(ClapArgs, Debug)]
struct RenameArgs {
    /// Current full name
    name: String,
    /// New name, without ordinal
    new_name: String,
    #[command(flatten)]
    scope: ScopeArgs,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum MoveDir {
    Up,
    Down,
}

#[derive(ClapArgs, Debug)]
struct MoveArgs {
    name: String,
    #[arg(value_enum)]
    direction: MoveDir,
    /// Number of single swaps
    #[arg(long, default_value_t = 1)]
    times: usize,
    #[command(flatten)]
    scope: ScopeArgs,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PrefixAction {
    Add,
    Remove,
}

#[derive(ClapArgs, Debug)]
struct PrefixArgs {
    #[arg(value_enum)]
    action: PrefixAction,
    prefix: String,
    #[command(flatten)]
    scope: ScopeArgs,
}

#[derive(ClapArgs, Debug)]
struct PurgeArgs {
    /// Zip each archived profile before removing it
    #[arg(long, default_value_t = false)]
    backup: bool,
}

#[derive(ClapArgs, Debug)]
struct BackupArgs {
    /// Profile to back up (defaults to the active one)
    profile: Option<String>,
}

#[derive(ClapArgs, Debug)]
struct SwitchArgs {
    game: Game,
}

/// A mutation or query run against either collection.
enum Op {
    New(String),
    Load(String),
    Rename { name: String, new_name: String },
    Delete(String),
    Number,
    Renumber,
    Unnumber,
    Move { name: String, dir: Direction, times: usize },
    PrefixAdd(String),
    PrefixRemove(String),
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    tracing::debug!(config = %cli.config.display(), command = ?cli.cmd, "starting");
    let config = cli.config;
    match cli.cmd.unwrap_or(Cmd::List(ListArgs {
        scope: ScopeArgs { profiles: false },
        json: false,
    })) {
        Cmd::Init(a) => cmd_init(&config, a),
        Cmd::List(a) => cmd_list(&config, a),
        Cmd::New(a) => cmd_op(&config, a.scope, Op::New(a.name)),
        Cmd::Load(a) => cmd_op(&config, a.scope, Op::Load(a.name)),
        Cmd::Rename(a) => cmd_op(
            &config,
            a.scope,
            Op::Rename {
                name: a.name,
                new_name: a.new_name,
            },
        ),
        Cmd::Delete(a) => cmd_op(&config, a.scope, Op::Delete(a.name)),
        Cmd::Number(s) => cmd_op(&config, s, Op::Number),
        Cmd::Renumber(s) => cmd_op(&config, s, Op::Renumber),
        Cmd::Unnumber(s) => cmd_op(&config, s, Op::Unnumber),
        Cmd::Move(a) => cmd_op(
            &config,
            a.scope,
            Op::Move {
                name: a.name,
                dir: match a.direction {
                    MoveDir::Up => Direction::Up,
                    MoveDir::Down => Direction::Down,
                },
                times: a.times,
            },
        ),
        Cmd::Prefix(a) => cmd_op(
            &config,
            a.scope,
            match a.action {
                PrefixAction::Add => Op::PrefixAdd(a.prefix),
                PrefixAction::Remove => Op::PrefixRemove(a.prefix),
            },
        ),
        Cmd::PurgeArchived(a) => cmd_purge(&config, a),
        Cmd::Backup(a) => cmd_backup(&config, a),
        Cmd::SwitchGame(a) => cmd_switch(&config, a),
        Cmd::Shell(s) => cmd_shell(&config, s),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: &Path) -> Config {
    Config::load(path).unwrap_or_else(|e| {
        eprintln!("error: {}", e);
        eprintln!("hint: run `dsm init` to create one");
        std::process::exit(2);
    })
}

fn save_config(cfg: &Config, path: &Path) {
    cfg.save(path).unwrap_or_else(|e| {
        eprintln!("error writing config: {}", e);
        std::process::exit(5);
    });
}

fn open_profiles(cfg: &Config) -> Collection<Profiles> {
    dsm_core::open::profiles(cfg).unwrap_or_else(|e| {
        eprintln!("error: {}", e);
        std::process::exit(3);
    })
}

fn open_saves(cfg: &Config) -> Collection<Saves> {
    match dsm_core::open::saves(cfg) {
        Ok(Some(c)) => c,
        Ok(None) => {
            eprintln!("no profile selected; use `dsm load --profiles <name>`");
            std::process::exit(3);
        }
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(3);
        }
    }
}

fn cmd_init(config: &Path, args: InitArgs) {
    if config.exists() && !args.force {
        eprintln!(
            "{} already exists; pass --force to overwrite",
            config.display()
        );
        std::process::exit(2);
    }
    let game_dir = match args.path {
        Some(p) => p,
        None => {
            let root = args
                .search_root
                .or_else(|| args.game.default_search_root())
                .unwrap_or_else(|| {
                    eprintln!("cannot guess where {} keeps saves; pass --path", args.game.title());
                    std::process::exit(2);
                });
            find_game_dir(&root).unwrap_or_else(|e| {
                eprintln!("error: {}", e);
                eprintln!("hint: pass --path with the save directory");
                std::process::exit(3);
            })
        }
    };
    let cfg = Config::auto(args.game, &game_dir);
    save_config(&cfg, config);
    println!("{} saves at {}", args.game.title(), game_dir.display());
}

fn cmd_list(config: &Path, args: ListArgs) {
    let cfg = load_config(config);
    if args.scope.profiles {
        print_items(&open_profiles(&cfg), args.json);
    } else {
        print_items(&open_saves(&cfg), args.json);
    }
}

fn print_items<D: Domain>(c: &Collection<D>, json: bool) {
    if json {
        let items: Vec<_> = c.list().collect();
        println!("{}", serde_json::to_string_pretty(&items).unwrap());
        return;
    }
    for item in c.list() {
        println!("{}", item.name);
    }
}

fn cmd_op(config: &Path, scope: ScopeArgs, op: Op) {
    let mut cfg = load_config(config);
    let res = if scope.profiles {
        let mut profiles = open_profiles(&cfg);
        let res = run_op(&mut profiles, op);
        if let Ok(done) = &res {
            if track_active_profile(&mut cfg, &profiles, done) {
                save_config(&cfg, config);
            }
        }
        res
    } else {
        run_op(&mut open_saves(&cfg), op)
    };
    match res {
        Ok(done) => {
            if let Some(Loaded::Profile { name }) = done.loaded {
                cfg.select_profile(&name);
                save_config(&cfg, config);
            }
            println!("{}", done.message);
        }
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(4);
        }
    }
}

/// Result of an [`Op`].
struct Done {
    message: String,
    loaded: Option<Loaded>,
    /// Old and new name of a renamed item.
    renamed: Option<(String, String)>,
}

impl Done {
    fn message(message: String) -> Self {
        Done {
            message,
            loaded: None,
            renamed: None,
        }
    }
}

/// Point the config at the active profile's new name, or at no profile once
/// it is gone. Returns whether the config changed.
fn track_active_profile(cfg: &mut Config, profiles: &Collection<Profiles>, done: &Done) -> bool {
    let Some(active) = cfg.profile.clone() else {
        return false;
    };
    if let Some((old, new)) = &done.renamed {
        if *old == active {
            cfg.select_profile(new);
            return true;
        }
    }
    if !profiles.contains(&active) {
        cfg.leave_profile();
        return true;
    }
    false
}

fn run_op<D: Domain>(c: &mut Collection<D>, op: Op) -> Result<Done, ManagerError> {
    let noun = c.domain().noun();
    let message = match op {
        Op::New(name) => format!("created {} \"{}\"", noun, c.create(&name)?),
        Op::Load(name) => {
            let loaded = c.load(&name)?;
            let message = match &loaded {
                Loaded::Save { name } => format!("save \"{}\" has been loaded", name),
                Loaded::Profile { name } => format!("profile \"{}\" is now active", name),
            };
            return Ok(Done {
                loaded: Some(loaded),
                ..Done::message(message)
            });
        }
        Op::Rename { name, new_name } => {
            let renamed = c.rename(&name, &new_name)?;
            return Ok(Done {
                renamed: Some((name, renamed.clone())),
                ..Done::message(format!("renamed to \"{}\"", renamed))
            });
        }
        Op::Delete(name) => {
            c.delete(&name)?;
            format!("deleted {} \"{}\"", noun, name)
        }
        Op::Number => {
            c.number()?;
            format!("numbered {} {}s", c.len(), noun)
        }
        Op::Renumber => {
            c.renumber()?;
            format!("renumbered {} {}s", c.len(), noun)
        }
        Op::Unnumber => {
            c.reverse_numbering()?;
            format!("stripped ordinals from {} {}s", c.len(), noun)
        }
        Op::Move { name, dir, times } => {
            let mut current = name;
            for _ in 0..times {
                match c.swap_adjacent(&current, dir)? {
                    Some(next) => current = next,
                    None => break,
                }
            }
            format!("{} is now \"{}\"", noun, current)
        }
        Op::PrefixAdd(prefix) => {
            c.add_prefix(&prefix)?;
            format!("prefixed {} {}s with \"{}\"", c.len(), noun, prefix)
        }
        Op::PrefixRemove(prefix) => {
            c.remove_prefix(&prefix)?;
            format!("removed prefix \"{}\"", prefix)
        }
    };
    Ok(Done::message(message))
}

fn cmd_purge(config: &Path, args: PurgeArgs) {
    let cfg = load_config(config);
    let game_dir = cfg.game_dir().unwrap_or_else(|e| {
        eprintln!("error: {}", e);
        std::process::exit(2);
    });
    match purge_archived(game_dir, args.backup) {
        Ok(purged) => {
            for zip in &purged.backups {
                println!("backup: {}", zip.display());
            }
            println!("removed {} archived profile(s)", purged.removed.len());
        }
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(4);
        }
    }
}

fn cmd_backup(config: &Path, args: BackupArgs) {
    let mut cfg = load_config(config);
    if let Some(profile) = args.profile {
        cfg.select_profile(&profile);
    }
    let dir = match cfg.profile_dir() {
        Ok(Some(dir)) => dir,
        Ok(None) => {
            eprintln!("no profile selected; name one");
            std::process::exit(3);
        }
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    };
    match zip_backup_dir(&dir) {
        Ok(zip) => println!("{}", zip.display()),
        Err(e) => {
            eprintln!("backup error: {}", e);
            std::process::exit(4);
        }
    }
}

fn cmd_switch(config: &Path, args: SwitchArgs) {
    let mut cfg = load_config(config);
    cfg.switch_game(args.game);
    if let Err(e) = cfg.game_dir() {
        eprintln!("error: {}", e);
        eprintln!("hint: run `dsm init --game {} --force` or edit the config", args.game);
        std::process::exit(2);
    }
    save_config(&cfg, config);
    println!("now managing {}", args.game.title());
}

fn cmd_shell(config: &Path, scope: ScopeArgs) {
    let cfg = load_config(config);
    if let Err(e) = shell::run(config, cfg, scope.profiles) {
        eprintln!("error: {}", e);
        std::process::exit(4);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(names: &[&str]) -> (tempfile::TempDir, Config) {
        let d = tempfile::tempdir().unwrap();
        for n in names {
            std::fs::create_dir(d.path().join(format!("{n}.profile"))).unwrap();
        }
        let mut cfg = Config::auto(Game::Ds3, d.path());
        cfg.select_profile("Main");
        (d, cfg)
    }

    #[test]
    fn renaming_active_profile_follows_it() {
        let (_d, mut cfg) = setup(&["Main", "Alt"]);
        let mut profiles = dsm_core::open::profiles(&cfg).unwrap();
        let done = run_op(
            &mut profiles,
            Op::Rename {
                name: "Main".into(),
                new_name: "Story".into(),
            },
        )
        .unwrap();
        assert!(track_active_profile(&mut cfg, &profiles, &done));
        assert_eq!(cfg.profile.as_deref(), Some("Story"));
    }

    #[test]
    fn deleting_active_profile_leaves_it() {
        let (_d, mut cfg) = setup(&["Main", "Alt"]);
        let mut profiles = dsm_core::open::profiles(&cfg).unwrap();
        let done = run_op(&mut profiles, Op::Delete("Main".into())).unwrap();
        assert!(track_active_profile(&mut cfg, &profiles, &done));
        assert!(cfg.profile.is_none());
    }

    #[test]
    fn other_profiles_leave_config_alone() {
        let (_d, mut cfg) = setup(&["Main", "Alt"]);
        let mut profiles = dsm_core::open::profiles(&cfg).unwrap();
        let done = run_op(&mut profiles, Op::New("Extra".into())).unwrap();
        assert!(!track_active_profile(&mut cfg, &profiles, &done));
        let done = run_op(&mut profiles, Op::Delete("Alt".into())).unwrap();
        assert!(!track_active_profile(&mut cfg, &profiles, &done));
        assert_eq!(cfg.profile.as_deref(), Some("Main"));
        assert_eq!(profiles.names(), vec!["Extra", "Main"]);
    }
}
