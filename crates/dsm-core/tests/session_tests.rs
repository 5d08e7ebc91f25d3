use std::fs;
use std::path::Path;

use dsm_core::{
    Collection, Command, Event, Game, Key, MenuAction, Mode, Options, Profiles, Reaction, Saves,
    Session, Severity, SortingType,
};

fn saves_session(root: &Path, names: &[&str], auto_renumber: bool) -> Session<Saves> {
    let dir = root.join("Main.profile");
    fs::create_dir_all(&dir).unwrap();
    fs::write(root.join("DS30000.sl2"), b"active").unwrap();
    for n in names {
        fs::write(dir.join(format!("{n}.sl2")), n.as_bytes()).unwrap();
    }
    let c = Collection::open(
        dir,
        Saves::new(root.join("DS30000.sl2")),
        Options {
            sorting: SortingType::Alphabetical,
            auto_renumber,
        },
    )
    .unwrap();
    Session::new(c)
}

fn activate(s: &mut Session<Saves>, name: &str) -> Reaction {
    s.handle(Event::Activate(name.into()))
}

fn severity(r: &Reaction) -> Option<Severity> {
    r.status.as_ref().map(|s| s.severity)
}

#[test]
fn default_activate_loads_save() {
    let root = tempfile::tempdir().unwrap();
    let mut s = saves_session(root.path(), &["Boss"], false);
    let r = activate(&mut s, "Boss");
    assert_eq!(r.status.unwrap().message, "save \"Boss\" has been loaded");
    assert_eq!(fs::read(root.path().join("DS30000.sl2")).unwrap(), b"Boss");
    assert_eq!(s.mode(), Mode::Default);
}

#[test]
fn rename_mode_uses_input_field() {
    let root = tempfile::tempdir().unwrap();
    let mut s = saves_session(root.path(), &["1 Alpha"], false);
    let r = s.handle(Event::Key(Key::Rename));
    assert_eq!(r.status.unwrap().message, "select a save to rename");
    assert_eq!(s.mode(), Mode::Renaming);

    s.handle(Event::Edit("Omega".into()));
    let r = activate(&mut s, "1 Alpha");
    assert_eq!(severity(&r), Some(Severity::Success));
    assert_eq!(s.mode(), Mode::Default);
    assert_eq!(s.collection().names(), vec!["1 Omega"]);
    assert_eq!(s.entry(), "");
}

#[test]
fn rename_with_empty_entry_reports_and_returns_to_default() {
    let root = tempfile::tempdir().unwrap();
    let mut s = saves_session(root.path(), &["a"], false);
    s.handle(Event::Key(Key::Rename));
    let r = activate(&mut s, "a");
    let status = r.status.unwrap();
    assert_eq!(status.severity, Severity::Error);
    assert_eq!(status.message, "this entry should not be empty");
    assert_eq!(s.mode(), Mode::Default);
    assert_eq!(s.collection().names(), vec!["a"]);
}

#[test]
fn rename_collision_is_reported() {
    let root = tempfile::tempdir().unwrap();
    let mut s = saves_session(root.path(), &["a", "b"], false);
    s.handle(Event::Key(Key::Rename));
    s.handle(Event::Edit("b".into()));
    let r = activate(&mut s, "a");
    let status = r.status.unwrap();
    assert_eq!(status.severity, Severity::Error);
    assert!(status.message.starts_with("this name already exists"));
    assert_eq!(s.collection().names(), vec!["a", "b"]);
}

#[test]
fn delete_mode_deletes_once() {
    let root = tempfile::tempdir().unwrap();
    let mut s = saves_session(root.path(), &["1 a", "2 b"], true);
    let r = s.handle(Event::Key(Key::Delete));
    assert_eq!(severity(&r), Some(Severity::Warning));
    activate(&mut s, "1 a");
    assert_eq!(s.mode(), Mode::Default);
    assert_eq!(s.collection().names(), vec!["1 b"]);
    // back in default mode the next click loads
    let r = activate(&mut s, "1 b");
    assert_eq!(r.status.unwrap().message, "save \"1 b\" has been loaded");
}

#[test]
fn submit_creates_item() {
    let root = tempfile::tempdir().unwrap();
    let mut s = saves_session(root.path(), &["1 a"], true);
    let r = s.handle(Event::SubmitText("Boss".into()));
    assert_eq!(r.status.unwrap().message, "save \"2 Boss\" has been created");
    assert_eq!(s.collection().names(), vec!["1 a", "2 Boss"]);

    let r = s.handle(Event::SubmitText(String::new()));
    assert_eq!(severity(&r), Some(Severity::Error));
    assert_eq!(s.collection().len(), 2);
}

#[test]
fn reorganising_swaps_until_cancelled() {
    let root = tempfile::tempdir().unwrap();
    let mut s = saves_session(root.path(), &["1 a", "2 b", "3 c"], false);
    s.handle(Event::Key(Key::Reorganise));
    assert_eq!(s.mode(), Mode::Reorganising);

    // arrows without focus do nothing
    assert_eq!(s.handle(Event::Key(Key::Down)), Reaction::default());

    let r = activate(&mut s, "1 a");
    assert_eq!(r.status.unwrap().message, "focus is currently to \"1 a\"");
    assert_eq!(s.focus(), Some("1 a"));

    s.handle(Event::Key(Key::Down));
    assert_eq!(s.focus(), Some("2 a"));
    s.handle(Event::Key(Key::Down));
    assert_eq!(s.focus(), Some("3 a"));
    assert_eq!(s.collection().names(), vec!["1 b", "2 c", "3 a"]);

    // bottom edge
    assert_eq!(s.handle(Event::Key(Key::Down)), Reaction::default());
    assert_eq!(s.mode(), Mode::Reorganising);

    s.handle(Event::Key(Key::Up));
    assert_eq!(s.focus(), Some("2 a"));

    let r = s.handle(Event::Key(Key::Cancel));
    assert_eq!(r.status.unwrap().message, "");
    assert_eq!(s.mode(), Mode::Default);
    assert_eq!(s.focus(), None);
}

#[test]
fn top_of_list_up_is_noop() {
    let root = tempfile::tempdir().unwrap();
    let mut s = saves_session(root.path(), &["1 a", "2 b"], false);
    s.handle(Event::Key(Key::Reorganise));
    activate(&mut s, "1 a");
    s.handle(Event::Key(Key::Up));
    assert_eq!(s.focus(), Some("1 a"));
    assert_eq!(s.collection().names(), vec!["1 a", "2 b"]);
}

#[test]
fn arrows_outside_reorganising_do_nothing() {
    let root = tempfile::tempdir().unwrap();
    let mut s = saves_session(root.path(), &["1 a", "2 b"], false);
    s.handle(Event::Key(Key::Down));
    assert_eq!(s.collection().names(), vec!["1 a", "2 b"]);
}

#[test]
fn mode_switch_cancels_reorganising() {
    let root = tempfile::tempdir().unwrap();
    let mut s = saves_session(root.path(), &["1 a", "2 b"], false);
    s.handle(Event::Key(Key::Reorganise));
    activate(&mut s, "2 b");
    s.handle(Event::Key(Key::Rename));
    assert_eq!(s.mode(), Mode::Renaming);
    assert_eq!(s.focus(), None);

    s.handle(Event::Key(Key::Reorganise));
    activate(&mut s, "1 a");
    s.handle(Event::Key(Key::Delete));
    assert_eq!(s.mode(), Mode::Deleting);
    assert_eq!(s.focus(), None);
}

#[test]
fn menu_actions_and_focus_cleanup() {
    let root = tempfile::tempdir().unwrap();
    let mut s = saves_session(root.path(), &["1 a", "2 b"], false);
    s.handle(Event::Key(Key::Reorganise));
    activate(&mut s, "1 a");
    let r = s.handle(Event::Menu(MenuAction::ReverseNumbering));
    assert_eq!(r.status.unwrap().message, "saves unnumbered");
    assert_eq!(s.collection().names(), vec!["a", "b"]);
    // the focused name no longer exists
    assert_eq!(s.focus(), None);

    s.handle(Event::Menu(MenuAction::Number));
    assert_eq!(s.collection().names(), vec!["1 a", "2 b"]);
}

#[test]
fn lifecycle_commands() {
    let root = tempfile::tempdir().unwrap();
    let mut s = saves_session(root.path(), &[], false);
    let r = s.handle(Event::Key(Key::Leave));
    assert_eq!(r.command, Some(Command::LeaveProfile));
    let r = s.handle(Event::Menu(MenuAction::SwitchGame(Game::Ds1)));
    assert_eq!(r.command, Some(Command::SwitchGame(Game::Ds1)));

    fs::create_dir(root.path().join("Alt.profile")).unwrap();
    let profiles = Collection::open(root.path(), Profiles, Options::default()).unwrap();
    let mut p = Session::new(profiles);
    let r = p.handle(Event::Activate("Alt".into()));
    assert_eq!(r.command, Some(Command::OpenProfile("Alt".into())));
    // the profile list has nothing to go back to
    assert_eq!(p.handle(Event::Key(Key::Leave)), Reaction::default());

    p.handle(Event::Key(Key::Delete));
    let r = p.handle(Event::Activate("Main".into()));
    assert_eq!(r.status.unwrap().message, "profile \"Main\" has been deleted");
    assert!(root.path().join("Main.formerprofile").is_dir());
    assert_eq!(p.collection().names(), vec!["Alt"]);
}

#[test]
fn unknown_item_is_an_error_status() {
    let root = tempfile::tempdir().unwrap();
    let mut s = saves_session(root.path(), &[], false);
    let r = activate(&mut s, "ghost");
    assert_eq!(severity(&r), Some(Severity::Error));
}

#[test]
fn unknown_item_still_ends_rename_and_delete() {
    let root = tempfile::tempdir().unwrap();
    let mut s = saves_session(root.path(), &["a"], false);
    for key in [Key::Rename, Key::Delete] {
        s.handle(Event::Key(key));
        let r = activate(&mut s, "ghost");
        assert_eq!(severity(&r), Some(Severity::Error));
        assert_eq!(s.mode(), Mode::Default);
    }
    assert_eq!(s.collection().names(), vec!["a"]);

    // reorganising keeps going
    s.handle(Event::Key(Key::Reorganise));
    activate(&mut s, "ghost");
    assert_eq!(s.mode(), Mode::Reorganising);
}
