//! Batch and merge behaviour against a real store with scripted tools.

use std::cell::RefCell;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use assert_fs::prelude::*;
use predicates::prelude::predicate;
use rstest::rstest;
use rust_decimal::Decimal;

use tradeboard_core::{store, GameFilter, GameId, NewGame, Settings, Username};
use tradeboard_export::{
    holding, ExportError, Exporter, FailureKind, NoticeLevel, ToolOutput, ToolRunner,
};

// ---------------------------------------------------------------------------
// Scripted tools
// ---------------------------------------------------------------------------

/// Plays pdflatex and pdftk. Compiles fail for sources containing
/// `fail_marker`; merges fail when `merge_status` is non-zero.
struct FakeTools {
    fail_marker: Option<&'static str>,
    merge_status: i32,
    calls: RefCell<Vec<(String, Vec<OsString>)>>,
}

impl FakeTools {
    fn new() -> Self {
        Self {
            fail_marker: None,
            merge_status: 0,
            calls: RefCell::new(Vec::new()),
        }
    }

    fn calls_to(&self, program: &str) -> Vec<Vec<OsString>> {
        self.calls
            .borrow()
            .iter()
            .filter(|(p, _)| p == program)
            .map(|(_, args)| args.clone())
            .collect()
    }

    fn compile(&self, args: &[OsString], cwd: &Path) -> std::io::Result<ToolOutput> {
        let tex = PathBuf::from(args.last().expect("source arg"));
        let stem = tex.file_stem().unwrap().to_string_lossy().into_owned();
        let source = fs::read_to_string(&tex)?;
        fs::write(cwd.join(format!("{stem}.aux")), b"aux")?;
        if let Some(marker) = self.fail_marker {
            if source.contains(marker) {
                fs::write(cwd.join(format!("{stem}.log")), "! Emergency stop.")?;
                return Ok(ToolOutput::exited(1));
            }
        }
        fs::write(cwd.join(format!("{stem}.log")), "Output written")?;
        fs::write(cwd.join(format!("{stem}.pdf")), format!("%PDF {stem}\n"))?;
        Ok(ToolOutput::exited(0))
    }

    fn merge(&self, args: &[OsString]) -> std::io::Result<ToolOutput> {
        if self.merge_status != 0 {
            return Ok(ToolOutput {
                status: Some(self.merge_status),
                stdout: Vec::new(),
                stderr: b"Error: Unable to find file.".to_vec(),
            });
        }
        let out = PathBuf::from(args.last().expect("output arg"));
        let split = args.len() - 3;
        let mut merged = Vec::new();
        for input in &args[..split] {
            merged.extend(fs::read(input)?);
        }
        fs::write(out, merged)?;
        Ok(ToolOutput::exited(0))
    }
}

impl ToolRunner for FakeTools {
    fn run(
        &self,
        program: &Path,
        args: &[OsString],
        cwd: Option<&Path>,
    ) -> std::io::Result<ToolOutput> {
        let name = program.to_string_lossy().into_owned();
        self.calls.borrow_mut().push((name.clone(), args.to_vec()));
        match name.as_str() {
            "pdflatex" => self.compile(args, cwd.expect("compiler cwd")),
            "pdftk" => self.merge(args),
            other => Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{other}: not found"),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

struct Env {
    home: assert_fs::TempDir,
    scratch: PathBuf,
}

impl Env {
    fn new() -> Self {
        let home = assert_fs::TempDir::new().expect("home");
        let scratch = home.path().join("scratch");
        Self { home, scratch }
    }

    fn add_game(&self, name: &str) -> GameId {
        let game = store::insert_game_at(
            self.home.path(),
            NewGame {
                name: name.to_string(),
                owner: Username::from("ada"),
                price: Decimal::new(1500, 2),
                ..NewGame::default()
            },
        )
        .expect("insert");
        game.id
    }

    fn exporter<'a>(&self, tools: &'a FakeTools) -> Exporter<&'a FakeTools> {
        Exporter::with_runner(self.home.path(), Settings::default(), tools)
            .with_scratch_root(&self.scratch)
    }

    fn printed(&self, id: GameId) -> bool {
        store::load_game_at(self.home.path(), id)
            .expect("load")
            .printed
    }

    fn scratch_is_empty(&self) -> bool {
        match fs::read_dir(&self.scratch) {
            Ok(mut entries) => entries.next().is_none(),
            Err(_) => true,
        }
    }
}

// ---------------------------------------------------------------------------
// Batch
// ---------------------------------------------------------------------------

#[rstest]
#[case("Catan: Cities & Knights!")]
#[case("  Pandemic Legacy  ")]
#[case("Ticket to Ride / Europe")]
fn held_file_names_are_sanitized(#[case] name: &str) {
    let file = holding::entry_name(GameId(7), name);
    let stem = file.strip_suffix(".pdf").expect("pdf extension");
    assert!(stem
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'));
    assert!(stem.starts_with("game_7_"));
}

#[test]
fn equal_names_get_distinct_files() {
    assert_ne!(
        holding::entry_name(GameId(1), "Azul"),
        holding::entry_name(GameId(2), "Azul")
    );
}

#[test]
fn successful_batch_holds_every_label_and_marks_printed() {
    let env = Env::new();
    let ids: Vec<_> = ["Azul", "Root", "Azul"]
        .into_iter()
        .map(|n| env.add_game(n))
        .collect();
    let tools = FakeTools::new();

    let summary = env
        .exporter(&tools)
        .generate_labels(&GameFilter::default())
        .expect("batch");

    assert_eq!(summary.succeeded.len(), 3);
    assert!(summary.failed.is_empty());
    for id in &ids {
        assert!(env.printed(*id), "game {id} not printed");
    }
    let exports = env.home.child(".tradeboard/exports");
    exports
        .child("game_1_Azul.pdf")
        .assert(predicate::path::is_file());
    exports
        .child("game_3_Azul.pdf")
        .assert(predicate::path::is_file());
    assert_eq!(fs::read_dir(exports.path()).unwrap().count(), 3);
    assert!(env.scratch_is_empty(), "scratch left behind");
    assert_eq!(tools.calls_to("pdflatex").len(), 3);

    let messages = summary.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].level, NoticeLevel::Success);
}

#[test]
fn failing_job_is_isolated() {
    let env = Env::new();
    let good_a = env.add_game("Azul");
    let bad = env.add_game("Broken Box");
    let good_b = env.add_game("Root");
    let tools = FakeTools {
        fail_marker: Some("Broken"),
        ..FakeTools::new()
    };

    let summary = env
        .exporter(&tools)
        .generate_labels(&GameFilter::default())
        .expect("batch");

    assert_eq!(summary.succeeded.len(), 2);
    assert_eq!(summary.failed.len(), 1);
    let failure = &summary.failed[0];
    assert_eq!(failure.game_id, bad);
    assert_eq!(failure.name, "Broken Box");
    assert_eq!(failure.kind, FailureKind::Compilation);
    assert_eq!(failure.diagnostic, "! Emergency stop.");

    assert!(env.printed(good_a));
    assert!(env.printed(good_b));
    assert!(!env.printed(bad));
    env.home
        .child(".tradeboard/exports/game_2_Broken_Box.pdf")
        .assert(predicate::path::missing());
    assert!(env.scratch_is_empty());

    let texts: Vec<_> = summary.messages().into_iter().map(|m| m.text).collect();
    assert!(texts
        .iter()
        .any(|t| t == "Failed to generate PDFs for: Broken Box (LaTeX compilation failed)"));
    assert!(texts.iter().all(|t| !t.contains("Emergency")));
}

#[test]
fn missing_compiler_fails_every_job_without_aborting() {
    let env = Env::new();
    let id = env.add_game("Azul");
    env.add_game("Root");
    let tools = FakeTools::new();
    let settings = Settings {
        tools: tradeboard_core::settings::ToolPaths {
            pdflatex: PathBuf::from("no-such-latex"),
            ..Default::default()
        },
        ..Settings::default()
    };

    let summary = Exporter::with_runner(env.home.path(), settings, &tools)
        .with_scratch_root(&env.scratch)
        .generate_labels(&GameFilter::default())
        .expect("batch");

    assert!(summary.succeeded.is_empty());
    assert_eq!(summary.failed.len(), 2);
    assert!(summary
        .failed
        .iter()
        .all(|f| f.kind == FailureKind::ToolInvocation));
    assert!(!env.printed(id));
}

/// Writes the source's intermediates, then panics mid-compile.
struct CrashingCompiler;

impl ToolRunner for CrashingCompiler {
    fn run(
        &self,
        _program: &Path,
        args: &[OsString],
        cwd: Option<&Path>,
    ) -> std::io::Result<ToolOutput> {
        let cwd = cwd.expect("compiler cwd");
        let tex = PathBuf::from(args.last().expect("source arg"));
        let stem = tex.file_stem().unwrap().to_string_lossy().into_owned();
        fs::write(cwd.join(format!("{stem}.aux")), b"aux")?;
        fs::write(cwd.join(format!("{stem}.log")), b"partial")?;
        panic!("compiler crashed");
    }
}

#[test]
fn scratch_is_removed_when_a_job_panics() {
    let env = Env::new();
    let id = env.add_game("Azul");
    let exporter = Exporter::with_runner(env.home.path(), Settings::default(), CrashingCompiler)
        .with_scratch_root(&env.scratch);

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        exporter.generate_labels(&GameFilter::default())
    }));

    assert!(result.is_err(), "batch should have unwound");
    assert!(env.scratch.is_dir(), "scratch root was never created");
    assert!(env.scratch_is_empty(), "scratch left behind after unwind");
    assert!(!env.printed(id));
}

#[test]
fn scratch_is_removed_when_merge_cannot_launch() {
    let env = Env::new();
    let held = seed_holding(&env, &["game_1_Azul.pdf"]);
    let tools = FakeTools::new();
    let settings = Settings {
        tools: tradeboard_core::settings::ToolPaths {
            pdftk: PathBuf::from("no-such-pdftk"),
            ..Default::default()
        },
        ..Settings::default()
    };

    let err = Exporter::with_runner(env.home.path(), settings, &tools)
        .with_scratch_root(&env.scratch)
        .merge_labels()
        .unwrap_err();

    assert!(matches!(err, ExportError::ToolInvocation { .. }));
    assert!(env.scratch.is_dir());
    assert!(env.scratch_is_empty());
    held.child("game_1_Azul.pdf").assert(predicate::path::exists());
}

#[test]
fn filter_limits_the_batch() {
    let env = Env::new();
    env.add_game("Azul");
    let root = env.add_game("Root");
    let tools = FakeTools::new();
    let filter = GameFilter {
        game_id: Some(root),
        ..GameFilter::default()
    };

    let summary = env.exporter(&tools).generate_labels(&filter).expect("batch");

    assert_eq!(summary.succeeded, vec!["game_2_Root.pdf".to_string()]);
    assert!(!env.printed(GameId(1)));
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

fn seed_holding(env: &Env, names: &[&str]) -> assert_fs::fixture::ChildPath {
    let exports = env.home.child(".tradeboard/exports");
    exports.create_dir_all().expect("mkdir");
    for name in names {
        exports
            .child(name)
            .write_str(&format!("%PDF {name}\n"))
            .expect("seed");
    }
    exports
}

#[test]
fn empty_holding_area_merges_nothing() {
    let env = Env::new();
    let tools = FakeTools::new();

    let err = env.exporter(&tools).merge_labels().unwrap_err();

    assert!(matches!(err, ExportError::NoInputs));
    assert!(tools.calls.borrow().is_empty());
}

#[test]
fn merge_is_ordered_and_consumes_inputs() {
    let env = Env::new();
    let exports = seed_holding(&env, &["game_2_X.pdf", "game_1_Y.pdf"]);
    let tools = FakeTools::new();

    let merged = env.exporter(&tools).merge_labels().expect("merge");

    let calls = tools.calls_to("pdftk");
    assert_eq!(calls.len(), 1);
    let args = &calls[0];
    assert_eq!(PathBuf::from(&args[0]), exports.path().join("game_1_Y.pdf"));
    assert_eq!(PathBuf::from(&args[1]), exports.path().join("game_2_X.pdf"));
    assert_eq!(args[2], "cat");
    assert_eq!(args[3], "output");

    assert_eq!(merged.consumed, vec!["game_1_Y.pdf", "game_2_X.pdf"]);
    assert_eq!(merged.bytes, b"%PDF game_1_Y.pdf\n%PDF game_2_X.pdf\n");
    assert!(merged.filename.starts_with("merged_games_"));
    assert!(merged.filename.ends_with(".pdf"));
    assert_eq!(fs::read_dir(exports.path()).unwrap().count(), 0);
    assert!(env.scratch_is_empty());
}

#[test]
fn failed_merge_leaves_holding_area_untouched() {
    let env = Env::new();
    let exports = seed_holding(&env, &["game_1_Y.pdf", "game_2_X.pdf"]);
    let tools = FakeTools {
        merge_status: 1,
        ..FakeTools::new()
    };

    let err = env.exporter(&tools).merge_labels().unwrap_err();

    assert!(matches!(err, ExportError::MergeFailed { status: Some(1) }));
    exports
        .child("game_1_Y.pdf")
        .assert(predicate::str::contains("%PDF game_1_Y.pdf"));
    exports
        .child("game_2_X.pdf")
        .assert(predicate::path::is_file());
    assert!(!err.user_message().contains("Unable to find"));
}

#[test]
fn batch_then_merge_round_trip() {
    let env = Env::new();
    env.add_game("Azul");
    env.add_game("Root");
    let tools = FakeTools::new();
    let exporter = env.exporter(&tools);

    exporter
        .generate_labels(&GameFilter::default())
        .expect("batch");
    let merged = exporter.merge_labels().expect("merge");

    assert_eq!(merged.consumed, vec!["game_1_Azul.pdf", "game_2_Root.pdf"]);
    assert!(exporter.holding_area().entries().unwrap().is_empty());
    let err = exporter.merge_labels().unwrap_err();
    assert!(matches!(err, ExportError::NoInputs));
}

// ---------------------------------------------------------------------------
// Member roster
// ---------------------------------------------------------------------------

#[test]
fn roster_lists_latest_joiner_first() {
    let env = Env::new();
    store::save_member_at(env.home.path(), &tradeboard_core::Member::new("ada")).expect("ada");
    std::thread::sleep(std::time::Duration::from_millis(5));
    store::save_member_at(env.home.path(), &tradeboard_core::Member::new("grace")).expect("grace");
    let tools = FakeTools::new();

    let bytes = env.exporter(&tools).export_members_csv().expect("roster");
    let text = String::from_utf8(bytes).expect("utf-8");
    let rows: Vec<&str> = text.lines().collect();

    assert_eq!(rows.len(), 3);
    assert!(rows[0].starts_with("User ID,Username,Email"));
    assert!(rows[1].starts_with("grace,grace,"));
    assert!(rows[2].starts_with("ada,ada,"));
    assert!(rows[2].contains(",Not Set,Not Set,Active,No,"));
}
