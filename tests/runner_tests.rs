mod common;

use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

use common::{division, table, RepoBuilder};
use fitrun::fixture::column::Values;
use fitrun::fixture::{ColumnFixture, FixtureRegistry};
use fitrun::repository::{DocumentRepository, PageAttributes};
use fitrun::{
    Counters, Document, ExecutionEngine, FixtureEngine, FixtureError, FolderResultSink,
    Notifier, RepositoryError, ResultSink, RunConfig, RunError, Runner, SingleResult,
    SinkError, TestResult, PageTree, TreeRepository,
};

fn divide(inputs: &Values) -> Result<Values, FixtureError> {
    let parse = |key: &str| -> Result<i64, FixtureError> {
        inputs
            .get(key)
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| FixtureError::new(format!("bad {key}")))
    };
    let denominator = parse("denominator")?;
    if denominator == 0 {
        return Err(FixtureError::new("division by zero"));
    }
    let mut out = Values::new();
    out.insert("quotient".into(), (parse("numerator")? / denominator).to_string());
    Ok(out)
}

fn registry() -> FixtureRegistry {
    let mut registry = FixtureRegistry::with_builtins();
    registry.register("Division", || ColumnFixture::new(divide));
    registry
}

/// Remembers every notification as a line.
#[derive(Default)]
struct Recorder {
    events: Vec<String>,
    details: Vec<String>,
}

impl Notifier for Recorder {
    fn start(&mut self, name: &str) {
        self.events.push(format!("start {name}"));
    }
    fn finish(&mut self, name: &str) {
        self.events.push(format!("finish {name}"));
    }
    fn fail(&mut self, name: &str, detail: &str) {
        self.events.push(format!("fail {name}"));
        self.details.push(detail.to_string());
    }
}

fn suite_repo() -> RepoBuilder {
    RepoBuilder::with_assets()
        .suite("Calc")
        .test("Calc.First", &division(&[("10", "2", "5")]))
        .test("Calc.Second", &division(&[("9", "3", "4"), ("1", "0", "1")]))
        .test("Calc.Third", &division(&[("8", "4", "2"), ("6", "3", "2")]))
}

fn runner_for(repo: &RepoBuilder) -> Runner {
    let config = RunConfig::new(repo.root(), repo.output());
    Runner::from_config(&config, registry()).unwrap()
}

#[test]
fn suite_runs_every_test_and_merges_counters() {
    let repo = suite_repo();
    let runner = runner_for(&repo);
    let mut recorder = Recorder::default();

    let suite = runner.run_suite_result("Calc", &mut recorder).unwrap();

    assert_eq!(suite.counters(), Counters::new(3, 1, 0, 1));
    assert_eq!(suite.failed(), ["Calc.Second"]);
    assert_eq!(
        recorder.events,
        [
            "start Calc.First",
            "finish Calc.First",
            "start Calc.Second",
            "fail Calc.Second",
            "start Calc.Third",
            "finish Calc.Third",
        ]
    );
    assert!(recorder.details[0].starts_with("wrong: 1 exceptions: 1\n"));
}

#[test]
fn suite_writes_pages_index_summary_and_assets() {
    let repo = suite_repo();
    let runner = runner_for(&repo);
    runner.run_suite("Calc", &mut fitrun::NullNotifier).unwrap();

    let out = repo.output();
    for file in [
        "Calc.First.html",
        "Calc.Second.html",
        "Calc.Third.html",
        "index.html",
        "summary.json",
        "fitnesse.css",
        "fitnesse.js",
        "images/collapsableOpen.gif",
        "images/collapsableClosed.gif",
    ] {
        assert!(out.join(file).is_file(), "missing {file}");
    }
    let second = fs::read_to_string(out.join("Calc.Second.html")).unwrap();
    assert!(second.contains("class=\"fail\""));
    assert!(second.contains("division by zero"));

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("summary.json")).unwrap()).unwrap();
    assert_eq!(summary["successful"], false);
    assert_eq!(summary["totals"]["right"], 3);
}

#[test]
fn similar_names_keep_separate_result_pages() {
    let repo = RepoBuilder::with_assets()
        .suite("S")
        .test("S.Foo Bar", &division(&[("4", "2", "2")]))
        .test("S.Foo_Bar", &division(&[("4", "2", "3")]));
    let runner = runner_for(&repo);

    let suite = runner.run_suite_result("S", &mut fitrun::NullNotifier).unwrap();

    assert_eq!(suite.leaves().count(), 2);
    let pages: Vec<_> = fs::read_dir(repo.output())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("S.Foo"))
        .collect();
    assert_eq!(pages.len(), 2, "pages: {pages:?}");
    let passing = fs::read_to_string(repo.output().join("S.Foo_20Bar.html")).unwrap();
    let failing = fs::read_to_string(repo.output().join("S.Foo_5FBar.html")).unwrap();
    assert!(!passing.contains("class=\"fail\""));
    assert!(failing.contains("class=\"fail\""));
}

#[test]
fn single_test_returns_its_counters() {
    let repo = suite_repo();
    let runner = runner_for(&repo);
    let mut recorder = Recorder::default();

    let counters = runner.run_test("Calc.Third", &mut recorder).unwrap();

    assert_eq!(counters, Counters::new(2, 0, 0, 0));
    assert_eq!(recorder.events, ["start Calc.Third", "finish Calc.Third"]);
    assert!(repo.output().join("Calc.Third.html").is_file());
}

#[test]
fn page_without_tables_passes_with_zero_counters() {
    let repo = RepoBuilder::with_assets()
        .suite("Docs")
        .test("Docs.Prose", "<p>no tables here</p>");
    let runner = runner_for(&repo);
    let mut recorder = Recorder::default();

    let counters = runner.run_test("Docs.Prose", &mut recorder).unwrap();

    assert_eq!(counters, Counters::default());
    assert_eq!(recorder.events, ["start Docs.Prose", "finish Docs.Prose"]);
    let page = fs::read_to_string(repo.output().join("Docs.Prose.html")).unwrap();
    assert!(page.contains("Docs.Prose contains no tables"));
}

#[test]
fn unknown_fixture_fails_only_that_test() {
    let repo = RepoBuilder::with_assets()
        .suite("Mixed")
        .test("Mixed.Good", &table("Comment"))
        .test("Mixed.Bad", &table("NoSuchFixture"));
    let runner = runner_for(&repo);
    let mut recorder = Recorder::default();

    let counters = runner.run_suite("Mixed", &mut recorder).unwrap();

    assert_eq!(counters.exceptions, 1);
    assert!(recorder.events.contains(&"finish Mixed.Good".to_string()));
    assert!(recorder.events.contains(&"fail Mixed.Bad".to_string()));
}

#[test]
fn missing_assets_stop_construction() {
    let repo = RepoBuilder::new().suite("Calc");
    let config = RunConfig::new(repo.root(), repo.output());
    assert!(matches!(
        Runner::from_config(&config, registry()),
        Err(RunError::Seed(SinkError::Io { .. }))
    ));
}

#[test]
fn in_memory_repository_without_assets_stops_construction() {
    let mut tree = PageTree::new();
    let root = tree.root();
    tree.add_page(root, "Calc", "", PageAttributes::suite());
    let repo = RepoBuilder::new();
    let result = Runner::new(
        TreeRepository::in_memory(tree),
        FixtureEngine::fit(registry()),
        FolderResultSink::new(repo.output()),
    );
    assert!(matches!(
        result,
        Err(RunError::Seed(SinkError::Io { ref source, .. }))
            if source.kind() == std::io::ErrorKind::NotFound
    ));
    assert!(!repo.output().join("fitnesse.css").exists());
}

#[test]
fn non_suite_names_run_nothing() {
    let repo = suite_repo();
    let runner = runner_for(&repo);
    let mut recorder = Recorder::default();

    let err = runner.run_suite("Calc.First", &mut recorder).unwrap_err();

    assert!(matches!(err, RunError::Resolve(RepositoryError::NotASuite { .. })));
    assert!(recorder.events.is_empty());
    assert!(!repo.output().join("index.html").exists());
    assert!(!repo.output().join("Calc.First.html").exists());
}

#[test]
fn unknown_names_run_nothing() {
    let repo = suite_repo();
    let runner = runner_for(&repo);
    let mut recorder = Recorder::default();

    let err = runner.run_suite("Calc.Nope", &mut recorder).unwrap_err();

    assert!(matches!(err, RunError::Resolve(RepositoryError::NotFound { .. })));
    assert!(recorder.events.is_empty());
    assert!(!repo.output().join("index.html").exists());
}

// =============================================================================
// IN-MEMORY COLLABORATORS
// =============================================================================

struct FixedRepository(Vec<Document>);

impl DocumentRepository for FixedRepository {
    fn resolve_one(&self, name: &str) -> Result<Document, RepositoryError> {
        self.0
            .iter()
            .find(|d| d.name() == name)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound { name: name.into() })
    }

    fn resolve_suite(&self, _name: &str) -> Result<Vec<Document>, RepositoryError> {
        Ok(self.0.clone())
    }

    fn seed_assets(&self, _sink: &dyn ResultSink) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Scores a document by its content: `pass` or `fail`.
struct ScriptedEngine;

impl ExecutionEngine for ScriptedEngine {
    fn run(&self, document: &Document) -> SingleResult {
        let counters = match document.content() {
            "pass" => Counters::new(1, 0, 0, 0),
            _ => Counters::new(0, 1, 0, 0),
        };
        SingleResult::new(document.name(), counters, document.content())
    }
}

/// Keeps results in memory and refuses to record one name.
#[derive(Clone, Default)]
struct MemorySink {
    refuse: Option<String>,
    recorded: Rc<RefCell<Vec<String>>>,
}

impl ResultSink for MemorySink {
    fn add_asset(&self, _bytes: &[u8], _relative_name: &str) -> Result<(), SinkError> {
        Ok(())
    }

    fn record_result(&self, result: &TestResult) -> Result<(), SinkError> {
        if self.refuse.as_deref() == Some(result.name()) {
            let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
            return Err(SinkError::Io {
                path: result.name().into(),
                source: denied,
            });
        }
        self.recorded.borrow_mut().push(result.name().to_string());
        Ok(())
    }
}

fn documents() -> Vec<Document> {
    vec![
        Document::new("S.One", "pass"),
        Document::new("S.Two", "pass"),
        Document::new("S.Three", "fail"),
    ]
}

#[test]
fn persistence_failure_is_reported_and_the_run_continues() {
    let sink = MemorySink {
        refuse: Some("S.Two".into()),
        ..MemorySink::default()
    };
    let recorded = Rc::clone(&sink.recorded);
    let runner = Runner::new(FixedRepository(documents()), ScriptedEngine, sink).unwrap();
    let mut recorder = Recorder::default();

    let counters = runner.run_suite("S", &mut recorder).unwrap();

    assert_eq!(counters, Counters::new(2, 1, 0, 0));
    assert_eq!(*recorded.borrow(), ["S.One", "S.Three", "S"]);
    assert_eq!(
        recorder.events,
        [
            "start S.One",
            "finish S.One",
            "start S.Two",
            "fail S.Two",
            "start S.Three",
            "fail S.Three",
        ]
    );
    assert!(recorder.details[0].contains("read-only"));
}

#[test]
fn aggregate_is_recorded_after_every_leaf() {
    let sink = MemorySink::default();
    let recorded = Rc::clone(&sink.recorded);
    let runner = Runner::new(FixedRepository(documents()), ScriptedEngine, sink).unwrap();

    let suite = runner.run_suite_result("S", &mut fitrun::NullNotifier).unwrap();

    assert_eq!(suite.children().len(), 3);
    assert_eq!(recorded.borrow().last().map(String::as_str), Some("S"));
}

#[test]
fn engine_outcomes_survive_unchanged() {
    let engine = FixtureEngine::fit(registry());
    let doc = Document::new("Plain", division(&[("4", "2", "2")]));
    let result = engine.run(&doc);
    assert_eq!(result.name, "Plain");
    assert_eq!(result.counters, Counters::new(1, 0, 0, 0));

    let dir = tempfile::tempdir().unwrap();
    let sink = FolderResultSink::new(dir.path());
    sink.record_result(&TestResult::Single(result)).unwrap();
    assert!(sink.root().join("Plain.html").is_file());
}
