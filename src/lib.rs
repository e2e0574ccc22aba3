//! fitrun resolves acceptance-test documents from a hierarchical page
//! repository, executes their fixture tables and writes the annotated
//! results, a suite index and the report assets into an output folder.
//!
//! The pieces are connected through three seams:
//!
//! - [`DocumentRepository`] turns names into executable documents,
//! - [`ExecutionEngine`] turns a document into a [`SingleResult`],
//! - [`ResultSink`] persists results and report assets.
//!
//! [`Runner`] drives them in order and reports progress to a [`Notifier`].

pub mod cli;
pub mod config;
pub mod counters;
pub mod document;
pub mod engine;
pub mod errors;
pub mod fixture;
pub mod repository;
pub mod results;
pub mod runner;
pub mod sink;
pub mod table;

pub use config::RunConfig;
pub use counters::Counters;
pub use document::Document;
pub use engine::{EngineKind, ExecutionEngine, FixtureEngine};
pub use errors::{ConfigError, FixtureError, RepositoryError, RunError, SinkError, TableError};
pub use repository::{DocumentRepository, PageTree, TreeRepository};
pub use results::{SingleResult, SuiteResult, TestResult};
pub use runner::{ConsoleNotifier, JunitReport, Notifier, NullNotifier, Runner};
pub use sink::{FolderResultSink, ResultSink};
