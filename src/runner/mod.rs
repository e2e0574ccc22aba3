//! The orchestrator: resolve, execute, record, aggregate.
//!
//! A run is strictly sequential. Each document is executed, its result
//! recorded and appended to the suite before the next document starts, so
//! setup pages have done their work before the bodies they prepare and
//! teardown pages run last.

use tracing::{info, warn};

use crate::config::RunConfig;
use crate::counters::Counters;
use crate::document::Document;
use crate::engine::{ExecutionEngine, FixtureEngine};
use crate::errors::{RunError, SinkError};
use crate::fixture::FixtureRegistry;
use crate::repository::{DocumentRepository, TreeRepository};
use crate::results::{SingleResult, SuiteResult, TestResult};
use crate::sink::{FolderResultSink, ResultSink};

pub mod junit;
pub mod notifier;

pub use junit::JunitReport;
pub use notifier::{ConsoleNotifier, Notifier, NullNotifier};

/// Drives runs against one repository, engine and sink.
pub struct Runner {
    repository: Box<dyn DocumentRepository>,
    engine: Box<dyn ExecutionEngine>,
    sink: Box<dyn ResultSink>,
}

impl Runner {
    /// Builds a runner and seeds the sink with the repository's report
    /// assets. A seeding failure is fatal: nothing can be reported without
    /// them.
    pub fn new(
        repository: impl DocumentRepository + 'static,
        engine: impl ExecutionEngine + 'static,
        sink: impl ResultSink + 'static,
    ) -> Result<Self, RunError> {
        repository.seed_assets(&sink).map_err(RunError::Seed)?;
        Ok(Self {
            repository: Box::new(repository),
            engine: Box::new(engine),
            sink: Box::new(sink),
        })
    }

    /// A runner over a repository directory, writing into a folder.
    pub fn from_config(config: &RunConfig, registry: FixtureRegistry) -> Result<Self, RunError> {
        let repository = TreeRepository::open(&config.source)?;
        let engine = FixtureEngine::from_kind(config.engine, registry);
        let sink = FolderResultSink::new(&config.output);
        Self::new(repository, engine, sink)
    }

    /// Runs a single test, with inherited suite setup and teardown spliced
    /// in. Returns its counters.
    pub fn run_test(&self, name: &str, notifier: &mut dyn Notifier) -> Result<Counters, RunError> {
        let document = self.repository.resolve_one(name)?;
        info!(test = document.name(), "running test");
        let counters = self.execute(&document, notifier).counters();
        info!(test = document.name(), counters = %counters, "test finished");
        Ok(counters)
    }

    /// Runs every document of a suite and returns the merged counters.
    pub fn run_suite(&self, name: &str, notifier: &mut dyn Notifier) -> Result<Counters, RunError> {
        Ok(self.run_suite_result(name, notifier)?.counters())
    }

    /// Runs a suite and hands back the finished aggregate result.
    pub fn run_suite_result(
        &self,
        name: &str,
        notifier: &mut dyn Notifier,
    ) -> Result<SuiteResult, RunError> {
        let documents = self.repository.resolve_suite(name)?;
        info!(suite = name, documents = documents.len(), "running suite");

        let mut suite = SuiteResult::new(name);
        for document in &documents {
            let result = self.execute(document, notifier);
            suite.append(result);
        }

        let totals = suite.counters();
        let aggregate = TestResult::Suite(suite);
        if let Err(e) = self.sink.record_result(&aggregate) {
            warn!(suite = name, error = %e, "cannot record suite result");
            notifier.fail(name, &persistence_failure(&e));
        }
        info!(suite = name, counters = %totals, "suite finished");
        match aggregate {
            TestResult::Suite(suite) => Ok(suite),
            TestResult::Single(_) => unreachable!("aggregate was built as a suite"),
        }
    }

    /// Executes and records one document, then tells the notifier how it
    /// went. Recording failures are attributed to this document only.
    fn execute(&self, document: &Document, notifier: &mut dyn Notifier) -> TestResult {
        notifier.start(document.name());
        let result = self.engine.run(document);
        let name = result.name.clone();
        let failure = (!result.is_successful()).then(|| failure_detail(&result));
        let result = TestResult::Single(result);

        match (self.sink.record_result(&result), failure) {
            (Err(e), failure) => {
                warn!(test = %name, error = %e, "cannot record test result");
                let mut detail = persistence_failure(&e);
                if let Some(failure) = failure {
                    detail.push('\n');
                    detail.push_str(&failure);
                }
                notifier.fail(&name, &detail);
            }
            (Ok(()), None) => notifier.finish(&name),
            (Ok(()), Some(failure)) => notifier.fail(&name, &failure),
        }
        result
    }
}

/// Diagnostic text handed to notifiers for a failing result.
pub fn failure_detail(result: &SingleResult) -> String {
    format!(
        "wrong: {} exceptions: {}\n{}",
        result.counters.wrong, result.counters.exceptions, result.content
    )
}

fn persistence_failure(error: &SinkError) -> String {
    let mut message = format!("result not recorded: {error}");
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(&format!(": {cause}"));
        source = cause.source();
    }
    message
}
