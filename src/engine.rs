//! Execution engines: one document in, one leaf result out.
//!
//! An engine never fails past its boundary. Markup that cannot be split into
//! tables, or fixture code that panics, turns into a result carrying a single
//! exception and the failure's description, so one misbehaving document
//! cannot stop a suite.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::counters::Counters;
use crate::document::Document;
use crate::errors::TableError;
use crate::fixture::{
    CountingListener, FitInterpreter, FixtureRegistry, FlowInterpreter, Interpreter,
};
use crate::results::SingleResult;
use crate::table::{self, Tables};

/// Content of the result for a document without any table.
pub const NO_TABLES: &str = "contains no tables";

/// Executes one document and reports its outcome.
pub trait ExecutionEngine {
    fn run(&self, document: &Document) -> SingleResult;
}

/// Which interpreter family an engine drives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Every table names its own fixture.
    #[default]
    Fit,
    /// The first table's fixture may drive the whole document.
    Flow,
}

/// An engine parsing fixture tables and handing them to an interpreter.
pub struct FixtureEngine {
    interpreter: Box<dyn Interpreter>,
}

impl FixtureEngine {
    pub fn new(interpreter: impl Interpreter + 'static) -> Self {
        Self {
            interpreter: Box::new(interpreter),
        }
    }

    pub fn fit(registry: FixtureRegistry) -> Self {
        Self::new(FitInterpreter::new(registry))
    }

    pub fn flow(registry: FixtureRegistry) -> Self {
        Self::new(FlowInterpreter::new(registry))
    }

    pub fn from_kind(kind: EngineKind, registry: FixtureRegistry) -> Self {
        match kind {
            EngineKind::Fit => Self::fit(registry),
            EngineKind::Flow => Self::flow(registry),
        }
    }

    fn execute(&self, document: &Document) -> Result<SingleResult, TableError> {
        let mut tables = Tables::parse(document.content())?;
        let mut listener = CountingListener::default();
        self.interpreter.interpret(&mut tables, &mut listener);
        debug!(
            document = document.name(),
            tables = listener.tables(),
            counters = %listener.counts(),
            "interpreted document"
        );
        Ok(SingleResult::new(
            document.name(),
            listener.counts(),
            tables.to_string(),
        ))
    }
}

impl ExecutionEngine for FixtureEngine {
    fn run(&self, document: &Document) -> SingleResult {
        if !table::contains_table(document.content()) {
            let content = format!("{} {NO_TABLES}", document.name());
            return SingleResult::new(document.name(), Counters::default(), content);
        }
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.execute(document)));
        let failure = match outcome {
            Ok(Ok(result)) => return result,
            Ok(Err(e)) => format!("cannot parse tables of {}: {e}", document.name()),
            Err(payload) => format!(
                "fixture panicked while running {}: {}",
                document.name(),
                panic_message(payload.as_ref())
            ),
        };
        warn!(document = document.name(), "{failure}");
        SingleResult::new(document.name(), Counters::exception(), failure)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
