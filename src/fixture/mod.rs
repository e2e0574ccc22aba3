//! Fixtures and the interpreters that drive them over a document's tables.
//!
//! A fixture is looked up by the text of a table's first cell and annotates
//! the table in place. How tables are handed to fixtures depends on the
//! interpreter family: [`FitInterpreter`] gives every table its own fixture,
//! [`FlowInterpreter`] lets the first table's fixture take over the whole
//! document.

use std::collections::HashMap;

use crate::counters::Counters;
use crate::errors::FixtureError;
use crate::table::Table;

pub mod column;
pub mod flow;
pub mod interpreter;

pub use column::ColumnFixture;
pub use flow::DoFixture;
pub use interpreter::{FitInterpreter, FlowInterpreter, Interpreter};

/// Test-support code bound to a table.
pub trait Fixture {
    /// Interprets one table, annotating its cells and tallying into
    /// `counts`. An error is reported on the table's first cell.
    fn do_table(&mut self, table: &mut Table, counts: &mut Counters) -> Result<(), FixtureError>;

    /// Flow fixtures handle every table of the document once they appear in
    /// the first table (only honoured by [`FlowInterpreter`]).
    fn takes_over_flow(&self) -> bool {
        false
    }
}

/// Observes interpretation progress.
pub trait FixtureListener {
    fn table_finished(&mut self, _table: &Table) {}

    fn tables_finished(&mut self, counts: &Counters);
}

/// Keeps the final tallies of an interpreted document.
#[derive(Debug, Default)]
pub struct CountingListener {
    counts: Counters,
    tables: usize,
}

impl CountingListener {
    pub fn counts(&self) -> Counters {
        self.counts
    }

    pub fn tables(&self) -> usize {
        self.tables
    }
}

impl FixtureListener for CountingListener {
    fn table_finished(&mut self, _table: &Table) {
        self.tables += 1;
    }

    fn tables_finished(&mut self, counts: &Counters) {
        self.counts = self.counts.merge(*counts);
    }
}

/// Ignores its table. Registered as `Comment`.
#[derive(Debug, Default)]
pub struct Comment;

impl Fixture for Comment {
    fn do_table(&mut self, _table: &mut Table, _counts: &mut Counters) -> Result<(), FixtureError> {
        Ok(())
    }
}

type Factory = Box<dyn Fn() -> Box<dyn Fixture>>;

/// Maps fixture names to constructors. A fresh fixture is built for every
/// use, so no state leaks between documents.
#[derive(Default)]
pub struct FixtureRegistry {
    factories: HashMap<String, Factory>,
}

impl FixtureRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in fixtures.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("Comment", || Comment);
        registry
    }

    pub fn register<F, X>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> X + 'static,
        X: Fixture + 'static,
    {
        self.factories
            .insert(name.into(), Box::new(move || Box::new(factory()) as Box<dyn Fixture>));
    }

    pub fn create(&self, name: &str) -> Option<Box<dyn Fixture>> {
        self.factories.get(name.trim()).map(|factory| factory())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name.trim())
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for FixtureRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixtureRegistry")
            .field("fixtures", &self.names())
            .finish()
    }
}
