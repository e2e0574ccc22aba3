//! The two interpreter families.

use tracing::debug;

use super::{Fixture, FixtureListener, FixtureRegistry};
use crate::counters::Counters;
use crate::table::{Table, Tables};

/// Runs a document's tables against fixtures.
pub trait Interpreter {
    /// Interprets every table, annotating in place. Fixture failures are
    /// recorded as exceptions in the tables; they do not stop interpretation.
    fn interpret(&self, tables: &mut Tables, listener: &mut dyn FixtureListener);
}

fn report(table: &mut Table, counts: &mut Counters, message: &str) {
    if let Some(head) = table.head_mut() {
        head.exception(counts, message);
    } else {
        counts.exceptions += 1;
    }
}

fn run_table(fixture: &mut dyn Fixture, table: &mut Table, counts: &mut Counters) {
    if let Err(e) = fixture.do_table(table, counts) {
        report(table, counts, &e.message);
    }
}

fn run_own_fixture(registry: &FixtureRegistry, table: &mut Table, counts: &mut Counters) {
    let name = table.fixture_name();
    match registry.create(&name) {
        Some(mut fixture) => run_table(fixture.as_mut(), table, counts),
        None => {
            debug!(fixture = %name, "fixture not found");
            report(table, counts, &format!("Could not find fixture: {name}"));
        }
    }
}

/// Every table names and gets its own fixture.
#[derive(Debug, Default)]
pub struct FitInterpreter {
    registry: FixtureRegistry,
}

impl FitInterpreter {
    pub fn new(registry: FixtureRegistry) -> Self {
        Self { registry }
    }
}

impl Interpreter for FitInterpreter {
    fn interpret(&self, tables: &mut Tables, listener: &mut dyn FixtureListener) {
        let mut counts = Counters::default();
        for table in &mut tables.tables {
            run_own_fixture(&self.registry, table, &mut counts);
            listener.table_finished(table);
        }
        listener.tables_finished(&counts);
    }
}

/// The first table's fixture may take over the rest of the document;
/// otherwise tables are interpreted one by one as in [`FitInterpreter`].
#[derive(Debug, Default)]
pub struct FlowInterpreter {
    registry: FixtureRegistry,
}

impl FlowInterpreter {
    pub fn new(registry: FixtureRegistry) -> Self {
        Self { registry }
    }
}

impl Interpreter for FlowInterpreter {
    fn interpret(&self, tables: &mut Tables, listener: &mut dyn FixtureListener) {
        let mut counts = Counters::default();
        let mut remaining = tables.tables.iter_mut();

        if let Some(first) = remaining.next() {
            let name = first.fixture_name();
            match self.registry.create(&name) {
                Some(mut fixture) if fixture.takes_over_flow() => {
                    debug!(fixture = %name, "flow fixture takes over document");
                    run_table(fixture.as_mut(), first, &mut counts);
                    listener.table_finished(first);
                    for table in remaining {
                        run_table(fixture.as_mut(), table, &mut counts);
                        listener.table_finished(table);
                    }
                    listener.tables_finished(&counts);
                    return;
                }
                Some(mut fixture) => run_table(fixture.as_mut(), first, &mut counts),
                None => report(first, &mut counts, &format!("Could not find fixture: {name}")),
            }
            listener.table_finished(first);
        }

        for table in remaining {
            run_own_fixture(&self.registry, table, &mut counts);
            listener.table_finished(table);
        }
        listener.tables_finished(&counts);
    }
}
