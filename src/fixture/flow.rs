//! Flow-style fixture: one fixture drives every table of a document.

use std::collections::HashMap;

use super::Fixture;
use crate::counters::Counters;
use crate::errors::FixtureError;
use crate::table::{Cell, Row, Table};

type Action = Box<dyn FnMut(&[String]) -> Result<String, FixtureError>>;

/// A fixture whose rows are actions.
///
/// Each row is `action | args...`; an action returning `"true"` marks the
/// action cell right, `"false"` marks it wrong. `check | action | args... |
/// expected` compares the action's output with the last cell, and
/// `reject | action | args...` expects `"false"`. Rows starting with `note`
/// are skipped. The first row of the first table names the fixture itself.
pub struct DoFixture {
    actions: HashMap<String, Action>,
    started: bool,
}

impl Default for DoFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl DoFixture {
    pub fn new() -> Self {
        Self {
            actions: HashMap::new(),
            started: false,
        }
    }

    /// Registers an action under `name`.
    pub fn action<F>(mut self, name: impl Into<String>, action: F) -> Self
    where
        F: FnMut(&[String]) -> Result<String, FixtureError> + 'static,
    {
        self.actions.insert(name.into(), Box::new(action));
        self
    }

    fn call(&mut self, name: &str, args: &[String]) -> Result<String, FixtureError> {
        let action = self
            .actions
            .get_mut(name)
            .ok_or_else(|| FixtureError::new(format!("unknown action '{name}'")))?;
        action(args)
    }

    fn do_row(&mut self, row: &mut Row, counts: &mut Counters) {
        let texts = row.texts();
        let Some(keyword) = texts.first() else {
            return;
        };
        match keyword.as_str() {
            "note" => {}
            "check" if texts.len() >= 3 => {
                let last = texts.len() - 1;
                match self.call(&texts[1], &texts[2..last]) {
                    Ok(actual) => {
                        let cell = &mut row.cells[last];
                        if actual == texts[last] {
                            cell.right(counts);
                        } else {
                            cell.wrong(counts, Some(&actual));
                        }
                    }
                    Err(e) => row.cells[1].exception(counts, &e.message),
                }
            }
            "reject" if texts.len() >= 2 => {
                let outcome = self.call(&texts[1], &texts[2..]);
                mark(&mut row.cells[0], counts, outcome.map(|v| flip(&v)));
            }
            action => {
                let outcome = self.call(action, &texts[1..]);
                mark(&mut row.cells[0], counts, outcome);
            }
        }
    }
}

fn flip(value: &str) -> String {
    match value {
        "true" => "false".to_string(),
        "false" => "true".to_string(),
        other => other.to_string(),
    }
}

fn mark(cell: &mut Cell, counts: &mut Counters, outcome: Result<String, FixtureError>) {
    match outcome.as_deref() {
        Ok("true") => cell.right(counts),
        Ok("false") => cell.wrong(counts, None),
        Ok(other) => cell.info(other),
        Err(e) => cell.exception(counts, &e.message),
    }
}

impl Fixture for DoFixture {
    fn do_table(&mut self, table: &mut Table, counts: &mut Counters) -> Result<(), FixtureError> {
        let skip = usize::from(!self.started);
        self.started = true;
        for row in table.rows.iter_mut().skip(skip) {
            self.do_row(row, counts);
        }
        Ok(())
    }

    fn takes_over_flow(&self) -> bool {
        true
    }
}
