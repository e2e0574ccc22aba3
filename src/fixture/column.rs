//! Row-per-case fixtures: inputs on the left, checked outputs on the right.

use std::collections::BTreeMap;

use super::Fixture;
use crate::counters::Counters;
use crate::errors::FixtureError;
use crate::table::Table;

pub type Values = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Column {
    Input(String),
    Output(String),
}

impl Column {
    /// Headers ending in `?` or `()` are outputs.
    fn parse(header: &str) -> Self {
        let header = header.trim();
        match header
            .strip_suffix('?')
            .or_else(|| header.strip_suffix("()"))
        {
            Some(name) => Column::Output(name.trim().to_string()),
            None => Column::Input(header.to_string()),
        }
    }
}

/// A fixture computing outputs from each row's inputs.
///
/// ```text
/// | Division                        |
/// | numerator | denominator | quotient? |
/// | 10        | 2           | 5         |
/// ```
pub struct ColumnFixture<F> {
    compute: F,
}

impl<F> ColumnFixture<F>
where
    F: FnMut(&Values) -> Result<Values, FixtureError>,
{
    pub fn new(compute: F) -> Self {
        Self { compute }
    }
}

impl<F> Fixture for ColumnFixture<F>
where
    F: FnMut(&Values) -> Result<Values, FixtureError>,
{
    fn do_table(&mut self, table: &mut Table, counts: &mut Counters) -> Result<(), FixtureError> {
        let header = table
            .rows
            .get(1)
            .ok_or_else(|| FixtureError::new("column fixture tables need a header row"))?;
        let columns: Vec<Column> = header.texts().iter().map(|h| Column::parse(h)).collect();

        for row in table.rows.iter_mut().skip(2) {
            let inputs: Values = columns
                .iter()
                .zip(row.cells.iter())
                .filter_map(|(column, cell)| match column {
                    Column::Input(name) => Some((name.clone(), cell.text())),
                    Column::Output(_) => None,
                })
                .collect();

            let outputs = match (self.compute)(&inputs) {
                Ok(outputs) => outputs,
                Err(e) => {
                    if let Some(first) = row.cells.first_mut() {
                        first.exception(counts, &e.message);
                    }
                    continue;
                }
            };

            for (column, cell) in columns.iter().zip(row.cells.iter_mut()) {
                let Column::Output(name) = column else {
                    continue;
                };
                let expected = cell.text();
                match outputs.get(name) {
                    None => cell.exception(counts, &format!("no output named '{name}'")),
                    Some(actual) if expected.is_empty() => cell.info(actual),
                    Some(actual) if *actual == expected => cell.right(counts),
                    Some(actual) => cell.wrong(counts, Some(actual.as_str())),
                }
            }
        }
        Ok(())
    }
}
