//! Outcomes of executed documents.
//!
//! A [`TestResult`] is either the result of one document or a named suite of
//! child results. Suite counters are always recomputed from the leaves so the
//! rolled-up totals cannot drift from what was actually executed.

use crate::counters::Counters;

/// Outcome of executing one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleResult {
    pub name: String,
    pub counters: Counters,
    /// The annotated markup, or a failure description.
    pub content: String,
}

impl SingleResult {
    pub fn new(name: impl Into<String>, counters: Counters, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            counters,
            content: content.into(),
        }
    }

    pub fn is_successful(&self) -> bool {
        self.counters.is_successful()
    }
}

/// Outcome of a whole suite run, built up one child at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuiteResult {
    pub name: String,
    children: Vec<TestResult>,
}

impl SuiteResult {
    /// Starts an empty suite result.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn append(&mut self, result: impl Into<TestResult>) {
        self.children.push(result.into());
    }

    pub fn children(&self) -> &[TestResult] {
        &self.children
    }

    /// Merge of every leaf below this suite.
    pub fn counters(&self) -> Counters {
        self.leaves().map(|leaf| leaf.counters).sum()
    }

    /// Depth-first iteration over the leaf results, in execution order.
    pub fn leaves(&self) -> impl Iterator<Item = &SingleResult> + '_ {
        let mut stack: Vec<&TestResult> = self.children.iter().rev().collect();
        std::iter::from_fn(move || {
            while let Some(next) = stack.pop() {
                match next {
                    TestResult::Single(single) => return Some(single),
                    TestResult::Suite(suite) => stack.extend(suite.children.iter().rev()),
                }
            }
            None
        })
    }

    /// Names of the leaves that passed.
    pub fn passed(&self) -> Vec<&str> {
        self.leaves()
            .filter(|leaf| leaf.is_successful())
            .map(|leaf| leaf.name.as_str())
            .collect()
    }

    /// Names of the leaves with wrong or exception counts.
    pub fn failed(&self) -> Vec<&str> {
        self.leaves()
            .filter(|leaf| !leaf.is_successful())
            .map(|leaf| leaf.name.as_str())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// A leaf or aggregate result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestResult {
    Single(SingleResult),
    Suite(SuiteResult),
}

impl TestResult {
    pub fn name(&self) -> &str {
        match self {
            TestResult::Single(single) => &single.name,
            TestResult::Suite(suite) => &suite.name,
        }
    }

    pub fn counters(&self) -> Counters {
        match self {
            TestResult::Single(single) => single.counters,
            TestResult::Suite(suite) => suite.counters(),
        }
    }

    pub fn is_successful(&self) -> bool {
        self.counters().is_successful()
    }
}

impl From<SingleResult> for TestResult {
    fn from(result: SingleResult) -> Self {
        TestResult::Single(result)
    }
}

impl From<SuiteResult> for TestResult {
    fn from(result: SuiteResult) -> Self {
        TestResult::Suite(result)
    }
}
