//! Result sinks: durable, browsable storage for results and report assets.
//!
//! [`FolderResultSink`] writes one page per executed document, an index page
//! and a JSON summary per suite, plus the static assets those pages link to.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::counters::Counters;
use crate::errors::SinkError;
use crate::repository::render::{escape_html, render_page};
use crate::results::{SingleResult, SuiteResult, TestResult};

/// Aggregate page of a suite run.
pub const INDEX_FILE: &str = "index.html";
const INDEX_STEM: &str = "index";
/// Machine-readable summary of a suite run.
pub const SUMMARY_FILE: &str = "summary.json";

/// Persists results and assets.
pub trait ResultSink {
    /// Copies `bytes` to `relative_name`, replacing any earlier copy.
    fn add_asset(&self, bytes: &[u8], relative_name: &str) -> Result<(), SinkError>;

    /// Writes the artifact for a leaf or aggregate result.
    fn record_result(&self, result: &TestResult) -> Result<(), SinkError>;
}

/// Flattens a hierarchical name into a file stem. ASCII letters, digits,
/// `.` and `-` are kept; every other byte, `_` included, becomes `_XX` (upper
/// hex). The stem of the suite index gets a `_` prefix, which escaping never
/// produces, so distinct names always get distinct files.
pub fn flatten_name(name: &str) -> String {
    let mut flat = String::with_capacity(name.len());
    for byte in name.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'-') {
            flat.push(char::from(byte));
        } else {
            let _ = write!(flat, "_{byte:02X}");
        }
    }
    if flat.is_empty() {
        "_".to_string()
    } else if flat.eq_ignore_ascii_case(INDEX_STEM) {
        format!("_{flat}")
    } else {
        flat
    }
}

/// File name of the page written for a leaf result.
pub fn result_file_name(name: &str) -> String {
    format!("{}.html", flatten_name(name))
}

/// Writes results into a directory, created on first write.
#[derive(Debug, Clone)]
pub struct FolderResultSink {
    root: PathBuf,
}

impl FolderResultSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Replaces the whole file in one write.
    fn write(&self, relative_name: &str, bytes: &[u8]) -> Result<(), SinkError> {
        let path = self.root.join(relative_name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| SinkError::io(parent, e))?;
        }
        fs::write(&path, bytes).map_err(|e| SinkError::io(&path, e))?;
        debug!(path = %path.display(), bytes = bytes.len(), "wrote report file");
        Ok(())
    }

    fn record_single(&self, result: &SingleResult) -> Result<(), SinkError> {
        let page = if result.content.to_ascii_lowercase().contains("<html") {
            result.content.clone()
        } else {
            let body = format!(
                "{}\n<pre>{}</pre>",
                banner(&result.counters),
                escape_html(&result.content)
            );
            render_page(&result.name, &body)
        };
        self.write(&result_file_name(&result.name), page.as_bytes())
    }

    fn record_suite(&self, suite: &SuiteResult) -> Result<(), SinkError> {
        self.write(INDEX_FILE, suite_index(suite).as_bytes())?;
        let summary = RunSummary::from(suite);
        let path = self.root.join(SUMMARY_FILE);
        let json = serde_json::to_vec_pretty(&summary)
            .map_err(|source| SinkError::Serialize { path, source })?;
        self.write(SUMMARY_FILE, &json)
    }
}

impl ResultSink for FolderResultSink {
    fn add_asset(&self, bytes: &[u8], relative_name: &str) -> Result<(), SinkError> {
        self.write(relative_name, bytes)
    }

    fn record_result(&self, result: &TestResult) -> Result<(), SinkError> {
        match result {
            TestResult::Single(single) => self.record_single(single),
            TestResult::Suite(suite) => self.record_suite(suite),
        }
    }
}

fn status_class(counters: &Counters) -> &'static str {
    if counters.is_successful() {
        "pass"
    } else {
        "fail"
    }
}

fn banner(counters: &Counters) -> String {
    format!(
        "<div class=\"{}\">{}</div>",
        status_class(counters),
        escape_html(&counters.to_string())
    )
}

fn suite_index(suite: &SuiteResult) -> String {
    let totals = suite.counters();
    let mut body = String::new();
    let _ = writeln!(
        body,
        "{}\n<table class=\"suite\">\n<tr><td>Test</td><td>Right</td><td>Wrong</td><td>Ignored</td><td>Exceptions</td></tr>",
        banner(&totals)
    );
    for leaf in suite.leaves() {
        let c = leaf.counters;
        let _ = writeln!(
            body,
            "<tr class=\"{}\"><td><a href=\"{}\">{}</a></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            status_class(&c),
            escape_html(&result_file_name(&leaf.name)),
            escape_html(&leaf.name),
            c.right,
            c.wrong,
            c.ignored,
            c.exceptions
        );
    }
    body.push_str("</table>");
    render_page(&suite.name, &body)
}

/// JSON form of a finished suite run.
#[derive(Debug, Serialize)]
pub struct RunSummary<'a> {
    pub suite: &'a str,
    pub successful: bool,
    pub totals: Counters,
    pub tests: Vec<TestSummary<'a>>,
}

#[derive(Debug, Serialize)]
pub struct TestSummary<'a> {
    pub name: &'a str,
    pub file: String,
    pub successful: bool,
    pub counters: Counters,
}

impl<'a> From<&'a SuiteResult> for RunSummary<'a> {
    fn from(suite: &'a SuiteResult) -> Self {
        let totals = suite.counters();
        Self {
            suite: &suite.name,
            successful: totals.is_successful(),
            totals,
            tests: suite
                .leaves()
                .map(|leaf| TestSummary {
                    name: &leaf.name,
                    file: result_file_name(&leaf.name),
                    successful: leaf.is_successful(),
                    counters: leaf.counters,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattening_keeps_dotted_names_and_avoids_the_index() {
        assert_eq!(flatten_name("SuiteA.SubSuite.CaseB"), "SuiteA.SubSuite.CaseB");
        assert_eq!(flatten_name("Odd/Name With Space"), "Odd_2FName_20With_20Space");
        assert_eq!(flatten_name("index"), "_index");
        assert_eq!(flatten_name("Index"), "_Index");
        assert_eq!(flatten_name("index_"), "index_5F");
        assert_eq!(flatten_name("Caf\u{e9}"), "Caf_C3_A9");
        assert_eq!(result_file_name("A.B"), "A.B.html");
    }

    #[test]
    fn flattening_never_merges_distinct_names() {
        let names = [
            "S.Foo Bar", "S.Foo_Bar", "S.Foo_20Bar", "S.Foo/Bar", "index", "index_",
            "_index", "Index", "", "_",
        ];
        let stems: std::collections::HashSet<_> = names.iter().map(|n| flatten_name(n)).collect();
        assert_eq!(stems.len(), names.len());
    }

    #[test]
    fn colliding_looking_siblings_get_their_own_pages() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FolderResultSink::new(dir.path());
        let mut suite = SuiteResult::new("S");
        suite.append(SingleResult::new("S.Foo Bar", Counters::new(1, 0, 0, 0), "<html>space</html>"));
        suite.append(SingleResult::new("S.Foo_Bar", Counters::new(0, 1, 0, 0), "<html>underscore</html>"));
        for leaf in suite.leaves() {
            sink.record_result(&TestResult::Single(leaf.clone())).unwrap();
        }
        sink.record_result(&TestResult::Suite(suite)).unwrap();

        let space = fs::read_to_string(dir.path().join("S.Foo_20Bar.html")).unwrap();
        let underscore = fs::read_to_string(dir.path().join("S.Foo_5FBar.html")).unwrap();
        assert_eq!(space, "<html>space</html>");
        assert_eq!(underscore, "<html>underscore</html>");
        let index = fs::read_to_string(dir.path().join(INDEX_FILE)).unwrap();
        assert!(index.contains("S.Foo_20Bar.html") && index.contains("S.Foo_5FBar.html"));
    }

    #[test]
    fn summary_lists_leaves_in_order() {
        let mut suite = SuiteResult::new("S");
        suite.append(SingleResult::new("S.A", Counters::new(2, 0, 0, 0), ""));
        suite.append(SingleResult::new("S.B", Counters::new(0, 1, 0, 0), ""));
        let summary = RunSummary::from(&suite);
        assert!(!summary.successful);
        assert_eq!(summary.totals, Counters::new(2, 1, 0, 0));
        let names: Vec<_> = summary.tests.iter().map(|t| t.name).collect();
        assert_eq!(names, ["S.A", "S.B"]);
    }
}
