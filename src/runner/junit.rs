//! JUnit XML reports for CI servers.
//!
//! [`JunitReport`] is a [`Notifier`] that remembers every finished item with
//! its duration and writes them out as one `<testsuite>` document.

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::errors::SinkError;
use crate::repository::render::escape_html;
use crate::runner::notifier::Notifier;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Case {
    name: String,
    elapsed: Duration,
    failure: Option<String>,
}

/// Collects notifications into a JUnit test suite.
#[derive(Debug)]
pub struct JunitReport {
    suite: String,
    started: Option<(String, Instant)>,
    cases: Vec<Case>,
}

impl JunitReport {
    pub fn new(suite: impl Into<String>) -> Self {
        Self {
            suite: suite.into(),
            started: None,
            cases: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn failures(&self) -> usize {
        self.cases.iter().filter(|c| c.failure.is_some()).count()
    }

    fn close(&mut self, name: &str, failure: Option<String>) {
        let elapsed = match self.started.take() {
            Some((started, at)) if started == name => at.elapsed(),
            other => {
                self.started = other;
                Duration::ZERO
            }
        };
        self.cases.push(Case {
            name: name.to_string(),
            elapsed,
            failure,
        });
    }

    /// Renders the collected cases as a JUnit XML document.
    pub fn to_xml(&self) -> String {
        let total: Duration = self.cases.iter().map(|c| c.elapsed).sum();
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str(&format!(
            "<testsuite name=\"{}\" tests=\"{}\" failures=\"{}\" errors=\"0\" time=\"{:.3}\">\n",
            escape(&self.suite),
            self.cases.len(),
            self.failures(),
            total.as_secs_f64()
        ));
        for case in &self.cases {
            let (classname, name) = split_name(&case.name);
            xml.push_str(&format!(
                "  <testcase classname=\"{}\" name=\"{}\" time=\"{:.3}\"",
                escape(classname),
                escape(name),
                case.elapsed.as_secs_f64()
            ));
            match &case.failure {
                None => xml.push_str("/>\n"),
                Some(detail) => {
                    let message = detail.lines().next().unwrap_or_default();
                    xml.push_str(">\n");
                    xml.push_str(&format!(
                        "    <failure message=\"{}\">{}</failure>\n",
                        escape(message),
                        escape(detail)
                    ));
                    xml.push_str("  </testcase>\n");
                }
            }
        }
        xml.push_str("</testsuite>\n");
        xml
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), SinkError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| SinkError::io(parent, e))?;
        }
        fs::write(path, self.to_xml()).map_err(|e| SinkError::io(path, e))
    }
}

impl Notifier for JunitReport {
    fn start(&mut self, name: &str) {
        self.started = Some((name.to_string(), Instant::now()));
    }

    fn finish(&mut self, name: &str) {
        self.close(name, None);
    }

    fn fail(&mut self, name: &str, detail: &str) {
        self.close(name, Some(detail.to_string()));
    }
}

/// `Suite.Sub.Test` becomes class `Suite.Sub`, name `Test`.
fn split_name(full: &str) -> (&str, &str) {
    full.rsplit_once('.').unwrap_or(("", full))
}

/// Markup escaping plus `'`, with control characters XML cannot carry
/// dropped.
fn escape(text: &str) -> String {
    let printable: String = text
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
        .collect();
    escape_html(&printable).replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_carry_escaped_detail() {
        let mut report = JunitReport::new("Acceptance");
        report.start("Acceptance.Login");
        report.finish("Acceptance.Login");
        report.start("Acceptance.Billing.Invoice");
        report.fail("Acceptance.Billing.Invoice", "wrong: 1 exceptions: 0\n<td>x</td>");

        let xml = report.to_xml();
        assert!(xml.contains("tests=\"2\" failures=\"1\""));
        assert!(xml.contains("classname=\"Acceptance\" name=\"Login\""));
        assert!(xml.contains("classname=\"Acceptance.Billing\" name=\"Invoice\""));
        assert!(xml.contains("message=\"wrong: 1 exceptions: 0\""));
        assert!(xml.contains("&lt;td&gt;x&lt;/td&gt;"));
    }

    #[test]
    fn attribute_text_is_fully_escaped() {
        assert_eq!(escape("a \"b\" & 'c'\u{7}"), "a &quot;b&quot; &amp; &apos;c&apos;");
        assert_eq!(escape("line\nnext"), "line\nnext");
    }

    #[test]
    fn suite_level_failure_without_start_is_still_reported() {
        let mut report = JunitReport::new("Root");
        report.fail("Root", "result not recorded");
        assert_eq!(report.len(), 1);
        assert!(report.to_xml().contains("classname=\"\" name=\"Root\""));
    }

    #[test]
    fn writes_into_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports/junit.xml");
        JunitReport::new("Empty").write_to(&path).unwrap();
        let xml = fs::read_to_string(path).unwrap();
        assert!(xml.contains("tests=\"0\""));
    }
}
