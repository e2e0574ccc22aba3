//! Progress notifications for test runs.
//!
//! A runner tells its [`Notifier`] when each document starts and how it
//! ended. Every started item gets exactly one terminal call: `finish` when it
//! passed, `fail` with a detail text otherwise.

use std::io::Write;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::counters::Counters;

/// Receives per-item progress from a run.
pub trait Notifier {
    fn start(&mut self, name: &str);
    fn finish(&mut self, name: &str);
    fn fail(&mut self, name: &str, detail: &str);
}

/// Discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn start(&mut self, _name: &str) {}
    fn finish(&mut self, _name: &str) {}
    fn fail(&mut self, _name: &str, _detail: &str) {}
}

/// Forwards every notification to several notifiers, in order.
#[derive(Default)]
pub struct Fanout<'a> {
    targets: Vec<&'a mut dyn Notifier>,
}

impl<'a> Fanout<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, target: &'a mut dyn Notifier) -> Self {
        self.targets.push(target);
        self
    }
}

impl Notifier for Fanout<'_> {
    fn start(&mut self, name: &str) {
        self.targets.iter_mut().for_each(|t| t.start(name));
    }

    fn finish(&mut self, name: &str) {
        self.targets.iter_mut().for_each(|t| t.finish(name));
    }

    fn fail(&mut self, name: &str, detail: &str) {
        self.targets.iter_mut().for_each(|t| t.fail(name, detail));
    }
}

// =============================================================================
// CONSOLE OUTPUT
// =============================================================================

/// Prints one colored PASS/FAIL line per item and a closing summary.
pub struct ConsoleNotifier {
    out: StandardStream,
    verbose: bool,
    passed: usize,
    failed: Vec<String>,
}

impl ConsoleNotifier {
    /// Colors are used only when stdout is a terminal.
    pub fn new() -> Self {
        let choice = if atty::is(atty::Stream::Stdout) {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        Self::with_color_choice(choice)
    }

    pub fn with_color_choice(choice: ColorChoice) -> Self {
        Self {
            out: StandardStream::stdout(choice),
            verbose: false,
            passed: 0,
            failed: Vec::new(),
        }
    }

    /// Also print the failure detail under each FAIL line.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn failed(&self) -> &[String] {
        &self.failed
    }

    fn label(&mut self, label: &str, color: Color) {
        let _ = self
            .out
            .set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
        let _ = write!(self.out, "{label}");
        let _ = self.out.reset();
    }

    /// Prints the run summary with the merged counters.
    pub fn print_summary(&mut self, counters: &Counters) {
        let _ = writeln!(
            self.out,
            "\nSummary: {} passed, {} failed ({counters})",
            self.passed,
            self.failed.len()
        );
        if !self.failed.is_empty() {
            let _ = writeln!(self.out, "\nFailed tests:");
            for name in &self.failed {
                let _ = writeln!(self.out, "  - {name}");
            }
        }
    }
}

impl Default for ConsoleNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for ConsoleNotifier {
    fn start(&mut self, _name: &str) {}

    fn finish(&mut self, name: &str) {
        self.passed += 1;
        self.label("PASS", Color::Green);
        let _ = writeln!(self.out, ": {name}");
    }

    fn fail(&mut self, name: &str, detail: &str) {
        self.failed.push(name.to_string());
        self.label("FAIL", Color::Red);
        let _ = writeln!(self.out, ": {name}");
        if self.verbose {
            for line in detail.lines() {
                let _ = writeln!(self.out, "    {line}");
            }
        } else if let Some(first) = detail.lines().next() {
            let _ = writeln!(self.out, "    {first}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Log(Vec<String>);

    impl Notifier for Log {
        fn start(&mut self, name: &str) {
            self.0.push(format!("start {name}"));
        }
        fn finish(&mut self, name: &str) {
            self.0.push(format!("finish {name}"));
        }
        fn fail(&mut self, name: &str, _detail: &str) {
            self.0.push(format!("fail {name}"));
        }
    }

    #[test]
    fn fanout_reaches_every_target_in_order() {
        let mut first = Log::default();
        let mut second = Log::default();
        {
            let mut fanout = Fanout::new().with(&mut first).with(&mut second);
            fanout.start("A");
            fanout.fail("A", "wrong: 1 exceptions: 0\n");
        }
        assert_eq!(first.0, vec!["start A", "fail A"]);
        assert_eq!(second.0, first.0);
    }

    #[test]
    fn console_tracks_failures() {
        let mut console = ConsoleNotifier::with_color_choice(ColorChoice::Never);
        console.finish("Suite.Good");
        console.fail("Suite.Bad", "wrong: 1 exceptions: 0\n<table>");
        assert_eq!(console.failed(), ["Suite.Bad".to_string()]);
        assert_eq!(console.passed, 1);
    }
}
