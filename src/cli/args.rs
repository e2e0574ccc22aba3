//! Command-line arguments for `fitrun`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::engine::EngineKind;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "fitrun",
    version,
    about = "Runs acceptance-test pages and suites and writes browsable reports."
)]
pub struct FitrunArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one test page with its inherited suite setup and teardown.
    Test {
        /// Dotted page name, e.g. `Acceptance.Billing.InvoiceTotals`.
        name: String,
        #[command(flatten)]
        options: RunOptions,
    },
    /// Run every test below a suite page, in hierarchy order.
    Suite {
        /// Dotted suite name; an empty string or `.` is the root.
        name: String,
        #[command(flatten)]
        options: RunOptions,
    },
}

impl Command {
    pub fn options(&self) -> &RunOptions {
        match self {
            Command::Test { options, .. } | Command::Suite { options, .. } => options,
        }
    }
}

/// Options shared by every run command. Flags override the config file.
#[derive(Debug, Clone, Default, Args)]
pub struct RunOptions {
    /// Repository root containing `pages/` and `files/`.
    #[arg(short, long)]
    pub source: Option<PathBuf>,
    /// Directory receiving the report.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Interpreter family used to run the fixture tables.
    #[arg(short, long, value_enum)]
    pub engine: Option<EngineKind>,
    /// YAML file with `source`, `output` and `engine` settings.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Also write a JUnit XML report to this path.
    #[arg(long)]
    pub junit: Option<PathBuf>,
    /// Print the full failure detail under each failing test.
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn arguments_are_consistent() {
        FitrunArgs::command().debug_assert();
    }

    #[test]
    fn suite_accepts_shared_options() {
        let args = FitrunArgs::parse_from([
            "fitrun", "suite", "Acceptance", "--source", "repo", "--engine", "flow",
        ]);
        let Command::Suite { name, options } = args.command else {
            panic!("expected suite command");
        };
        assert_eq!(name, "Acceptance");
        assert_eq!(options.source, Some(PathBuf::from("repo")));
        assert_eq!(options.engine, Some(EngineKind::Flow));
        assert_eq!(options.output, None);
    }
}
