//! The `fitrun` command-line interface.
//!
//! Resolves the run configuration, drives a [`Runner`] and maps the outcome
//! to an exit code: 0 when everything passed, 1 when any test failed and 2
//! when the run could not be carried out at all.

use std::process::ExitCode;

use clap::Parser;
use miette::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::args::{Command, FitrunArgs, RunOptions};
use crate::config::{PartialConfig, RunConfig};
use crate::counters::Counters;
use crate::fixture::FixtureRegistry;
use crate::runner::notifier::Fanout;
use crate::runner::{ConsoleNotifier, JunitReport, Runner};

pub mod args;
pub mod output;

const EXIT_FAILURES: u8 = 1;
const EXIT_FATAL: u8 = 2;

/// The main entry point for the CLI.
pub fn run() -> ExitCode {
    init_tracing();
    let args = FitrunArgs::parse();
    match execute(&args.command, FixtureRegistry::with_builtins()) {
        Ok(counters) if counters.is_successful() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(EXIT_FAILURES),
        Err(report) => {
            output::print_fatal(&report);
            ExitCode::from(EXIT_FATAL)
        }
    }
}

/// Runs one command with the given fixtures and returns the merged counters.
pub fn execute(command: &Command, registry: FixtureRegistry) -> Result<Counters> {
    let options = command.options();
    let config = resolve_config(options)?;
    let runner = Runner::from_config(&config, registry)?;

    let mut console = ConsoleNotifier::new().verbose(options.verbose);
    let (label, name) = match command {
        Command::Test { name, .. } => ("test", name.as_str()),
        Command::Suite { name, .. } => ("suite", name.as_str()),
    };
    let mut junit = JunitReport::new(if name.is_empty() { "." } else { name });
    output::print_banner(label, name, &config);

    let counters = {
        let mut notifier = Fanout::new().with(&mut console);
        if options.junit.is_some() {
            notifier = notifier.with(&mut junit);
        }
        match command {
            Command::Test { name, .. } => runner.run_test(name, &mut notifier)?,
            Command::Suite { name, .. } => runner.run_suite(name, &mut notifier)?,
        }
    };

    console.print_summary(&counters);
    if let Some(path) = &options.junit {
        junit.write_to(path)?;
    }
    Ok(counters)
}

/// Layers the optional config file under the command-line flags.
pub fn resolve_config(options: &RunOptions) -> Result<RunConfig> {
    let file = match &options.config {
        Some(path) => PartialConfig::load(path)?,
        None => PartialConfig::default(),
    };
    let flags = PartialConfig {
        source: options.source.clone(),
        output: options.output.clone(),
        engine: options.engine,
    };
    Ok(file.merge(flags).finish()?)
}

/// Logging is opt-in through `RUST_LOG`.
fn init_tracing() {
    if std::env::var_os("RUST_LOG").is_none() {
        return;
    }
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .with(EnvFilter::from_default_env())
        .try_init();
}
