//! User-facing terminal output that is not tied to a single test.

use std::io::Write;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::config::RunConfig;

fn color_choice(stream: atty::Stream) -> ColorChoice {
    if atty::is(stream) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

/// Announces what is about to run and where the report goes.
pub fn print_banner(kind: &str, name: &str, config: &RunConfig) {
    let mut stdout = StandardStream::stdout(color_choice(atty::Stream::Stdout));
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true));
    let _ = write!(stdout, "Running {kind}");
    let _ = stdout.reset();
    let shown = if name.is_empty() { "." } else { name };
    let _ = writeln!(
        stdout,
        " {shown} from {} into {}",
        config.source.display(),
        config.output.display()
    );
}

/// Prints an error that stopped the run, with its diagnostic code and causes.
pub fn print_fatal(report: &miette::Report) {
    let mut stderr = StandardStream::stderr(color_choice(atty::Stream::Stderr));
    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
    let _ = write!(stderr, "error");
    let _ = stderr.reset();
    let _ = writeln!(stderr, ": run aborted");
    let _ = writeln!(stderr, "{report:?}");
}
