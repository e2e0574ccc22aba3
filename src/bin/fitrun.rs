use std::process::ExitCode;

fn main() -> ExitCode {
    fitrun::cli::run()
}
