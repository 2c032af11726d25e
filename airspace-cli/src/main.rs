//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use std::process::ExitCode;

use airspace_cli::CliError;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    match airspace_cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => report(&err),
    }
}

#[expect(clippy::print_stderr, reason = "the CLI reports failures on stderr")]
fn report(err: &CliError) -> ExitCode {
    eprintln!("airspace: {err}");
    ExitCode::FAILURE
}
