//! Command-line interface for building airspace constraint models.
//!
//! `airspace build` turns a JSON problem file into a model summary or LP text;
//! `airspace solve` runs the bundled exhaustive solver over small models.
#![forbid(unsafe_code)]

use camino::Utf8Path;
use clap::{Parser, Subcommand};

mod build;
mod error;
mod fs;
mod problem;
mod solve;

pub use error::CliError;

use build::BuildArgs;
use solve::SolveArgs;

const ARG_PROBLEM: &str = "problem";
const ARG_FORMAT: &str = "format";
const ARG_OUTPUT: &str = "output";
const ARG_HORIZON: &str = "horizon";
const ARG_DESTINATION_REWARD: &str = "destination-reward";
const ARG_HORIZONTAL_THRESHOLD: &str = "horizontal-threshold-m";
const ARG_VERTICAL_THRESHOLD: &str = "vertical-threshold-m";
const ARG_CHECK_ADJACENCY: &str = "check-adjacency";
const ARG_MAX_VARIABLES: &str = "max-variables";
const ENV_BUILD_PROBLEM: &str = "AIRSPACE_CMDS_BUILD_PROBLEM";
const ENV_SOLVE_PROBLEM: &str = "AIRSPACE_CMDS_SOLVE_PROBLEM";

/// Run the airspace CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Build(args) => build::run_build(args),
        Command::Solve(args) => solve::run_solve(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "airspace",
    about = "Build flight-planning constraint models over discretised airspace",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build a constraint model and write its summary or LP text.
    Build(BuildArgs),
    /// Build a constraint model and solve it exhaustively.
    Solve(SolveArgs),
}

fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests;
