//! Solve command implementation for the airspace CLI.

use std::collections::BTreeMap;
use std::io::Write;

use airspace_core::{
    ConstraintModel, FlightNumber, FormulationKind, SolveOutcome, Solver, Trajectory, decode,
};
use camino::Utf8PathBuf;
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::build::{emit, write_json};
use crate::problem::{ModelOptions, ModelOverrides, load_problem};
use crate::{
    ARG_CHECK_ADJACENCY, ARG_DESTINATION_REWARD, ARG_HORIZON, ARG_HORIZONTAL_THRESHOLD,
    ARG_MAX_VARIABLES, ARG_OUTPUT, ARG_PROBLEM, ARG_VERTICAL_THRESHOLD, CliError,
    ENV_SOLVE_PROBLEM, require_existing,
};

/// CLI arguments for the `solve` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Build a constraint model from a JSON problem file and solve \
                 it by enumerating every assignment. Only small models fit; \
                 larger ones should be exported with `build --format lp`.",
    about = "Solve a small problem exactly"
)]
#[ortho_config(prefix = "AIRSPACE")]
pub(crate) struct SolveArgs {
    /// Path to a JSON problem file.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) problem: Option<Utf8PathBuf>,
    /// Write the report to this file instead of standard output.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
    /// Largest model the solver will enumerate.
    #[arg(long = ARG_MAX_VARIABLES, value_name = "count")]
    #[serde(default)]
    pub(crate) max_variables: Option<usize>,
    /// Number of time steps in dense formulations.
    #[arg(long = ARG_HORIZON, value_name = "steps")]
    #[serde(default)]
    pub(crate) horizon: Option<usize>,
    /// Objective bonus per aircraft that ends at its destination.
    #[arg(long = ARG_DESTINATION_REWARD, value_name = "reward")]
    #[serde(default)]
    pub(crate) destination_reward: Option<i64>,
    /// Horizontal adjacency limit for graph edges, in metres.
    #[arg(long = ARG_HORIZONTAL_THRESHOLD, value_name = "metres")]
    #[serde(default)]
    pub(crate) horizontal_threshold_m: Option<f64>,
    /// Vertical adjacency limit for graph edges, in metres.
    #[arg(long = ARG_VERTICAL_THRESHOLD, value_name = "metres")]
    #[serde(default)]
    pub(crate) vertical_threshold_m: Option<f64>,
    /// Reject stranded flights before building graph models.
    #[arg(long = ARG_CHECK_ADJACENCY, value_name = "bool")]
    #[serde(default)]
    pub(crate) check_adjacency: Option<bool>,
}

impl SolveArgs {
    pub(crate) fn into_config(self) -> Result<SolveConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SolveConfig::try_from(merged)
    }
}

/// Resolved `solve` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SolveConfig {
    /// Path to the JSON problem file.
    pub(crate) problem: Utf8PathBuf,
    /// Output file, or standard output when unset.
    pub(crate) output: Option<Utf8PathBuf>,
    /// Solver size limit; the solver default applies when unset.
    pub(crate) max_variables: Option<usize>,
    /// Builder settings.
    pub(crate) options: ModelOptions,
}

impl SolveConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.problem, ARG_PROBLEM)
    }
}

impl TryFrom<SolveArgs> for SolveConfig {
    type Error = CliError;

    fn try_from(args: SolveArgs) -> Result<Self, Self::Error> {
        let problem = args.problem.ok_or(CliError::MissingArgument {
            field: ARG_PROBLEM,
            env: ENV_SOLVE_PROBLEM,
        })?;
        let options = ModelOptions::resolve(ModelOverrides {
            horizon: args.horizon,
            destination_reward: args.destination_reward,
            horizontal_threshold_m: args.horizontal_threshold_m,
            vertical_threshold_m: args.vertical_threshold_m,
            check_adjacency: args.check_adjacency,
        });
        Ok(Self {
            problem,
            output: args.output,
            max_variables: args.max_variables,
            options,
        })
    }
}

/// Whether the solver found an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum SolveStatus {
    Solved,
    Infeasible,
}

/// JSON report of one solve.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub(crate) struct SolveReport {
    pub(crate) formulation: FormulationKind,
    pub(crate) variables: usize,
    pub(crate) status: SolveStatus,
    pub(crate) objective: Option<f64>,
    pub(crate) trajectories: BTreeMap<FlightNumber, Trajectory>,
}

impl SolveReport {
    pub(crate) fn of(model: &ConstraintModel, outcome: &SolveOutcome) -> Self {
        let (status, objective, trajectories) = match outcome.solution() {
            Some(solution) => (
                SolveStatus::Solved,
                Some(solution.objective),
                decode(model, &solution.assignment),
            ),
            None => (SolveStatus::Infeasible, None, BTreeMap::new()),
        };
        Self {
            formulation: model.formulation(),
            variables: model.variable_count(),
            status,
            objective,
            trajectories,
        }
    }
}

/// Builds a solver instance for the current solve invocation.
pub(super) trait SolverBuilder {
    fn build(&self, config: &SolveConfig) -> Result<Box<dyn Solver>, CliError>;
}

pub(super) struct DefaultSolverBuilder;

impl SolverBuilder for DefaultSolverBuilder {
    #[cfg(feature = "solver-exhaustive")]
    fn build(&self, config: &SolveConfig) -> Result<Box<dyn Solver>, CliError> {
        use airspace_solver_exhaustive::{ExhaustiveSolver, ExhaustiveSolverConfig};

        let defaults = ExhaustiveSolverConfig::default();
        Ok(Box::new(ExhaustiveSolver::with_config(
            ExhaustiveSolverConfig {
                max_variables: config.max_variables.unwrap_or(defaults.max_variables),
            },
        )))
    }

    #[cfg(not(feature = "solver-exhaustive"))]
    fn build(&self, _config: &SolveConfig) -> Result<Box<dyn Solver>, CliError> {
        Err(CliError::MissingFeature {
            feature: "solver-exhaustive",
            action: "solving",
        })
    }
}

pub(super) fn run_solve(args: SolveArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_solve_with(args, &DefaultSolverBuilder, &mut stdout)
}

pub(super) fn run_solve_with(
    args: SolveArgs,
    builder: &dyn SolverBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = resolve_solve_config(args)?;
    let problem = load_problem(&config.problem)?;
    let model = problem.build(&config.options)?;
    let solver = builder.build(&config)?;
    let outcome = solver
        .solve(&model)
        .map_err(|source| CliError::Solve { source })?;
    let report = SolveReport::of(&model, &outcome);
    info!(
        "solved {} model with {} variables: {:?}",
        report.formulation, report.variables, report.status
    );
    emit(config.output.as_deref(), writer, |out| write_json(out, &report))
}

fn resolve_solve_config(args: SolveArgs) -> Result<SolveConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}
