//! Behaviour-driven step definitions driving the solve CLI scenarios.

use super::helpers::{Workspace, hop_problem};
use super::*;
use crate::solve::{DefaultSolverBuilder, SolveReport, SolveStatus, run_solve_with};
use airspace_core::{Cell, FlightNumber, SolveError, Trajectory};
use camino::Utf8PathBuf;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;

struct SolveWorld {
    workspace: Workspace,
    problem_path: Utf8PathBuf,
    include_problem: RefCell<bool>,
    cli_args: RefCell<Vec<String>>,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl SolveWorld {
    fn new() -> Self {
        let workspace = Workspace::new();
        let problem_path = workspace.path("problem.json");
        Self {
            workspace,
            problem_path,
            include_problem: RefCell::new(true),
            cli_args: RefCell::new(Vec::new()),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    fn build_command_line(&self) -> Vec<String> {
        let mut argv = vec!["airspace".to_owned(), "solve".to_owned()];
        if *self.include_problem.borrow() {
            argv.push(self.problem_path.as_str().to_owned());
        }
        argv.extend(self.cli_args.borrow().iter().cloned());
        argv
    }

    fn report(&self) -> SolveReport {
        let borrowed = self.result.borrow();
        borrowed
            .as_ref()
            .expect("result recorded")
            .as_ref()
            .expect("expected success");
        serde_json::from_slice(&self.stdout.borrow()).expect("report JSON")
    }

    fn error(&self) -> std::cell::Ref<'_, CliError> {
        std::cell::Ref::map(self.result.borrow(), |result| {
            result
                .as_ref()
                .expect("result recorded")
                .as_ref()
                .expect_err("expected error")
        })
    }
}

#[fixture]
fn world() -> SolveWorld {
    SolveWorld::new()
}

#[given("a dense hop problem is ready to solve")]
fn hop_problem_ready(#[from(world)] world: &SolveWorld) {
    world.workspace.write_problem("problem.json", &hop_problem());
}

#[given("a horizon of {steps} steps")]
fn horizon_of(#[from(world)] world: &SolveWorld, steps: usize) {
    world
        .cli_args
        .borrow_mut()
        .extend([format!("--{ARG_HORIZON}"), steps.to_string()]);
}

#[given("a solver limit of {limit} variables")]
fn solver_limit(#[from(world)] world: &SolveWorld, limit: usize) {
    world
        .cli_args
        .borrow_mut()
        .extend([format!("--{ARG_MAX_VARIABLES}"), limit.to_string()]);
}

#[given("the solve problem path is omitted")]
fn omit_solve_problem(#[from(world)] world: &SolveWorld) {
    *world.include_problem.borrow_mut() = false;
}

#[when("I run the solve command")]
fn run_solve_command(#[from(world)] world: &SolveWorld) {
    let invocation = world.build_command_line();
    let parsed = Cli::try_parse_from(invocation).map_err(CliError::from);
    let outcome = parsed.and_then(|cli| match cli.command {
        Command::Solve(args) => {
            let mut buffer = world.stdout.borrow_mut();
            run_solve_with(args, &DefaultSolverBuilder, &mut *buffer)
        }
        Command::Build(_) => panic!("expected solve command"),
    });
    world.result.replace(Some(outcome));
}

#[then("the report is solved with objective {objective}")]
fn report_is_solved(#[from(world)] world: &SolveWorld, objective: f64) {
    let report = world.report();
    assert_eq!(report.status, SolveStatus::Solved);
    assert_eq!(report.objective, Some(objective));
}

#[then("the report is infeasible")]
fn report_is_infeasible(#[from(world)] world: &SolveWorld) {
    let report = world.report();
    assert_eq!(report.status, SolveStatus::Infeasible);
    assert!(report.trajectories.is_empty());
}

#[then("flight {flight} finishes in cell {x}, {y}, {z}")]
fn flight_finishes_in(
    #[from(world)] world: &SolveWorld,
    flight: u32,
    x: usize,
    y: usize,
    z: usize,
) {
    let report = world.report();
    let Some(Trajectory::Timed(cells)) = report.trajectories.get(&FlightNumber(flight)) else {
        panic!("expected a timed trajectory for flight {flight}");
    };
    let last = cells.last().expect("trajectory should not be empty");
    assert_eq!(last.cell, Cell::new(x, y, z));
}

#[then("the solve fails because the model has {variables} variables")]
fn solve_fails_oversize(#[from(world)] world: &SolveWorld, variables: usize) {
    match &*world.error() {
        CliError::Solve {
            source: SolveError::ModelTooLarge {
                variables: actual, ..
            },
        } => assert_eq!(*actual, variables),
        other => panic!("expected ModelTooLarge, found {other:?}"),
    }
}

#[then("the solve fails because the problem path is missing")]
fn solve_fails_missing_problem(#[from(world)] world: &SolveWorld) {
    match &*world.error() {
        CliError::MissingArgument { field, env } => {
            assert_eq!(*field, ARG_PROBLEM);
            assert_eq!(*env, ENV_SOLVE_PROBLEM);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

macro_rules! register_solve_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/solve_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: SolveWorld) {
            let _ = world;
        }
    };
}

#[cfg(feature = "solver-exhaustive")]
register_solve_scenario!(solve_dense_problem, "solving a dense problem");
#[cfg(feature = "solver-exhaustive")]
register_solve_scenario!(solve_infeasible_problem, "reporting infeasible problems");
#[cfg(feature = "solver-exhaustive")]
register_solve_scenario!(solve_oversize_model, "refusing oversize models");
register_solve_scenario!(solve_missing_problem, "rejecting missing problem paths");
