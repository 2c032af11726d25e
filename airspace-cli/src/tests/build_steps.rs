//! Behaviour-driven step definitions driving the build CLI scenarios.

use super::helpers::{Workspace, hop_problem, line_problem, write_utf8};
use super::*;
use crate::build::ModelSummary;
use crate::problem::ProblemFile;
use airspace_core::builder::{BuildError, Endpoint};
use airspace_core::source::ProblemData;
use airspace_core::FlightNumber;
use camino::Utf8PathBuf;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;

struct BuildWorld {
    workspace: Workspace,
    problem_path: Utf8PathBuf,
    include_problem: RefCell<bool>,
    cli_args: RefCell<Vec<String>>,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl BuildWorld {
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

    fn save(&self, problem: &ProblemFile) {
        let path = self.workspace.write_problem("problem.json", problem);
        assert_eq!(path, self.problem_path);
    }

    fn build_command_line(&self) -> Vec<String> {
        let mut argv = vec!["airspace".to_owned(), "build".to_owned()];
        if *self.include_problem.borrow() {
            argv.push(self.problem_path.as_str().to_owned());
        }
        argv.extend(self.cli_args.borrow().iter().cloned());
        argv
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
fn world() -> BuildWorld {
    BuildWorld::new()
}

#[given("a graph problem file exists on disk")]
fn graph_problem_exists(#[from(world)] world: &BuildWorld) {
    world.save(&line_problem());
}

#[given("a dense problem file exists on disk")]
fn dense_problem_exists(#[from(world)] world: &BuildWorld) {
    world.save(&hop_problem());
}

#[given("a graph problem whose start voxel is isolated exists on disk")]
fn stranded_problem_exists(#[from(world)] world: &BuildWorld) {
    let ProblemFile::Sparse(ProblemData {
        mut voxels,
        performance,
        mut flights,
    }) = line_problem()
    else {
        panic!("line problem should be a graph problem");
    };
    // Move the far voxels out of reach of the start.
    for (record, longitude) in voxels.iter_mut().skip(1).zip([20, 21]) {
        record.longitude = longitude;
    }
    for flight in &mut flights {
        flight.end.longitude = 21;
    }
    world.save(&ProblemFile::Sparse(ProblemData {
        voxels,
        performance,
        flights,
    }));
}

#[given("the problem file contains invalid JSON")]
fn problem_contains_invalid_json(#[from(world)] world: &BuildWorld) {
    write_utf8(&world.problem_path, b"{ not valid json");
}

#[given("I omit the problem path")]
fn omit_problem_path(#[from(world)] world: &BuildWorld) {
    *world.include_problem.borrow_mut() = false;
}

#[given("I request LP output over {steps} steps")]
fn request_lp_output(#[from(world)] world: &BuildWorld, steps: usize) {
    world.cli_args.borrow_mut().extend([
        format!("--{ARG_FORMAT}"),
        "lp".to_owned(),
        format!("--{ARG_HORIZON}"),
        steps.to_string(),
    ]);
}

#[when("I run the build command")]
fn run_build_command(#[from(world)] world: &BuildWorld) {
    let invocation = world.build_command_line();
    let parsed = Cli::try_parse_from(invocation).map_err(CliError::from);
    let outcome = parsed.and_then(|cli| match cli.command {
        Command::Build(args) => {
            let mut buffer = world.stdout.borrow_mut();
            build::run_build_with(args, &mut *buffer)
        }
        Command::Solve(_) => panic!("expected build command"),
    });
    world.result.replace(Some(outcome));
}

#[then("the command succeeds and reports {variables} variables")]
fn command_reports_variables(#[from(world)] world: &BuildWorld, variables: usize) {
    let borrowed = world.result.borrow();
    let result = borrowed.as_ref().expect("result recorded");
    result.as_ref().expect("expected success");

    let stdout = String::from_utf8(world.stdout.borrow().clone()).expect("stdout utf-8");
    let summary: ModelSummary = serde_json::from_str(&stdout).expect("summary JSON");
    assert_eq!(summary.variables, variables);
}

#[then("the command prints LP text for a dense model")]
fn command_prints_lp(#[from(world)] world: &BuildWorld) {
    let borrowed = world.result.borrow();
    borrowed
        .as_ref()
        .expect("result recorded")
        .as_ref()
        .expect("expected success");

    let stdout = String::from_utf8(world.stdout.borrow().clone()).expect("stdout utf-8");
    assert!(stdout.starts_with("\\ dense model"));
    assert!(stdout.contains("Binary"));
}

#[then("the command fails because flight {flight} cannot leave its start")]
fn command_fails_stranded(#[from(world)] world: &BuildWorld, flight: u32) {
    match &*world.error() {
        CliError::Build(BuildError::InfeasibleAdjacency {
            flight: stranded,
            endpoint,
        }) => {
            assert_eq!(*stranded, FlightNumber(flight));
            assert_eq!(*endpoint, Endpoint::Start);
        }
        other => panic!("expected InfeasibleAdjacency, found {other:?}"),
    }
}

#[then("the command fails because the problem JSON is invalid")]
fn command_fails_invalid_json(#[from(world)] world: &BuildWorld) {
    match &*world.error() {
        CliError::ParseProblem { .. } => {}
        other => panic!("expected ParseProblem, found {other:?}"),
    }
}

#[then("the command fails because the problem path is missing")]
fn command_fails_missing_problem(#[from(world)] world: &BuildWorld) {
    match &*world.error() {
        CliError::MissingArgument { field, .. } => assert_eq!(*field, ARG_PROBLEM),
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

macro_rules! register_build_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/build_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: BuildWorld) {
            let _ = world;
        }
    };
}

register_build_scenario!(build_graph_summary, "summarising a graph problem");
register_build_scenario!(build_dense_lp, "exporting LP text for a dense problem");
register_build_scenario!(build_stranded_flight, "reporting stranded flights");
register_build_scenario!(build_invalid_json, "rejecting invalid JSON input");
register_build_scenario!(build_missing_problem, "rejecting missing problem paths");
