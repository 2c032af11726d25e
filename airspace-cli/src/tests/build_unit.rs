//! Focused unit tests covering build CLI configuration and model output.

use super::helpers::{Workspace, climate_problem, hop_problem, line_problem, write_utf8};
use super::*;
use crate::build::{
    BuildArgs, BuildConfig, ModelSummary, OutputFormat, config_from_layers_for_test,
    run_build_with,
};
use crate::problem::{ModelOptions, ModelOverrides, load_problem};
use airspace_core::{AdjacencyThresholds, FlightNumber, FormulationKind};
use camino::Utf8PathBuf;
use rstest::rstest;

fn args_for(problem: Utf8PathBuf) -> BuildArgs {
    BuildArgs {
        problem: Some(problem),
        ..BuildArgs::default()
    }
}

fn run_to_string(args: BuildArgs) -> String {
    let mut buffer = Vec::new();
    run_build_with(args, &mut buffer).expect("build should succeed");
    String::from_utf8(buffer).expect("utf-8 output")
}

#[rstest]
fn converting_build_without_problem_errors() {
    let err = BuildConfig::try_from(BuildArgs::default()).expect_err("missing problem");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_PROBLEM);
            assert_eq!(env, ENV_BUILD_PROBLEM);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn build_config_applies_defaults() {
    let config =
        BuildConfig::try_from(args_for(Utf8PathBuf::from("problem.json"))).expect("config");
    assert_eq!(config.format, OutputFormat::Summary);
    assert_eq!(config.output, None);
    assert_eq!(
        config.options,
        ModelOptions::resolve(ModelOverrides::default())
    );
}

#[rstest]
fn validate_sources_reports_missing_problem() {
    let workspace = Workspace::new();
    let problem = workspace.path("absent.json");
    let config = BuildConfig::try_from(args_for(problem.clone())).expect("config");
    match config.validate_sources().expect_err("missing file") {
        CliError::MissingSourceFile { field, path } => {
            assert_eq!(field, ARG_PROBLEM);
            assert_eq!(path, problem);
        }
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[rstest]
fn validate_sources_rejects_directories() {
    let workspace = Workspace::new();
    let problem = workspace.path("problem.json");
    std::fs::create_dir(&problem).expect("problem directory");
    let config = BuildConfig::try_from(args_for(problem)).expect("config");
    match config.validate_sources().expect_err("directory") {
        CliError::SourcePathNotFile { field, .. } => assert_eq!(field, ARG_PROBLEM),
        other => panic!("expected SourcePathNotFile, found {other:?}"),
    }
}

#[rstest]
fn load_problem_rejects_invalid_json() {
    let workspace = Workspace::new();
    let problem = workspace.path("problem.json");
    write_utf8(&problem, b"{ not valid json");
    match load_problem(&problem).expect_err("invalid json") {
        CliError::ParseProblem { path, .. } => assert_eq!(path, problem),
        other => panic!("expected ParseProblem, found {other:?}"),
    }
}

#[rstest]
fn load_problem_round_trips_written_files() {
    let workspace = Workspace::new();
    let problem = workspace.write_problem("line.json", &line_problem());
    assert_eq!(load_problem(&problem).expect("decodes"), line_problem());
}

#[rstest]
fn summary_reports_dense_model_size() {
    let workspace = Workspace::new();
    let problem = workspace.write_problem("hop.json", &hop_problem());
    let output = run_to_string(BuildArgs {
        horizon: Some(2),
        ..args_for(problem)
    });
    let summary: ModelSummary = serde_json::from_str(&output).expect("summary JSON");
    assert_eq!(summary.formulation, FormulationKind::Dense);
    assert_eq!(summary.flights, vec![FlightNumber(3)]);
    // 2 steps × 2 cells × 3 manoeuvres.
    assert_eq!(summary.variables, 12);
    assert_eq!(summary.constraints.get("plane_conservation"), Some(&2));
    assert!(!summary.quadratic_objective);
}

#[rstest]
fn summary_reports_graph_model_size() {
    let workspace = Workspace::new();
    let problem = workspace.write_problem("line.json", &line_problem());
    let summary: ModelSummary =
        serde_json::from_str(&run_to_string(args_for(problem))).expect("summary JSON");
    assert_eq!(summary.formulation, FormulationKind::Sparse);
    // Two neighbouring pairs, one variable per direction.
    assert_eq!(summary.variables, 4);
    assert_eq!(summary.constraints.get("leave_start"), Some(&1));
    assert_eq!(summary.constraints.get("reach_destination"), Some(&1));
}

#[rstest]
fn climate_problems_bin_flights_onto_the_grid() {
    let workspace = Workspace::new();
    let problem = workspace.write_problem("climate.json", &climate_problem(10));
    let summary: ModelSummary = serde_json::from_str(&run_to_string(BuildArgs {
        horizon: Some(3),
        ..args_for(problem)
    }))
    .expect("summary JSON");
    assert_eq!(summary.formulation, FormulationKind::Dense);
    // 3 steps × 3 cells × 3 manoeuvres.
    assert_eq!(summary.variables, 27);
}

#[rstest]
fn climate_problems_reject_unbinned_endpoints() {
    let workspace = Workspace::new();
    let problem = workspace.write_problem("climate.json", &climate_problem(7));
    let mut buffer = Vec::new();
    match run_build_with(args_for(problem), &mut buffer).expect_err("unbinned") {
        CliError::UnbinnedEndpoint { flight } => assert_eq!(flight, FlightNumber(4)),
        other => panic!("expected UnbinnedEndpoint, found {other:?}"),
    }
}

#[rstest]
fn lp_output_is_written_to_the_output_file() {
    let workspace = Workspace::new();
    let problem = workspace.write_problem("hop.json", &hop_problem());
    let output = workspace.path("hop.lp");
    let mut buffer = Vec::new();
    run_build_with(
        BuildArgs {
            format: Some(OutputFormat::Lp),
            output: Some(output.clone()),
            horizon: Some(2),
            ..args_for(problem)
        },
        &mut buffer,
    )
    .expect("build should succeed");
    assert!(buffer.is_empty());

    let text = std::fs::read_to_string(&output).expect("lp file");
    assert!(text.starts_with("\\ dense model: 12 variables"));
    assert!(text.contains("Subject To"));
    assert!(text.trim_end().ends_with("End"));
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "horizon": "soon" }));

    match config_from_layers_for_test(composer.layers()).expect_err("invalid layer") {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_honours_precedence() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "horizon": 12,
            "format": "lp",
            "vertical_threshold_m": 1200.0,
        }),
        None,
    );
    composer.push_environment(json!({
        "problem": "from-env.json",
        "horizon": 16,
    }));
    composer.push_cli(json!({ "horizon": 24 }));

    let config = config_from_layers_for_test(composer.layers()).expect("merged config");
    assert_eq!(config.problem, Utf8PathBuf::from("from-env.json"));
    assert_eq!(config.format, OutputFormat::Lp);
    assert_eq!(config.options.dense.horizon, 24);
    assert_eq!(
        config.options.thresholds,
        AdjacencyThresholds {
            vertical_m: 1200.0,
            ..AdjacencyThresholds::default()
        }
    );
}
