//! Build command implementation for the airspace CLI.

use std::collections::BTreeMap;
use std::io::{BufWriter, Write};

use airspace_core::model::lp::write_lp;
use airspace_core::{ConstraintModel, FlightNumber, FormulationKind};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, ValueEnum};
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::fs::create_utf8_file;
use crate::problem::{ModelOptions, ModelOverrides, load_problem};
use crate::{
    ARG_CHECK_ADJACENCY, ARG_DESTINATION_REWARD, ARG_FORMAT, ARG_HORIZON,
    ARG_HORIZONTAL_THRESHOLD, ARG_OUTPUT, ARG_PROBLEM, ARG_VERTICAL_THRESHOLD, CliError,
    ENV_BUILD_PROBLEM, require_existing,
};

/// Rendering of a built model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub(crate) enum OutputFormat {
    /// JSON summary of variables and constraint counts.
    #[default]
    Summary,
    /// CPLEX LP text for external solvers.
    Lp,
}

/// CLI arguments for the `build` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Build a constraint model from a JSON problem file. The file \
                 selects the dense, climate or sparse formulation; builder \
                 settings can come from CLI flags, configuration files, or \
                 environment variables.",
    about = "Build a constraint model from a problem file"
)]
#[ortho_config(prefix = "AIRSPACE")]
pub(crate) struct BuildArgs {
    /// Path to a JSON problem file.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) problem: Option<Utf8PathBuf>,
    /// Output rendering (`summary` or `lp`).
    #[arg(long = ARG_FORMAT, value_enum, value_name = "format")]
    #[serde(default)]
    pub(crate) format: Option<OutputFormat>,
    /// Write to this file instead of standard output.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
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

impl BuildArgs {
    pub(crate) fn into_config(self) -> Result<BuildConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        BuildConfig::try_from(merged)
    }
}

/// Resolved `build` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BuildConfig {
    /// Path to the JSON problem file.
    pub(crate) problem: Utf8PathBuf,
    /// How to render the model.
    pub(crate) format: OutputFormat,
    /// Output file, or standard output when unset.
    pub(crate) output: Option<Utf8PathBuf>,
    /// Builder settings.
    pub(crate) options: ModelOptions,
}

impl BuildConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.problem, ARG_PROBLEM)
    }
}

impl TryFrom<BuildArgs> for BuildConfig {
    type Error = CliError;

    fn try_from(args: BuildArgs) -> Result<Self, Self::Error> {
        let problem = args.problem.ok_or(CliError::MissingArgument {
            field: ARG_PROBLEM,
            env: ENV_BUILD_PROBLEM,
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
            format: args.format.unwrap_or_default(),
            output: args.output,
            options,
        })
    }
}

/// Size of a built model, keyed by constraint family.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub(crate) struct ModelSummary {
    pub(crate) formulation: FormulationKind,
    pub(crate) flights: Vec<FlightNumber>,
    pub(crate) variables: usize,
    pub(crate) constraints: BTreeMap<String, usize>,
    pub(crate) quadratic_objective: bool,
}

impl ModelSummary {
    pub(crate) fn of(model: &ConstraintModel) -> Self {
        Self {
            formulation: model.formulation(),
            flights: model.flights().to_vec(),
            variables: model.variable_count(),
            constraints: model
                .constraint_counts()
                .into_iter()
                .map(|(kind, count)| (kind.name().to_owned(), count))
                .collect(),
            quadratic_objective: model.objective().is_quadratic(),
        }
    }
}

pub(super) fn run_build(args: BuildArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_build_with(args, &mut stdout)
}

pub(super) fn run_build_with(args: BuildArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = resolve_build_config(args)?;
    let problem = load_problem(&config.problem)?;
    let model = problem.build(&config.options)?;
    info!(
        "built {} model with {} variables and {} constraints",
        model.formulation(),
        model.variable_count(),
        model.constraints().len()
    );
    emit(config.output.as_deref(), writer, |out| match config.format {
        OutputFormat::Summary => write_json(out, &ModelSummary::of(&model)),
        OutputFormat::Lp => write_lp(&model, out).map_err(CliError::WriteOutput),
    })
}

fn resolve_build_config(args: BuildArgs) -> Result<BuildConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

/// Render through `writer`, or through a new file when `output` is set.
pub(crate) fn emit(
    output: Option<&Utf8Path>,
    writer: &mut dyn Write,
    render: impl FnOnce(&mut dyn Write) -> Result<(), CliError>,
) -> Result<(), CliError> {
    let Some(path) = output else {
        return render(writer);
    };
    let file = create_utf8_file(path).map_err(|source| CliError::CreateOutput {
        path: path.to_path_buf(),
        source,
    })?;
    let mut buffered = BufWriter::new(file);
    render(&mut buffered)?;
    buffered.flush().map_err(CliError::WriteOutput)
}

/// Pretty-print `value` as JSON followed by a newline.
pub(crate) fn write_json<T: Serialize>(writer: &mut dyn Write, value: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<BuildConfig, CliError> {
    let merged = BuildArgs::merge_from_layers(layers).map_err(CliError::from)?;
    BuildConfig::try_from(merged)
}
