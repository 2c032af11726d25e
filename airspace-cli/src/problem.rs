//! JSON problem descriptions and the builders they select.

use std::io::BufReader;

use airspace_core::builder::{DenseAircraft, DenseConfig, DenseProblem, GraphInputs, SparseConfig};
use airspace_core::cost::{ClimateFuelCellCost, CostScales, DenseCellCost, UniformCellCost};
use airspace_core::source::{FlightRequestRecord, ProblemData};
use airspace_core::{
    AdjacencyThresholds, BuildError, ConstraintModel, Formulation, PerformanceTable, RegularGrid,
};
use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use crate::CliError;
use crate::fs::open_utf8_file;

/// A problem file, tagged by the formulation it asks for.
///
/// ```json
/// { "formulation": "dense", "size": { "x": 5, "y": 5, "z": 1 }, "aircraft": [] }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "formulation", rename_all = "snake_case")]
pub(crate) enum ProblemFile {
    /// Regular grid with a flat cost per occupied step.
    Dense(GridProblem),
    /// Regular grid binned from climate samples and priced by fuel burn.
    Climate(ProblemData),
    /// Voxel graph over climate samples.
    Sparse(ProblemData),
}

/// Extent of a regular grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub(crate) struct GridSize {
    pub(crate) x: usize,
    pub(crate) y: usize,
    pub(crate) z: usize,
}

/// Dense problem stated directly in grid cells.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub(crate) struct GridProblem {
    pub(crate) size: GridSize,
    pub(crate) aircraft: Vec<DenseAircraft>,
    #[serde(default = "default_step_cost")]
    pub(crate) step_cost: i64,
}

const fn default_step_cost() -> i64 {
    1
}

/// Builder settings left unset fall back to the library defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct ModelOverrides {
    pub(crate) horizon: Option<usize>,
    pub(crate) destination_reward: Option<i64>,
    pub(crate) horizontal_threshold_m: Option<f64>,
    pub(crate) vertical_threshold_m: Option<f64>,
    pub(crate) check_adjacency: Option<bool>,
}

/// Builder settings resolved from layered configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ModelOptions {
    pub(crate) dense: DenseConfig,
    pub(crate) sparse: SparseConfig,
    pub(crate) thresholds: AdjacencyThresholds,
}

impl ModelOptions {
    pub(crate) fn resolve(overrides: ModelOverrides) -> Self {
        let dense = DenseConfig::default();
        let sparse = SparseConfig::default();
        let thresholds = AdjacencyThresholds::default();
        Self {
            dense: DenseConfig {
                horizon: overrides.horizon.unwrap_or(dense.horizon),
                destination_reward: overrides
                    .destination_reward
                    .unwrap_or(dense.destination_reward),
            },
            sparse: SparseConfig {
                check_adjacency: overrides
                    .check_adjacency
                    .unwrap_or(sparse.check_adjacency),
            },
            thresholds: AdjacencyThresholds {
                horizontal_m: overrides
                    .horizontal_threshold_m
                    .unwrap_or(thresholds.horizontal_m),
                vertical_m: overrides
                    .vertical_threshold_m
                    .unwrap_or(thresholds.vertical_m),
            },
        }
    }
}

impl ProblemFile {
    /// Build the constraint model this problem describes.
    pub(crate) fn build(&self, options: &ModelOptions) -> Result<ConstraintModel, CliError> {
        let model = match self {
            Self::Dense(problem) => {
                let cost = UniformCellCost(problem.step_cost);
                let grid = RegularGrid::new(problem.size.x, problem.size.y, problem.size.z)
                    .map_err(BuildError::from)?;
                dense(options, grid, problem.aircraft.clone(), &cost).build()?
            }
            Self::Climate(data) => {
                let table = PerformanceTable::from_source(data).map_err(BuildError::from)?;
                let cost = ClimateFuelCellCost::new(&data.voxels, &table, CostScales::default())
                    .map_err(BuildError::from)?;
                let aircraft = data
                    .flights
                    .iter()
                    .map(|request| binned_aircraft(&cost, request))
                    .collect::<Result<Vec<_>, _>>()?;
                let grid = cost.grid().map_err(BuildError::from)?;
                dense(options, grid, aircraft, &cost).build()?
            }
            Self::Sparse(data) => {
                let inputs = GraphInputs::load(data, options.thresholds)?;
                Formulation::Sparse {
                    config: options.sparse,
                    problem: inputs.problem(),
                }
                .build()?
            }
        };
        Ok(model)
    }
}

fn dense<'a>(
    options: &ModelOptions,
    grid: RegularGrid,
    aircraft: Vec<DenseAircraft>,
    cost: &'a dyn DenseCellCost,
) -> Formulation<'a> {
    Formulation::Dense {
        config: options.dense,
        problem: DenseProblem {
            grid,
            aircraft,
            cost,
        },
    }
}

fn binned_aircraft(
    cost: &ClimateFuelCellCost,
    request: &FlightRequestRecord,
) -> Result<DenseAircraft, CliError> {
    let cell = |coordinate: airspace_core::source::Coordinate| {
        cost.cell_of(
            coordinate.longitude,
            coordinate.latitude,
            coordinate.flight_level,
        )
        .ok_or(CliError::UnbinnedEndpoint {
            flight: request.flight_number,
        })
    };
    Ok(DenseAircraft {
        flight: request.flight_number,
        start: cell(request.start)?,
        destination: cell(request.end)?,
    })
}

/// Load a JSON-encoded [`ProblemFile`] from disk.
pub(crate) fn load_problem(path: &Utf8Path) -> Result<ProblemFile, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenProblem {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| CliError::ParseProblem {
        path: path.to_path_buf(),
        source,
    })
}
