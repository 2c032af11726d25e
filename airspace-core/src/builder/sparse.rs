//! Edge-selection formulation over a voxel graph.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{BuildError, Endpoint, ModelBuilder};
use crate::cost::edge_cost;
use crate::flight::FlightRequestSet;
use crate::grid::{AdjacencyThresholds, VoxelGraph};
use crate::model::{
    Constraint, ConstraintLabel, ConstraintModel, EdgeKey, Expression, FormulationKind,
};
use crate::performance::PerformanceTable;
use crate::source::{FlightRequestSource, PerformanceSource, VoxelRecordSource};
use crate::{FlightNumber, VoxelIndex};

/// Parameters of the graph formulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SparseConfig {
    /// Reject flights whose start has no outgoing edge or whose destination
    /// has no incoming edge before building anything.
    pub check_adjacency: bool,
}

impl Default for SparseConfig {
    fn default() -> Self {
        Self {
            check_adjacency: true,
        }
    }
}

/// Inputs of the graph formulation.
#[derive(Debug, Clone, Copy)]
pub struct SparseProblem<'a> {
    /// Voxels and their adjacency.
    pub graph: &'a VoxelGraph,
    /// Fuel burn and speed by flight level.
    pub performance: &'a PerformanceTable,
    /// Flights with snapped endpoints.
    pub flights: &'a FlightRequestSet,
}

/// Owned inputs of the graph formulation, loaded from record sources.
///
/// # Examples
/// ```
/// # fn main() -> Result<(), airspace_core::BuildError> {
/// use airspace_core::builder::{GraphInputs, SparseConfig, build_sparse};
/// use airspace_core::source::ProblemData;
/// use airspace_core::AdjacencyThresholds;
///
/// let inputs = GraphInputs::load(&ProblemData::default(), AdjacencyThresholds::default())?;
/// assert!(inputs.graph.is_empty());
/// let model = build_sparse(&SparseConfig::default(), &inputs.problem())?;
/// assert_eq!(model.variable_count(), 0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GraphInputs {
    /// Voxels and their adjacency.
    pub graph: VoxelGraph,
    /// Fuel burn and speed by flight level.
    pub performance: PerformanceTable,
    /// Flights snapped onto `graph`.
    pub flights: FlightRequestSet,
}

impl GraphInputs {
    /// Build the graph, the performance table and the snapped schedule from
    /// one source.
    pub fn load<S>(source: &S, thresholds: AdjacencyThresholds) -> Result<Self, BuildError>
    where
        S: VoxelRecordSource + PerformanceSource + FlightRequestSource + ?Sized,
    {
        let graph = VoxelGraph::from_source(source, thresholds)?;
        let performance = PerformanceTable::from_source(source)?;
        let flights = FlightRequestSet::from_source(source, &graph)?;
        Ok(Self {
            graph,
            performance,
            flights,
        })
    }

    /// Borrowed view for [`build_sparse`].
    #[must_use]
    pub const fn problem(&self) -> SparseProblem<'_> {
        SparseProblem {
            graph: &self.graph,
            performance: &self.performance,
            flights: &self.flights,
        }
    }
}

struct Route {
    flight: FlightNumber,
    start: VoxelIndex,
    destination: VoxelIndex,
}

/// Build the graph formulation.
///
/// Every flight gets one binary per graph edge. Exactly one edge leaves its
/// start, exactly one enters its destination, and any selected edge into a
/// voxel other than the destination must be followed by an edge out of it
/// that does not turn straight back.
pub fn build_sparse(
    config: &SparseConfig,
    problem: &SparseProblem<'_>,
) -> Result<ConstraintModel, BuildError> {
    let routes = routes(config, problem)?;
    let costs = edge_costs(problem)?;

    let flights = routes.iter().map(|route| route.flight).collect();
    let mut builder = ModelBuilder::new(FormulationKind::Sparse, flights);
    let mut objective = Expression::new();

    for route in &routes {
        let flight = route.flight;
        for (&(from, to), &cost) in &costs {
            let id = builder.declare(EdgeKey { flight, from, to })?;
            objective.add_term(id, cost);
        }

        let leaving = problem
            .graph
            .outgoing(route.start)
            .map(|edge| builder.variable(EdgeKey { flight, from: edge.from, to: edge.to }))
            .collect::<Vec<_>>();
        builder.constrain(Constraint::eq(
            ConstraintLabel::LeaveStart { flight },
            Expression::sum(leaving),
            1.0,
        ));

        let entering = problem
            .graph
            .incoming(route.destination)
            .map(|edge| builder.variable(EdgeKey { flight, from: edge.from, to: edge.to }))
            .collect::<Vec<_>>();
        builder.constrain(Constraint::eq(
            ConstraintLabel::ReachDestination { flight },
            Expression::sum(entering),
            1.0,
        ));

        for edge in problem.graph.edges() {
            if edge.to == route.destination {
                continue;
            }
            let (from, to) = (edge.from, edge.to);
            let uv = builder.variable(EdgeKey { flight, from, to });
            let mut lhs = Expression::constant(1.0).with_term(uv, -1.0);
            for onward in problem.graph.outgoing(to).filter(|onward| onward.to != from) {
                let vw = builder.variable(EdgeKey {
                    flight,
                    from: to,
                    to: onward.to,
                });
                lhs.add_product(uv, vw, 1.0);
            }
            builder.constrain(Constraint::eq(
                ConstraintLabel::Continuation { flight, from, to },
                lhs,
                1.0,
            ));
        }
    }

    builder.set_objective(objective);
    Ok(builder.finish())
}

fn routes(config: &SparseConfig, problem: &SparseProblem<'_>) -> Result<Vec<Route>, BuildError> {
    let mut routes = Vec::with_capacity(problem.flights.len());
    for request in problem.flights.iter() {
        let flight = request.number;
        let (Some(start), Some(destination)) =
            (request.start_index(), request.destination_index())
        else {
            return Err(BuildError::UnindexedVoxel { flight });
        };
        problem.graph.voxel(start)?;
        problem.graph.voxel(destination)?;
        if start == destination {
            log::warn!("flight {flight} starts at its destination voxel {start}");
        }
        if config.check_adjacency {
            if problem.graph.outgoing(start).next().is_none() {
                return Err(BuildError::InfeasibleAdjacency {
                    flight,
                    endpoint: Endpoint::Start,
                });
            }
            if problem.graph.incoming(destination).next().is_none() {
                return Err(BuildError::InfeasibleAdjacency {
                    flight,
                    endpoint: Endpoint::Destination,
                });
            }
        }
        routes.push(Route {
            flight,
            start,
            destination,
        });
    }
    Ok(routes)
}

/// Cost of every graph edge, computed once and shared by all flights.
fn edge_costs(
    problem: &SparseProblem<'_>,
) -> Result<BTreeMap<(VoxelIndex, VoxelIndex), f64>, BuildError> {
    let mut costs = BTreeMap::new();
    for edge in problem.graph.edges() {
        let from = problem.graph.voxel(edge.from)?;
        let to = problem.graph.voxel(edge.to)?;
        let cost = edge_cost(
            problem.performance,
            from,
            to,
            edge.from_climate,
            edge.to_climate,
        )?;
        costs.insert((edge.from, edge.to), cost);
    }
    Ok(costs)
}
