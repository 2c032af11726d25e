//! Time-indexed occupancy formulation over a regular grid.

use std::collections::BTreeSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{BuildError, ModelBuilder};
use crate::FlightNumber;
use crate::cost::DenseCellCost;
use crate::flight::FlightError;
use crate::grid::{Cell, Maneuver, RegularGrid};
use crate::model::{
    Constraint, ConstraintLabel, ConstraintModel, Expression, FormulationKind, OccupancyKey,
    VariableId,
};

/// Parameters of the dense formulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DenseConfig {
    /// Number of discrete time steps.
    pub horizon: usize,
    /// Objective bonus per aircraft that ends level at its destination.
    pub destination_reward: i64,
}

impl Default for DenseConfig {
    fn default() -> Self {
        Self {
            horizon: 20,
            destination_reward: 1000,
        }
    }
}

/// One aircraft of a dense problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DenseAircraft {
    /// Flight identifier.
    pub flight: FlightNumber,
    /// Cell occupied level at step zero.
    pub start: Cell,
    /// Cell to reach by the final step.
    pub destination: Cell,
}

/// Inputs of the dense formulation.
pub struct DenseProblem<'a> {
    /// Grid the aircraft move through.
    pub grid: RegularGrid,
    /// Aircraft in model order.
    pub aircraft: Vec<DenseAircraft>,
    /// Per-step occupancy weights.
    pub cost: &'a dyn DenseCellCost,
}

/// Build the dense formulation.
///
/// Aircraft `a` of the problem owns every occupancy key with `aircraft == a`.
pub fn build_dense(
    config: &DenseConfig,
    problem: &DenseProblem<'_>,
) -> Result<ConstraintModel, BuildError> {
    validate(config, problem)?;
    let flights = problem.aircraft.iter().map(|aircraft| aircraft.flight).collect();
    let mut dense = DenseBuilder {
        builder: ModelBuilder::new(FormulationKind::Dense, flights),
        grid: problem.grid,
        horizon: config.horizon,
        aircraft: &problem.aircraft,
    };
    dense.declare_variables()?;
    dense.plane_conservation();
    dense.endpoints();
    dense.reachability();
    dense.no_collision();
    dense.flight_level_changes();
    dense.objective(problem.cost, config.destination_reward)?;
    Ok(dense.builder.finish())
}

fn validate(config: &DenseConfig, problem: &DenseProblem<'_>) -> Result<(), BuildError> {
    if config.horizon == 0 {
        return Err(BuildError::EmptyHorizon);
    }
    let mut seen = BTreeSet::new();
    for aircraft in &problem.aircraft {
        if !seen.insert(aircraft.flight) {
            return Err(FlightError::DuplicateFlightNumber {
                number: aircraft.flight,
            }
            .into());
        }
        for cell in [aircraft.start, aircraft.destination] {
            if !problem.grid.contains(cell) {
                return Err(BuildError::CellOutOfBounds {
                    flight: aircraft.flight,
                    cell,
                });
            }
        }
        if aircraft.start == aircraft.destination {
            log::warn!(
                "flight {} starts at its destination {}",
                aircraft.flight,
                aircraft.start
            );
        }
    }
    Ok(())
}

struct DenseBuilder<'p> {
    builder: ModelBuilder,
    grid: RegularGrid,
    horizon: usize,
    aircraft: &'p [DenseAircraft],
}

impl DenseBuilder<'_> {
    fn q(&mut self, time: usize, aircraft: usize, cell: Cell, maneuver: Maneuver) -> VariableId {
        self.builder.variable(OccupancyKey {
            time,
            aircraft,
            cell,
            maneuver,
        })
    }

    /// The three manoeuvre indicators of one cell.
    fn occupancy(&mut self, time: usize, aircraft: usize, cell: Cell) -> [VariableId; 3] {
        Maneuver::ALL.map(|maneuver| self.q(time, aircraft, cell, maneuver))
    }

    fn cells(&self) -> Vec<Cell> {
        self.grid.cells().collect()
    }

    fn declare_variables(&mut self) -> Result<(), BuildError> {
        let cells = self.cells();
        for time in 0..self.horizon {
            for aircraft in 0..self.aircraft.len() {
                for &cell in &cells {
                    for maneuver in Maneuver::ALL {
                        self.builder.declare(OccupancyKey {
                            time,
                            aircraft,
                            cell,
                            maneuver,
                        })?;
                    }
                }
            }
        }
        Ok(())
    }

    fn plane_conservation(&mut self) {
        let cells = self.cells();
        for time in 0..self.horizon {
            for aircraft in 0..self.aircraft.len() {
                let mut lhs = Expression::new();
                for &cell in &cells {
                    for id in self.occupancy(time, aircraft, cell) {
                        lhs.add_term(id, 1.0);
                    }
                }
                self.builder.constrain(Constraint::eq(
                    ConstraintLabel::PlaneConservation { time, aircraft },
                    lhs,
                    1.0,
                ));
            }
        }
    }

    fn endpoints(&mut self) {
        let last = self.horizon - 1;
        let plans = self.aircraft;
        for (aircraft, plan) in plans.iter().enumerate() {
            let start = self.q(0, aircraft, plan.start, Maneuver::Level);
            self.builder.constrain(Constraint::eq(
                ConstraintLabel::Start { aircraft },
                Expression::sum([start]),
                1.0,
            ));
            let arrival = self.occupancy(last, aircraft, plan.destination);
            self.builder.constrain(Constraint::eq(
                ConstraintLabel::Terminal { aircraft },
                Expression::sum(arrival),
                1.0,
            ));
        }
    }

    /// Next-step indicators that continue an occupancy of `cell`: each
    /// manoeuvre class at its clamped level, in the four clamped horizontal
    /// directions.
    fn successors(&mut self, time: usize, aircraft: usize, cell: Cell) -> Vec<VariableId> {
        let mut next = Vec::with_capacity(12);
        for maneuver in Maneuver::ALL {
            let level = self.grid.vertical_neighbor(cell, maneuver);
            for neighbour in self.grid.horizontal_neighbors(level) {
                next.push(self.q(time + 1, aircraft, neighbour, maneuver));
            }
        }
        next
    }

    fn reachability(&mut self) {
        let cells = self.cells();
        let plans = self.aircraft;
        for time in 0..self.horizon.saturating_sub(1) {
            for (aircraft, plan) in plans.iter().enumerate() {
                for &cell in &cells {
                    let current = self.occupancy(time, aircraft, cell);
                    if cell == plan.destination {
                        let hold = self.q(time + 1, aircraft, cell, Maneuver::Level);
                        let lhs = Expression::sum(current).with_term(hold, -1.0);
                        self.builder.constrain(Constraint::le(
                            ConstraintLabel::HoldAtDestination { time, aircraft },
                            lhs,
                            0.0,
                        ));
                        continue;
                    }
                    let mut lhs = Expression::sum(self.successors(time, aircraft, cell));
                    for id in current {
                        lhs.add_term(id, -1.0);
                    }
                    self.builder.constrain(Constraint::ge(
                        ConstraintLabel::Reachability {
                            time,
                            aircraft,
                            cell,
                        },
                        lhs,
                        0.0,
                    ));
                }
            }
        }
    }

    fn no_collision(&mut self) {
        let cells = self.cells();
        let count = self.aircraft.len();
        for time in 0..self.horizon {
            for &cell in &cells {
                for first in 0..count {
                    for second in (first + 1)..count {
                        let lhs = Expression::sum(
                            self.occupancy(time, first, cell)
                                .into_iter()
                                .chain(self.occupancy(time, second, cell)),
                        );
                        self.builder.constrain(Constraint::le(
                            ConstraintLabel::NoCollision {
                                time,
                                cell,
                                first,
                                second,
                            },
                            lhs,
                            1.0,
                        ));
                    }
                }
            }
        }
    }

    /// Limits what may follow a descend or climb indicator. Levels past the
    /// vertical extent have no constraint.
    fn flight_level_changes(&mut self) {
        let cells = self.cells();
        for time in 0..self.horizon.saturating_sub(1) {
            for aircraft in 0..self.aircraft.len() {
                for &cell in &cells {
                    for next in Maneuver::ALL {
                        let mut targets = vec![(Maneuver::Descend, cell.z)];
                        if !self.grid.is_top_level(cell.z) {
                            targets.push((Maneuver::Descend, cell.z + 1));
                        }
                        targets.push((Maneuver::Climb, cell.z));
                        if cell.z != 0 {
                            targets.push((Maneuver::Climb, cell.z - 1));
                        }
                        for (current, next_z) in targets {
                            self.flight_level_change(time, aircraft, cell, current, next_z, next);
                        }
                    }
                }
            }
        }
    }

    fn flight_level_change(
        &mut self,
        time: usize,
        aircraft: usize,
        cell: Cell,
        current: Maneuver,
        next_z: usize,
        next: Maneuver,
    ) {
        let origin = self.q(time, aircraft, cell, current);
        let mut lhs = Expression::sum([origin]);
        let level = Cell::new(cell.x, cell.y, next_z);
        // Clamping repeats a cell at the grid edge. Each indicator counts once
        // here, where summing the clamped list would weight the repeat twice.
        let neighbours: BTreeSet<Cell> = self.grid.horizontal_neighbors(level).into();
        for neighbour in neighbours {
            let id = self.q(time + 1, aircraft, neighbour, next);
            lhs.add_term(id, 1.0);
        }
        self.builder.constrain(Constraint::le(
            ConstraintLabel::FlightLevelChange {
                time,
                aircraft,
                cell,
                current,
                next_z,
                next,
            },
            lhs,
            1.0,
        ));
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "coefficients are scaled integers well inside f64 precision"
    )]
    fn objective(&mut self, cost: &dyn DenseCellCost, reward: i64) -> Result<(), BuildError> {
        let cells = self.cells();
        let mut weights = Vec::with_capacity(cells.len());
        for &cell in &cells {
            let mut row = [0_i64; 3];
            for (slot, maneuver) in row.iter_mut().zip(Maneuver::ALL) {
                *slot = cost.coefficient(cell, maneuver)?;
            }
            weights.push((cell, row));
        }

        let last = self.horizon - 1;
        let plans = self.aircraft;
        let mut objective = Expression::new();
        for time in 0..self.horizon {
            for (aircraft, plan) in plans.iter().enumerate() {
                for &(cell, row) in &weights {
                    if cell == plan.destination {
                        continue;
                    }
                    for (maneuver, weight) in Maneuver::ALL.into_iter().zip(row) {
                        if weight != 0 {
                            let id = self.q(time, aircraft, cell, maneuver);
                            objective.add_term(id, weight as f64);
                        }
                    }
                }
            }
        }
        for (aircraft, plan) in plans.iter().enumerate() {
            let arrived = self.q(last, aircraft, plan.destination, Maneuver::Level);
            objective.add_term(arrived, -(reward as f64));
        }
        self.builder.set_objective(objective);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::UniformCellCost;
    use crate::model::ConstraintKind;
    use rstest::{fixture, rstest};

    fn aircraft(flight: u32, start: Cell, destination: Cell) -> DenseAircraft {
        DenseAircraft {
            flight: FlightNumber(flight),
            start,
            destination,
        }
    }

    #[fixture]
    fn problem() -> DenseProblem<'static> {
        DenseProblem {
            grid: RegularGrid::new(3, 3, 2).expect("valid grid"),
            aircraft: vec![
                aircraft(1, Cell::new(0, 0, 0), Cell::new(2, 2, 1)),
                aircraft(2, Cell::new(2, 0, 0), Cell::new(0, 2, 0)),
            ],
            cost: &UniformCellCost(3),
        }
    }

    #[rstest]
    fn plane_conservation_per_step_and_aircraft(problem: DenseProblem<'static>) {
        let config = DenseConfig {
            horizon: 4,
            destination_reward: 10,
        };
        let model = build_dense(&config, &problem).expect("valid problem");
        let conservation: Vec<&Constraint> = model
            .constraints_of(ConstraintKind::PlaneConservation)
            .collect();
        assert_eq!(conservation.len(), 4 * 2);
        assert!(conservation.iter().all(|c| c.rhs == 1.0 && c.sense == crate::model::Sense::Eq));
        assert_eq!(model.variable_count(), 4 * 2 * 18 * 3);
    }

    #[rstest]
    fn constraint_families_have_expected_sizes(problem: DenseProblem<'static>) {
        let config = DenseConfig {
            horizon: 3,
            destination_reward: 10,
        };
        let model = build_dense(&config, &problem).expect("valid problem");
        let counts = model.constraint_counts();
        let count = |kind| counts.get(&kind).copied().unwrap_or_default();
        assert_eq!(count(ConstraintKind::Start), 2);
        assert_eq!(count(ConstraintKind::Terminal), 2);
        // Two transitions, two aircraft, one destination cell each.
        assert_eq!(count(ConstraintKind::HoldAtDestination), 2 * 2);
        assert_eq!(count(ConstraintKind::Reachability), 2 * 2 * 17);
        assert_eq!(count(ConstraintKind::NoCollision), 3 * 18);
        // Two levels: the ground level drops the climb-down term, the top level
        // drops the descend-up term.
        assert_eq!(count(ConstraintKind::FlightLevelChange), 2 * 2 * 9 * 3 * 3 * 2);
    }

    #[rstest]
    fn corner_level_changes_count_each_neighbour_once(problem: DenseProblem<'static>) {
        let config = DenseConfig {
            horizon: 2,
            destination_reward: 10,
        };
        let model = build_dense(&config, &problem).expect("valid problem");
        let corner = ConstraintLabel::FlightLevelChange {
            time: 0,
            aircraft: 0,
            cell: Cell::new(0, 0, 0),
            current: Maneuver::Descend,
            next_z: 0,
            next: Maneuver::Level,
        };
        let constraint = model
            .constraints_of(ConstraintKind::FlightLevelChange)
            .find(|constraint| constraint.label == corner)
            .expect("corner constraint emitted");
        // The origin plus (0, 0), (1, 0) and (0, 1); the two clamped
        // directions both land on (0, 0).
        let coefficients: Vec<f64> = constraint
            .lhs
            .linear_terms()
            .map(|(_, coefficient)| coefficient)
            .collect();
        assert_eq!(coefficients, vec![1.0; 4]);
    }

    #[rstest]
    fn objective_rewards_arrival(problem: DenseProblem<'static>) {
        let config = DenseConfig {
            horizon: 2,
            destination_reward: 50,
        };
        let model = build_dense(&config, &problem).expect("valid problem");
        let reward = model
            .registry()
            .id(&OccupancyKey {
                time: 1,
                aircraft: 0,
                cell: Cell::new(2, 2, 1),
                maneuver: Maneuver::Level,
            }
            .into())
            .expect("declared");
        let coefficient = model
            .objective()
            .linear_terms()
            .find(|(id, _)| *id == reward)
            .map(|(_, coefficient)| coefficient);
        assert_eq!(coefficient, Some(-50.0));
    }

    #[rstest]
    fn rejects_empty_horizon(problem: DenseProblem<'static>) {
        let config = DenseConfig {
            horizon: 0,
            destination_reward: 0,
        };
        assert_eq!(
            build_dense(&config, &problem),
            Err(BuildError::EmptyHorizon)
        );
    }

    #[rstest]
    fn rejects_out_of_bounds_cells(mut problem: DenseProblem<'static>) {
        problem.aircraft.push(aircraft(3, Cell::new(0, 0, 0), Cell::new(3, 0, 0)));
        let err = build_dense(&DenseConfig::default(), &problem).expect_err("outside grid");
        assert_eq!(
            err,
            BuildError::CellOutOfBounds {
                flight: FlightNumber(3),
                cell: Cell::new(3, 0, 0)
            }
        );
    }

    #[rstest]
    fn rejects_duplicate_flights(mut problem: DenseProblem<'static>) {
        problem.aircraft.push(aircraft(1, Cell::new(1, 1, 0), Cell::new(1, 2, 0)));
        let err = build_dense(&DenseConfig::default(), &problem).expect_err("duplicate");
        assert!(matches!(err, BuildError::Flight(_)));
    }
}
