#![expect(
    clippy::expect_used,
    reason = "behaviour tests use expect for readable failures"
)]

//! Behavioural tests for the dense occupancy formulation using rstest-bdd.
//!
//! Each scenario builds a small model and evaluates a hand-written
//! assignment against it.

use std::cell::RefCell;

use airspace_core::builder::{DenseAircraft, DenseConfig, DenseProblem, build_dense};
use airspace_core::cost::UniformCellCost;
use airspace_core::model::{Assignment, ConstraintKind, ConstraintLabel, OccupancyKey, VariableKey};
use airspace_core::{Cell, ConstraintModel, FlightNumber, Maneuver, RegularGrid};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

const STEP_COST: i64 = 4;
const REWARD: i64 = 1000;

static FLAT: UniformCellCost = UniformCellCost(STEP_COST);

/// World state for dense model scenarios.
#[derive(Default)]
struct DenseWorld {
    grid: RefCell<Option<RegularGrid>>,
    aircraft: RefCell<Vec<DenseAircraft>>,
    model: RefCell<Option<ConstraintModel>>,
    violated: RefCell<Option<Vec<ConstraintLabel>>>,
    objective: RefCell<Option<f64>>,
}

impl DenseWorld {
    /// Evaluate an assignment given as one cell per aircraft per step, all
    /// level.
    fn fly(&self, routes: &[Vec<Cell>]) {
        let borrowed = self.model.borrow();
        let model = borrowed.as_ref().expect("model should be built");
        let keys = routes.iter().enumerate().flat_map(|(aircraft, cells)| {
            cells.iter().enumerate().map(move |(time, &cell)| {
                VariableKey::from(OccupancyKey {
                    time,
                    aircraft,
                    cell,
                    maneuver: Maneuver::Level,
                })
            })
        });
        let assignment = Assignment::from_keys(model.registry(), keys).expect("declared keys");
        let evaluation = model.evaluate(&assignment).expect("own handles");
        self.objective.replace(Some(evaluation.objective));
        self.violated.replace(Some(evaluation.violated));
    }

    fn violated(&self) -> Vec<ConstraintLabel> {
        self.violated
            .borrow()
            .clone()
            .expect("an assignment should be evaluated")
    }
}

#[fixture]
fn world() -> DenseWorld {
    DenseWorld::default()
}

fn aircraft(flight: u32, start: Cell, destination: Cell) -> DenseAircraft {
    DenseAircraft {
        flight: FlightNumber(flight),
        start,
        destination,
    }
}

/// `+x` three times then `+y` four times, holding at (3, 4, 0) until `horizon`.
fn manhattan(horizon: usize) -> Vec<Cell> {
    let legs = [
        Cell::new(0, 0, 0),
        Cell::new(1, 0, 0),
        Cell::new(2, 0, 0),
        Cell::new(3, 0, 0),
        Cell::new(3, 1, 0),
        Cell::new(3, 2, 0),
        Cell::new(3, 3, 0),
    ];
    let destination = Cell::new(3, 4, 0);
    (0..horizon)
        .map(|time| legs.get(time).copied().unwrap_or(destination))
        .collect()
}

#[given("a 5 by 5 by 1 grid with one aircraft flying from 0,0,0 to 3,4,0")]
fn given_single_aircraft(world: &DenseWorld) {
    world
        .grid
        .replace(Some(RegularGrid::new(5, 5, 1).expect("valid grid")));
    world.aircraft.replace(vec![aircraft(
        1,
        Cell::new(0, 0, 0),
        Cell::new(3, 4, 0),
    )]);
}

#[given("a 3 by 1 by 1 grid with two aircraft swapping ends")]
fn given_crossing_aircraft(world: &DenseWorld) {
    world
        .grid
        .replace(Some(RegularGrid::new(3, 1, 1).expect("valid grid")));
    world.aircraft.replace(vec![
        aircraft(1, Cell::new(0, 0, 0), Cell::new(2, 0, 0)),
        aircraft(2, Cell::new(2, 0, 0), Cell::new(0, 0, 0)),
    ]);
}

#[when("the dense model is built over {horizon} steps")]
fn when_built(world: &DenseWorld, horizon: usize) {
    let problem = DenseProblem {
        grid: world.grid.borrow().expect("grid should be chosen"),
        aircraft: world.aircraft.borrow().clone(),
        cost: &FLAT,
    };
    let config = DenseConfig {
        horizon,
        destination_reward: REWARD,
    };
    let model = build_dense(&config, &problem).expect("problem should build");
    world.model.replace(Some(model));
}

#[when("the aircraft follows the Manhattan path")]
fn when_manhattan(world: &DenseWorld) {
    world.fly(&[manhattan(20)]);
}

#[when("the aircraft jumps straight to its destination")]
fn when_jumps(world: &DenseWorld) {
    let mut route = vec![Cell::new(3, 4, 0); 20];
    if let Some(first) = route.first_mut() {
        *first = Cell::new(0, 0, 0);
    }
    world.fly(&[route]);
}

#[when("the aircraft cuts the corner from 2,0,0 to 3,1,0")]
fn when_cuts_corner(world: &DenseWorld) {
    let mut route = manhattan(20);
    route.remove(3);
    route.push(Cell::new(3, 4, 0));
    world.fly(&[route]);
}

#[when("the aircraft steps away from its destination after arriving")]
fn when_leaves(world: &DenseWorld) {
    let mut route = manhattan(20);
    if let Some(cell) = route.get_mut(8) {
        *cell = Cell::new(3, 3, 0);
    }
    world.fly(&[route]);
}

#[when("both aircraft fly straight through the middle cell")]
fn when_cross(world: &DenseWorld) {
    world.fly(&[
        vec![Cell::new(0, 0, 0), Cell::new(1, 0, 0), Cell::new(2, 0, 0)],
        vec![Cell::new(2, 0, 0), Cell::new(1, 0, 0), Cell::new(0, 0, 0)],
    ]);
}

#[then("the assignment is feasible")]
fn then_feasible(world: &DenseWorld) {
    let violated = world.violated();
    assert!(violated.is_empty(), "unexpected violations: {violated:?}");
}

#[then("the objective is seven flat steps minus the arrival reward")]
#[expect(clippy::float_cmp, reason = "objective is a sum of small integers")]
#[expect(clippy::cast_precision_loss, reason = "small integer constants")]
fn then_objective(world: &DenseWorld) {
    let objective = world.objective.borrow().expect("objective should be recorded");
    assert_eq!(objective, (7 * STEP_COST - REWARD) as f64);
}

#[then("reachability from cell 2,0,0 at step 2 is violated")]
fn then_corner_unreachable(world: &DenseWorld) {
    let violated = world.violated();
    assert!(
        violated.contains(&ConstraintLabel::Reachability {
            time: 2,
            aircraft: 0,
            cell: Cell::new(2, 0, 0),
        }),
        "expected the corner cut in {violated:?}"
    );
}

#[then("the objective is six flat steps minus the arrival reward")]
#[expect(clippy::float_cmp, reason = "objective is a sum of small integers")]
#[expect(clippy::cast_precision_loss, reason = "small integer constants")]
fn then_shortcut_objective(world: &DenseWorld) {
    let objective = world.objective.borrow().expect("objective should be recorded");
    assert_eq!(objective, (6 * STEP_COST - REWARD) as f64);
}

#[then("a reachability constraint is violated")]
fn then_unreachable(world: &DenseWorld) {
    let violated = world.violated();
    assert!(
        violated
            .iter()
            .any(|label| label.kind() == ConstraintKind::Reachability),
        "expected a reachability violation in {violated:?}"
    );
}

#[then("a hold-at-destination constraint is violated")]
fn then_left_destination(world: &DenseWorld) {
    let violated = world.violated();
    assert!(violated.contains(&ConstraintLabel::HoldAtDestination {
        time: 7,
        aircraft: 0
    }));
}

#[then("the no-collision constraint for the middle cell at step 1 is violated")]
fn then_collision(world: &DenseWorld) {
    let collision = ConstraintLabel::NoCollision {
        time: 1,
        cell: Cell::new(1, 0, 0),
        first: 0,
        second: 1,
    };
    let borrowed = world.model.borrow();
    let model = borrowed.as_ref().expect("model should be built");
    assert!(
        model
            .constraints_of(ConstraintKind::NoCollision)
            .any(|constraint| constraint.label == collision)
    );
    assert_eq!(world.violated(), vec![collision]);
}

#[scenario(path = "tests/features/dense_model.feature", index = 0)]
fn manhattan_path(world: DenseWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/dense_model.feature", index = 1)]
fn jump_is_unreachable(world: DenseWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/dense_model.feature", index = 2)]
fn corner_cut_is_unreachable(world: DenseWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/dense_model.feature", index = 3)]
fn hold_at_destination(world: DenseWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/dense_model.feature", index = 4)]
fn crossing_aircraft(world: DenseWorld) {
    let _ = world;
}
