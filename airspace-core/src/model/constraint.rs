//! Named constraints.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{Assignment, Expression};
use crate::grid::{Cell, Maneuver};
use crate::{FlightNumber, VoxelIndex};

/// Tolerance used when checking a constraint against an assignment.
const FEASIBILITY_TOLERANCE: f64 = 1e-9;

/// Comparison between a constraint's expression and its right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Sense {
    /// `lhs = rhs`
    Eq,
    /// `lhs ≤ rhs`
    Le,
    /// `lhs ≥ rhs`
    Ge,
}

impl Sense {
    /// LP-format operator.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Le => "<=",
            Self::Ge => ">=",
        }
    }
}

/// Family a constraint belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ConstraintKind {
    /// One occupied cell per aircraft and step.
    PlaneConservation,
    /// Aircraft starts level at its start cell.
    Start,
    /// Aircraft ends at its destination.
    Terminal,
    /// Occupancy must continue into a neighbouring cell.
    Reachability,
    /// Occupancy of the destination carries into the next step.
    HoldAtDestination,
    /// No two aircraft share a cell at the same step.
    NoCollision,
    /// Limits manoeuvre combinations between consecutive steps.
    FlightLevelChange,
    /// Exactly one edge leaves the start voxel.
    LeaveStart,
    /// Exactly one edge enters the destination voxel.
    ReachDestination,
    /// A used edge must be followed by another edge.
    Continuation,
}

impl ConstraintKind {
    /// Stable name used in labels and summaries.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::PlaneConservation => "plane_conservation",
            Self::Start => "start",
            Self::Terminal => "terminal",
            Self::Reachability => "reachability",
            Self::HoldAtDestination => "hold_at_destination",
            Self::NoCollision => "no_collision",
            Self::FlightLevelChange => "flight_level_change",
            Self::LeaveStart => "leave_start",
            Self::ReachDestination => "reach_destination",
            Self::Continuation => "continuation",
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Structured identity of a constraint.
///
/// The `Display` form is unique within a model and safe for LP files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[expect(missing_docs, reason = "fields are named after the key they index")]
pub enum ConstraintLabel {
    /// Exactly one indicator set for `aircraft` at `time`.
    PlaneConservation { time: usize, aircraft: usize },
    /// `aircraft` is level at its start cell at step zero.
    Start { aircraft: usize },
    /// `aircraft` is at its destination at the final step.
    Terminal { aircraft: usize },
    /// Occupancy of `cell` at `time` continues at `time + 1`.
    Reachability {
        time: usize,
        aircraft: usize,
        cell: Cell,
    },
    /// Destination occupancy at `time` is capped by the next step.
    HoldAtDestination { time: usize, aircraft: usize },
    /// Aircraft `first` and `second` do not share `cell` at `time`.
    NoCollision {
        time: usize,
        cell: Cell,
        first: usize,
        second: usize,
    },
    /// `current` manoeuvre in `cell` excludes `next` manoeuvres at `next_z`.
    FlightLevelChange {
        time: usize,
        aircraft: usize,
        cell: Cell,
        current: Maneuver,
        next_z: usize,
        next: Maneuver,
    },
    /// One edge leaves the start of `flight`.
    LeaveStart { flight: FlightNumber },
    /// One edge enters the destination of `flight`.
    ReachDestination { flight: FlightNumber },
    /// Edge `from → to` of `flight` is followed by another edge.
    Continuation {
        flight: FlightNumber,
        from: VoxelIndex,
        to: VoxelIndex,
    },
}

impl ConstraintLabel {
    /// Family of this constraint.
    #[must_use]
    pub const fn kind(&self) -> ConstraintKind {
        match self {
            Self::PlaneConservation { .. } => ConstraintKind::PlaneConservation,
            Self::Start { .. } => ConstraintKind::Start,
            Self::Terminal { .. } => ConstraintKind::Terminal,
            Self::Reachability { .. } => ConstraintKind::Reachability,
            Self::HoldAtDestination { .. } => ConstraintKind::HoldAtDestination,
            Self::NoCollision { .. } => ConstraintKind::NoCollision,
            Self::FlightLevelChange { .. } => ConstraintKind::FlightLevelChange,
            Self::LeaveStart { .. } => ConstraintKind::LeaveStart,
            Self::ReachDestination { .. } => ConstraintKind::ReachDestination,
            Self::Continuation { .. } => ConstraintKind::Continuation,
        }
    }
}

impl fmt::Display for ConstraintLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.kind();
        match *self {
            Self::PlaneConservation { time, aircraft }
            | Self::HoldAtDestination { time, aircraft } => {
                write!(f, "{kind}_t{time}_a{aircraft}")
            }
            Self::Start { aircraft } | Self::Terminal { aircraft } => {
                write!(f, "{kind}_a{aircraft}")
            }
            Self::Reachability {
                time,
                aircraft,
                cell,
            } => write!(
                f,
                "{kind}_t{time}_a{aircraft}_x{}_y{}_z{}",
                cell.x, cell.y, cell.z
            ),
            Self::NoCollision {
                time,
                cell,
                first,
                second,
            } => write!(
                f,
                "{kind}_t{time}_x{}_y{}_z{}_a{first}_a{second}",
                cell.x, cell.y, cell.z
            ),
            Self::FlightLevelChange {
                time,
                aircraft,
                cell,
                current,
                next_z,
                next,
            } => write!(
                f,
                "{kind}_t{time}_a{aircraft}_x{}_y{}_z{}_{current}_z{next_z}_{next}",
                cell.x, cell.y, cell.z
            ),
            Self::LeaveStart { flight } | Self::ReachDestination { flight } => {
                write!(f, "{kind}_f{flight}")
            }
            Self::Continuation { flight, from, to } => write!(f, "{kind}_f{flight}_{from}_{to}"),
        }
    }
}

/// `lhs sense rhs`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Constraint {
    /// Identity of the constraint.
    pub label: ConstraintLabel,
    /// Left-hand side.
    pub lhs: Expression,
    /// Comparison.
    pub sense: Sense,
    /// Right-hand side constant.
    pub rhs: f64,
}

impl Constraint {
    /// `lhs = rhs`.
    #[must_use]
    pub const fn eq(label: ConstraintLabel, lhs: Expression, rhs: f64) -> Self {
        Self {
            label,
            lhs,
            sense: Sense::Eq,
            rhs,
        }
    }

    /// `lhs ≤ rhs`.
    #[must_use]
    pub const fn le(label: ConstraintLabel, lhs: Expression, rhs: f64) -> Self {
        Self {
            label,
            lhs,
            sense: Sense::Le,
            rhs,
        }
    }

    /// `lhs ≥ rhs`.
    #[must_use]
    pub const fn ge(label: ConstraintLabel, lhs: Expression, rhs: f64) -> Self {
        Self {
            label,
            lhs,
            sense: Sense::Ge,
            rhs,
        }
    }

    /// Whether `assignment` satisfies the constraint.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "tolerance comparison")]
    pub fn is_satisfied(&self, assignment: &Assignment) -> bool {
        let value = self.lhs.evaluate(assignment);
        match self.sense {
            Sense::Eq => (value - self.rhs).abs() <= FEASIBILITY_TOLERANCE,
            Sense::Le => value <= self.rhs + FEASIBILITY_TOLERANCE,
            Sense::Ge => value + FEASIBILITY_TOLERANCE >= self.rhs,
        }
    }
}
