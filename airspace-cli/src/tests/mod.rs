//! Shared test harness modules for the airspace CLI.

use super::*;

mod build_steps;
mod build_unit;
mod helpers;
mod solve_steps;
