//! Exhaustive reference solver for airspace constraint models.
//!
//! This crate provides [`ExhaustiveSolver`], an implementation of the
//! [`Solver`](airspace_core::Solver) trait that enumerates every assignment of
//! a model's binary variables and keeps the cheapest feasible one. It is exact
//! and deterministic, and only practical for models with a couple of dozen
//! variables; its purpose is to check formulations end to end on small
//! instances before a model is handed to an external MIP solver.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod solver;

pub use solver::{ExhaustiveSolver, ExhaustiveSolverConfig};
