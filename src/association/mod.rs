//! Data association: gated costs and the two-tier cascade
//!
//! This module provides:
//! - [`cost`] - Gated track/observation cost matrix
//! - [`cascade`] - High tier first, then low tier on leftover tracks
//!
//! The assignment solvers themselves live in [`crate::common::association`].

pub mod cascade;
pub mod cost;

pub use crate::common::association::{greedy, hungarian};

pub use cascade::{run_cascade, CascadeResult, TierMatches};
pub use cost::{build_cost_matrix, pair_cost, INFEASIBLE};
