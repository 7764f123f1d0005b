//! Assignment solvers over a gated cost matrix
pub mod greedy;
pub mod hungarian;
