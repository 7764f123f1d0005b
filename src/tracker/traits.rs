//! Trait seams of the tracker
//!
//! The engine is generic over how a gated cost matrix is turned into a set
//! of matches. Implementations:
//! - [`HungarianAssigner`] - optimal minimum-cost matching (default)
//! - [`GreedyAssigner`] - lowest-cost-first, for comparison

use ndarray::Array2;

use crate::common::association::greedy::greedy;
use crate::common::association::hungarian::{hungarian, HungarianResult};

/// Assignment solver over a track x observation cost matrix
///
/// Entries equal to `f64::INFINITY` are non-edges and must never appear in
/// the returned assignment.
pub trait Assigner: Send + Sync {
    /// Solve the assignment
    ///
    /// # Arguments
    /// * `cost` - Cost matrix, rows are tracks and columns observations
    ///
    /// # Returns
    /// Matched `(row, col)` pairs sorted by row, with their total cost
    fn assign(&self, cost: &Array2<f64>) -> HungarianResult;

    /// Get algorithm name
    fn name(&self) -> &'static str;
}

/// Optimal assignment via the Hungarian algorithm
#[derive(Debug, Clone, Copy, Default)]
pub struct HungarianAssigner;

impl HungarianAssigner {
    pub fn new() -> Self {
        Self
    }
}

impl Assigner for HungarianAssigner {
    fn assign(&self, cost: &Array2<f64>) -> HungarianResult {
        hungarian(cost)
    }

    fn name(&self) -> &'static str {
        "Hungarian"
    }
}

/// Greedy cheapest-pair-first assignment
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyAssigner;

impl GreedyAssigner {
    pub fn new() -> Self {
        Self
    }
}

impl Assigner for GreedyAssigner {
    fn assign(&self, cost: &Array2<f64>) -> HungarianResult {
        greedy(cost)
    }

    fn name(&self) -> &'static str {
        "Greedy"
    }
}
