//! Common utilities and shared components for the tracker.
//!
//! This module contains the assignment solvers, box geometry, the Kalman
//! motion model, numerical constants and the synthetic scenario generator.

pub mod association;
pub mod bbox;
pub mod constants;
pub mod linalg;
pub mod scenario;
