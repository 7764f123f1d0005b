//! Shared test helpers
//!
//! Detection builders and snapshot assertions used across the integration
//! test files.

#![allow(dead_code)]

pub mod assertions;
pub mod fixtures;
