//! Analytics derived from a fresh quote set
//!
//! - **strength**: per-currency strength index over the pair changes
//! - **matrix**: full cross-rate matrix with inferred inverse cells
//!
//! Both operate on currency pairs only; the commodity quote never enters.

pub mod matrix;
pub mod strength;

pub use matrix::build_matrix;
pub use strength::{calculate_strength, raw_strengths};
