//! CLI command implementations.

pub mod common;
pub mod cost;
pub mod expect;
pub mod version;
pub mod vqe;
