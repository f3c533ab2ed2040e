//! Cross-crate integration tests.

pub mod authenticated_flow;
pub mod convergence;
pub mod scenarios;
