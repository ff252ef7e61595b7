//! # Workflows Module
//!
//! High-level entry points that drive a complete synthesis run, from a parsed process
//! network to a finished branch-and-bound tree, together with plain-text reporting of
//! the result.
//!
//! - **Solve Workflow** ([`solve`]) - validates the network, configures the relaxation
//!   backend and runs the search.
//! - **Reporting** ([`report`]) - node descriptions, the objective breakdown of the best
//!   solution and an indented outline of the tree.

pub mod report;
pub mod solve;
