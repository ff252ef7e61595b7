//! # Engine Module
//!
//! The branch-and-bound engine: it turns a [`ProcessNetwork`](crate::core::models::network::ProcessNetwork)
//! into per-node linear relaxations, hands them to a solver backend and grows the full
//! decision tree from the answers.
//!
//! ## Architecture
//!
//! - **Model Building** ([`model`]) - variables, objective and constraints of one node
//! - **Solver Backends** ([`solver`]) - the [`solver::RelaxationSolver`] seam and the `microlp` backend
//! - **Search** ([`search`]) - sequential and parallel tree construction with incumbent tracking
//! - **State** ([`state`]) - nodes, solution statuses and the finished tree
//! - **Configuration** ([`config`]) - search strategy, integrality handling and tolerances
//! - **Progress Monitoring** ([`progress`]) - callback-based progress events
//! - **Error Handling** ([`error`]) - engine-level error types

pub mod config;
pub mod error;
pub mod model;
pub mod progress;
pub mod search;
pub mod solver;
pub mod state;
