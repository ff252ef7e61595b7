//! # PNSynth Core Library
//!
//! A library for Process Network Synthesis (PNS): choosing the cost-minimal set of
//! operating units, and the flows through them, that turns raw materials into the
//! required amounts of product.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Material`, `OperatingUnit`,
//!   `ProcessNetwork`) and the problem-definition text format.
//!
//! - **[`engine`]: The Logic Core.** Translates a network into a linear model, solves its
//!   relaxation through a pluggable [`engine::solver::RelaxationSolver`], and drives the
//!   branch-and-bound search that materializes the full decision tree.
//!
//! - **[`workflows`]: The Public API.** Ties `core` and `engine` together into a single
//!   `solve` call and renders the resulting tree as plain-text reports.

pub mod core;
pub mod engine;
pub mod workflows;
