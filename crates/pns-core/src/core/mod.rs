//! # Core Module
//!
//! The fundamental building blocks of a process network synthesis problem.
//!
//! - **Network Representation** ([`models`]) - Materials, operating units and the
//!   material-flow graph connecting them.
//! - **File I/O** ([`io`]) - Reading and writing the problem-definition text format.

pub mod io;
pub mod models;
