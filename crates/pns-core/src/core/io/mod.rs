//! Provides input/output functionality for problem-definition files.
//!
//! A problem definition lists the materials, the operating units and the flows that
//! connect them. The [`traits::ProblemFile`] trait gives every format the same
//! reading/writing API; [`pns`] implements the sectioned text format.

pub mod pns;
pub mod traits;
