pub mod check;
pub mod format;
pub mod solve;

use crate::error::{CliError, Result};
use pnsynth::core::io::{pns::PnsFile, traits::ProblemFile};
use pnsynth::core::models::network::ProcessNetwork;
use std::path::Path;
use tracing::info;

/// Reads and validates a problem definition, attaching the path to any failure.
pub fn load_network(path: &Path) -> Result<ProcessNetwork> {
    info!("Loading problem definition from {:?}", path);
    PnsFile::read_from_path(path).map_err(|source| CliError::Definition {
        path: path.to_path_buf(),
        source,
    })
}
