use super::load_network;
use crate::cli::FormatArgs;
use crate::error::{CliError, Result};
use pnsynth::core::io::{pns::PnsFile, traits::ProblemFile};
use tracing::info;

pub fn run(args: FormatArgs) -> Result<()> {
    let network = load_network(&args.input)?;

    match &args.output {
        Some(path) => {
            info!("Writing canonical definition to {:?}", path);
            PnsFile::write_to_path(&network, path).map_err(|source| CliError::Definition {
                path: path.clone(),
                source,
            })?;
            println!("Canonical definition written to: {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            PnsFile::write_to(&network, &mut stdout).map_err(|source| {
                CliError::Definition {
                    path: args.input.clone(),
                    source,
                }
            })?;
        }
    }
    Ok(())
}
