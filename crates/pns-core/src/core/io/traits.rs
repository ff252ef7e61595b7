use crate::core::models::network::ProcessNetwork;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading and writing problem-definition formats.
///
/// Implementors handle format-specific parsing and serialization; the path-based
/// helpers are provided on top of the reader/writer methods.
pub trait ProblemFile {
    /// The error type for I/O operations.
    type Error: Error + From<io::Error>;

    /// Reads a process network from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails, a reference cannot be resolved, or I/O
    /// operations encounter issues.
    fn read_from(reader: &mut impl BufRead) -> Result<ProcessNetwork, Self::Error>;

    /// Writes a process network to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_to(network: &ProcessNetwork, writer: &mut impl Write) -> Result<(), Self::Error>;

    /// Reads a process network from a file path.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<ProcessNetwork, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    /// Parses a process network held in memory.
    fn read_from_str(content: &str) -> Result<ProcessNetwork, Self::Error> {
        let mut reader = content.as_bytes();
        Self::read_from(&mut reader)
    }

    /// Writes a process network to a file path.
    fn write_to_path<P: AsRef<Path>>(
        network: &ProcessNetwork,
        path: P,
    ) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(network, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
