//! # Core Models Module
//!
//! Data structures describing a process network.
//!
//! ## Key Components
//!
//! - [`material`] - Materials and their classification (raw, intermediate, product)
//! - [`unit`] - Operating units with capacity and cost parameters
//! - [`network`] - The complete network with its material-flow graph
//! - [`builder`] - Incremental, validating construction of a network
//! - [`ids`] - Stable identifiers for materials
//!
//! ## Usage
//!
//! ```
//! use pnsynth::core::models::builder::ProcessNetworkBuilder;
//! use pnsynth::core::models::material::MaterialType;
//!
//! let mut builder = ProcessNetworkBuilder::new();
//! builder.add_material("A", MaterialType::RawMaterial)?;
//! builder.add_material("C", MaterialType::Product)?;
//! builder.set_lower_bound("C", 4)?;
//! builder.add_unit("U1", 10, 5, 1)?;
//! builder.connect("U1", "A", "C")?;
//! let network = builder.build()?;
//!
//! assert_eq!(network.units().len(), 1);
//! # Ok::<(), pnsynth::core::models::network::NetworkError>(())
//! ```

pub mod builder;
pub mod ids;
pub mod material;
pub mod network;
pub mod unit;
