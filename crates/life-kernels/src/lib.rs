//! Domain recipes built on top of the `life` raster algebra engine:
//! Area-of-Habitat, persistence delta, land-use scenario construction,
//! species richness/endemism, and (optionally) H3 aggregation.

pub mod aoh;
pub mod crosswalk;
pub mod deltap;
pub mod error;
#[cfg(feature = "h3")]
pub mod h3agg;
pub mod richness;
pub mod scenario;
pub mod species_batch;

pub use error::{Error, Result};
