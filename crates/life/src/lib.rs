//! Lazy, windowed raster algebra over geospatial layers: the engine
//! that `life-kernels`' domain recipes (Area-of-Habitat, persistence
//! delta, species richness, scenario construction) are built on top of.

pub mod error;
pub mod eval;
pub mod geo;
pub mod graph;
pub mod layer;
pub mod stage;

pub use error::{Error, Result};
pub use eval::{resolve, save, sum, AreaMode, Sink};
pub use geo::{Area, HasExtent, PixelScale, Window};
pub use graph::Node;
pub use layer::{ConstantLayer, DataType, FileLayer, Layer, LayerSource, RescaledLayer, UniformAreaRowLayer, VectorRangeLayer};

#[cfg(feature = "h3")]
pub use layer::H3CellLayer;
