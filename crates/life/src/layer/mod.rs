//! Layer sources: the leaves of the operator graph.

mod constant;
mod file;
#[cfg(feature = "h3")]
mod h3cell;
mod rescaled;
mod uniform_area;
mod vector_range;

pub use constant::ConstantLayer;
pub use file::FileLayer;
#[cfg(feature = "h3")]
pub use h3cell::H3CellLayer;
pub use rescaled::RescaledLayer;
pub use uniform_area::UniformAreaRowLayer;
pub use vector_range::VectorRangeLayer;

use crate::error::Result;
use crate::geo::{Area, HasExtent, PixelScale, Window};

/// A numeric raster value type a layer can read/write. Mirrors the role
/// `geo::ArrayDataType` plays for `crates/geo`'s rasters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Byte,
    Int16,
    Int32,
    Float32,
    Float64,
}

/// A source of pixel data with a known geographic footprint. Implemented
/// by every leaf of the operator graph; see `layer/*.rs` for the
/// concrete sources, each grounded on a counterpart in the reference
/// Python implementation.
pub trait Layer: HasExtent {
    fn projection(&self) -> &str;
    fn datatype(&self) -> DataType;
    /// The window, in this layer's own pixel space, that reads are
    /// currently restricted to. Defaults to the full native raster.
    fn window(&self) -> Window;

    /// Restricts subsequent reads to the portion of this layer that lies
    /// within `area`, which must not exceed this layer's own extent.
    fn set_window_for_intersection(&mut self, area: Area) -> Result<()>;

    /// As `set_window_for_intersection`, but `area` may extend beyond
    /// this layer's own extent; reads outside the original footprint
    /// synthesize the "outside" value (0, or NaN-safe zero for floats).
    fn set_window_for_union(&mut self, area: Area) -> Result<()>;

    /// Resets any window restriction previously applied, returning this
    /// layer to its full native extent.
    fn reset_window(&mut self);

    /// Reads `xsize * ysize` pixels starting at `(x, y)` relative to the
    /// current window, returning them in row-major order.
    fn read_window(&self, x: i64, y: i64, xsize: i64, ysize: i64) -> Result<Vec<f64>>;
}

/// Dynamic dispatch across the concrete layer-source kinds, used as the
/// leaf type of the operator graph (see `graph.rs`). A tagged enum
/// rather than `Box<dyn Layer>` so arithmetic nodes can specialize the
/// common "both operands are files at the same scale" hot path later
/// without downcasting.
pub enum LayerSource {
    File(FileLayer),
    Constant(ConstantLayer),
    UniformAreaRow(UniformAreaRowLayer),
    VectorRange(VectorRangeLayer),
    #[cfg(feature = "h3")]
    H3Cell(H3CellLayer),
    Rescaled(Box<RescaledLayer>),
}

impl HasExtent for LayerSource {
    fn area(&self) -> Area {
        match self {
            LayerSource::File(l) => l.area(),
            LayerSource::Constant(l) => l.area(),
            LayerSource::UniformAreaRow(l) => l.area(),
            LayerSource::VectorRange(l) => l.area(),
            #[cfg(feature = "h3")]
            LayerSource::H3Cell(l) => l.area(),
            LayerSource::Rescaled(l) => l.area(),
        }
    }

    fn pixel_scale(&self) -> Option<PixelScale> {
        match self {
            LayerSource::File(l) => l.pixel_scale(),
            LayerSource::Constant(l) => l.pixel_scale(),
            LayerSource::UniformAreaRow(l) => l.pixel_scale(),
            LayerSource::VectorRange(l) => l.pixel_scale(),
            #[cfg(feature = "h3")]
            LayerSource::H3Cell(l) => l.pixel_scale(),
            LayerSource::Rescaled(l) => l.pixel_scale(),
        }
    }
}

impl Layer for LayerSource {
    fn projection(&self) -> &str {
        match self {
            LayerSource::File(l) => l.projection(),
            LayerSource::Constant(l) => l.projection(),
            LayerSource::UniformAreaRow(l) => l.projection(),
            LayerSource::VectorRange(l) => l.projection(),
            #[cfg(feature = "h3")]
            LayerSource::H3Cell(l) => l.projection(),
            LayerSource::Rescaled(l) => l.projection(),
        }
    }

    fn datatype(&self) -> DataType {
        match self {
            LayerSource::File(l) => l.datatype(),
            LayerSource::Constant(l) => l.datatype(),
            LayerSource::UniformAreaRow(l) => l.datatype(),
            LayerSource::VectorRange(l) => l.datatype(),
            #[cfg(feature = "h3")]
            LayerSource::H3Cell(l) => l.datatype(),
            LayerSource::Rescaled(l) => l.datatype(),
        }
    }

    fn window(&self) -> Window {
        match self {
            LayerSource::File(l) => l.window(),
            LayerSource::Constant(l) => l.window(),
            LayerSource::UniformAreaRow(l) => l.window(),
            LayerSource::VectorRange(l) => l.window(),
            #[cfg(feature = "h3")]
            LayerSource::H3Cell(l) => l.window(),
            LayerSource::Rescaled(l) => l.window(),
        }
    }

    fn set_window_for_intersection(&mut self, area: Area) -> Result<()> {
        match self {
            LayerSource::File(l) => l.set_window_for_intersection(area),
            LayerSource::Constant(l) => l.set_window_for_intersection(area),
            LayerSource::UniformAreaRow(l) => l.set_window_for_intersection(area),
            LayerSource::VectorRange(l) => l.set_window_for_intersection(area),
            #[cfg(feature = "h3")]
            LayerSource::H3Cell(l) => l.set_window_for_intersection(area),
            LayerSource::Rescaled(l) => l.set_window_for_intersection(area),
        }
    }

    fn set_window_for_union(&mut self, area: Area) -> Result<()> {
        match self {
            LayerSource::File(l) => l.set_window_for_union(area),
            LayerSource::Constant(l) => l.set_window_for_union(area),
            LayerSource::UniformAreaRow(l) => l.set_window_for_union(area),
            LayerSource::VectorRange(l) => l.set_window_for_union(area),
            #[cfg(feature = "h3")]
            LayerSource::H3Cell(l) => l.set_window_for_union(area),
            LayerSource::Rescaled(l) => l.set_window_for_union(area),
        }
    }

    fn reset_window(&mut self) {
        match self {
            LayerSource::File(l) => l.reset_window(),
            LayerSource::Constant(l) => l.reset_window(),
            LayerSource::UniformAreaRow(l) => l.reset_window(),
            LayerSource::VectorRange(l) => l.reset_window(),
            #[cfg(feature = "h3")]
            LayerSource::H3Cell(l) => l.reset_window(),
            LayerSource::Rescaled(l) => l.reset_window(),
        }
    }

    fn read_window(&self, x: i64, y: i64, xsize: i64, ysize: i64) -> Result<Vec<f64>> {
        match self {
            LayerSource::File(l) => l.read_window(x, y, xsize, ysize),
            LayerSource::Constant(l) => l.read_window(x, y, xsize, ysize),
            LayerSource::UniformAreaRow(l) => l.read_window(x, y, xsize, ysize),
            LayerSource::VectorRange(l) => l.read_window(x, y, xsize, ysize),
            #[cfg(feature = "h3")]
            LayerSource::H3Cell(l) => l.read_window(x, y, xsize, ysize),
            LayerSource::Rescaled(l) => l.read_window(x, y, xsize, ysize),
        }
    }
}
