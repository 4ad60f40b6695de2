//! The tiled evaluator: resolves a graph's working area across its
//! leaves, then streams it row-block by row-block for a reduction
//! (`sum`) or a parallel write (`save`).
//!
//! Grounded on `persistence/__init__.py::_calculate`'s `ystep` loop
//! (`for yoffset in range(0, layer.window.ysize, ystep)`) and
//! `RasterLayer.parallel_save`'s worker-pool write-back.

use std::rc::Rc;

use log::debug;
use rayon::prelude::*;

use crate::error::Result;
use crate::geo::Area;
use crate::graph::Node;
use crate::layer::{DataType, Layer};

/// How the working area of a multi-layer expression is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaMode {
    /// The overlap of every input layer's footprint (the default for
    /// most recipes, e.g. AoH).
    Intersection,
    /// The bounding union of every input layer's footprint, with reads
    /// outside an individual layer's own extent synthesizing zero (used
    /// when compositing rasters of differing coverage).
    Union,
}

/// Default row-block height for streaming reads, matching the
/// reference implementation's typical `ystep` of a few hundred rows.
pub const DEFAULT_BLOCK_ROWS: i64 = 512;

/// Restricts every leaf reachable from `node` to `node`'s resolved
/// working area and returns that area together with its pixel
/// dimensions at the graph's common pixel scale.
///
/// Deduplicates leaves that are shared by more than one path in the
/// graph (e.g. a `Computed` node consumed twice) so their window is
/// only set once.
pub fn resolve(node: &Node, mode: AreaMode) -> Result<(Area, i64, i64)> {
    let leaves = node.leaves();
    let borrowed: Vec<_> = leaves.iter().map(|l| l.borrow()).collect();
    let refs: Vec<&dyn crate::geo::HasExtent> = borrowed.iter().map(|b| &**b as &dyn crate::geo::HasExtent).collect();

    let area = match mode {
        AreaMode::Intersection => crate::geo::intersection(&refs)?,
        AreaMode::Union => crate::geo::union(&refs)?,
    };
    drop(refs);
    drop(borrowed);

    let scale = node
        .pixel_scale()
        .ok_or_else(|| crate::error::Error::InvalidArgument("graph has no pixel-scale-bearing layer".to_string()))?;

    let mut seen = Vec::new();
    for leaf in &leaves {
        if seen.iter().any(|s| Rc::ptr_eq(s, leaf)) {
            continue;
        }
        seen.push(leaf.clone());
        let mut layer = leaf.borrow_mut();
        match mode {
            AreaMode::Intersection => layer.set_window_for_intersection(area)?,
            AreaMode::Union => layer.set_window_for_union(area)?,
        }
    }

    let cols = (area.width() / scale.xstep.abs()).round() as i64;
    let rows = (area.height() / scale.ystep.abs()).round() as i64;
    debug!("resolved working area to {cols}x{rows} pixels ({mode:?})");
    Ok((area, cols, rows))
}

/// Streams `node` row-block by row-block and accumulates the sum of
/// every pixel in double precision, matching `RasterLayer.sum()`'s use
/// of a running `numpy.float64` accumulator rather than per-tile
/// float32 accumulation.
pub fn sum(node: &Node, cols: i64, rows: i64) -> Result<f64> {
    let mut total = 0.0f64;
    let mut yoff = 0;
    while yoff < rows {
        let block_rows = DEFAULT_BLOCK_ROWS.min(rows - yoff);
        let tile = node.read_tile(0, yoff, cols, block_rows)?;
        total += tile.iter().sum::<f64>();
        yoff += block_rows;
    }
    Ok(total)
}

/// A destination a resolved expression can be streamed into.
pub trait Sink: Send + Sync {
    fn write_block(&self, yoff: i64, xsize: i64, ysize: i64, data: &[f64]) -> Result<()>;
}

/// Streams `node` to `sink` using `rayon` to write row-stripes in
/// parallel, mirroring `RasterLayer.parallel_save`'s worker pool: each
/// worker owns a disjoint row range and writes through its own GDAL
/// band handle.
pub fn save(node: &Node, cols: i64, rows: i64, sink: &(impl Sink + ?Sized), datatype: DataType) -> Result<()> {
    let _ = datatype;
    let block_count = rows.div_ceil(DEFAULT_BLOCK_ROWS);
    (0..block_count).into_par_iter().try_for_each(|block_index| -> Result<()> {
        let yoff = block_index * DEFAULT_BLOCK_ROWS;
        let block_rows = DEFAULT_BLOCK_ROWS.min(rows - yoff);
        let tile = node.read_tile(0, yoff, cols, block_rows)?;
        sink.write_block(yoff, cols, block_rows, &tile)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{ConstantLayer, LayerSource};
    use std::sync::Mutex;

    fn constant_node(value: f64) -> Node {
        Node::leaf(LayerSource::Constant(ConstantLayer::new(value)))
    }

    #[test]
    fn sum_accumulates_across_blocks() {
        let node = constant_node(2.0).add_layer(constant_node(3.0));
        let total = sum(&node, 10, 10).unwrap();
        assert_eq!(total, 500.0);
    }

    struct VecSink {
        rows: Mutex<Vec<(i64, Vec<f64>)>>,
    }

    impl Sink for VecSink {
        fn write_block(&self, yoff: i64, _xsize: i64, _ysize: i64, data: &[f64]) -> Result<()> {
            self.rows.lock().unwrap().push((yoff, data.to_vec()));
            Ok(())
        }
    }

    #[test]
    fn save_covers_every_row_block_exactly_once() {
        let node = constant_node(7.0);
        let sink = VecSink { rows: Mutex::new(Vec::new()) };
        save(&node, 4, 1300, &sink, DataType::Float64).unwrap();
        let rows = sink.rows.into_inner().unwrap();
        let total_pixels: usize = rows.iter().map(|(_, d)| d.len()).sum();
        assert_eq!(total_pixels, (4 * 1300) as usize);
        assert!(rows.iter().all(|(_, d)| d.iter().all(|v| *v == 7.0)));
    }
}
