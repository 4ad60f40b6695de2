//! H3 hexagonal aggregation: summarizes a per-pixel expression (AoH,
//! persistence delta, richness) into one value per H3 cell, written out
//! as Parquet for downstream analysis tooling.
//!
//! There is no direct counterpart for this in the reference
//! implementation (it works entirely in raster space); this module is
//! a supplementary feature grounded on the reference pack's H3
//! raster-conversion patterns (`other_examples/`), built on `h3o`
//! rather than the legacy `h3`/`h3ron` bindings per the resolution
//! recorded in DESIGN.md.

use std::path::Path;
use std::sync::Arc;

use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType as ArrowDataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use h3o::{CellIndex, Resolution};
use parquet::arrow::ArrowWriter;
use parquet::file::metadata::KeyValue;
use parquet::file::properties::WriterProperties;

use life::graph::Node;
use life::layer::{H3CellLayer, LayerSource};
use life::{resolve, sum, AreaMode, PixelScale};

use crate::error::Result;

/// One H3 cell's aggregated value, ready to be written to Parquet.
#[derive(Debug, Clone)]
pub struct CellAggregate {
    pub cell: CellIndex,
    pub value: f64,
}

/// Aggregates `expression` (already composed, e.g. an AoH expression
/// from `crate::aoh::aoh_expression`) over every cell of `resolution`
/// that intersects `base_area`, by masking the expression with an
/// `H3CellLayer` per cell and summing.
///
/// A cell that straddles +/-180 degrees reports boundary vertices on
/// both sides of the seam, which would make its naive envelope span
/// nearly the whole globe. Such a cell is instead rasterized as the
/// union of a west-of-seam and an east-of-seam band (see
/// `H3CellLayer::antimeridian_bands`), each a well-formed area; if the
/// cell reaches further than the configured band width from the seam,
/// rasterization falls back to `H3CellLayer::new`'s single envelope
/// pass, per spec.md section 9's open-question resolution.
pub fn aggregate(expression: &Node, cells: &[CellIndex], scale: PixelScale) -> Result<Vec<CellAggregate>> {
    let mut out = Vec::with_capacity(cells.len());
    for &cell in cells {
        let mask = cell_mask(cell, scale)?;
        let masked = expression.clone().mul_layer(mask);
        let (_area, cols, rows) = resolve(&masked, AreaMode::Intersection)?;
        let value = sum(&masked, cols, rows)?;
        out.push(CellAggregate { cell, value });
    }
    Ok(out)
}

/// Builds the mask `aggregate` multiplies `expression` by for one cell,
/// banding the rasterization near the antimeridian when needed.
fn cell_mask(cell: CellIndex, scale: PixelScale) -> Result<Node> {
    if H3CellLayer::straddles_antimeridian(cell) {
        if let Some((west, east)) = H3CellLayer::antimeridian_bands(cell) {
            if let (Ok(west_layer), Ok(east_layer)) = (H3CellLayer::new_banded(cell, scale, west), H3CellLayer::new_banded(cell, scale, east)) {
                let west_mask = Node::leaf(LayerSource::H3Cell(west_layer));
                let east_mask = Node::leaf(LayerSource::H3Cell(east_layer));
                return Ok(west_mask.or(east_mask));
            }
        }
    }
    Ok(Node::leaf(LayerSource::H3Cell(H3CellLayer::new(cell, scale)?)))
}

/// Every resolution-`resolution` cell whose center falls within
/// `base_area`, used to build the list `aggregate` iterates.
pub fn cells_within(base_area: life::Area, resolution: Resolution) -> Vec<CellIndex> {
    // `h3o` has no direct "cells within a lat/lon box" query; instead we
    // walk every cell reachable from a coarse covering and filter by
    // center point, which is adequate for the regional extents this
    // aggregation is run against (a whole-globe run should instead drive
    // `CellIndex::base_cells()` and recurse, left as a follow-up).
    let mut out = Vec::new();
    for base in CellIndex::base_cells() {
        for cell in base.children(resolution) {
            let Some(vertex) = cell.boundary().iter().next() else { continue };
            let lng = vertex.lng();
            let lat = vertex.lat();
            if lng >= base_area.left && lng <= base_area.right && lat <= base_area.top && lat >= base_area.bottom {
                out.push(cell);
            }
        }
    }
    out
}

/// Provenance recorded alongside an H3-aggregation Parquet file, so a
/// downstream consumer can tell which species/source/run it came from
/// without re-deriving it from the file path.
#[derive(Debug, Clone)]
pub struct RunMetadata {
    pub species: String,
    pub source: String,
    pub timestamp: String,
    pub host: String,
    pub commit: String,
}

/// Writes a list of cell aggregates to a Parquet file with columns
/// `h3_cell` (string, the cell's canonical hex representation) and
/// `value` (float64), carrying `metadata` as file-level key/value
/// metadata per spec section 6.
pub fn write_parquet(aggregates: &[CellAggregate], metadata: &RunMetadata, path: impl AsRef<Path>) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![Field::new("h3_cell", ArrowDataType::Utf8, false), Field::new("value", ArrowDataType::Float64, false)]));

    let cells: Vec<String> = aggregates.iter().map(|a| a.cell.to_string()).collect();
    let values: Vec<f64> = aggregates.iter().map(|a| a.value).collect();

    let batch = RecordBatch::try_new(schema.clone(), vec![Arc::new(StringArray::from(cells)), Arc::new(Float64Array::from(values))]).map_err(|e| life::Error::InvalidArgument(e.to_string()))?;

    let key_value_metadata = vec![
        KeyValue::new("species".to_string(), metadata.species.clone()),
        KeyValue::new("source".to_string(), metadata.source.clone()),
        KeyValue::new("timestamp".to_string(), metadata.timestamp.clone()),
        KeyValue::new("host".to_string(), metadata.host.clone()),
        KeyValue::new("commit".to_string(), metadata.commit.clone()),
    ];

    let file = std::fs::File::create(path).map_err(life::Error::Io)?;
    let props = WriterProperties::builder().set_key_value_metadata(Some(key_value_metadata)).build();
    let mut writer = ArrowWriter::try_new(file, schema, Some(props)).map_err(|e| life::Error::InvalidArgument(e.to_string()))?;
    writer.write(&batch).map_err(|e| life::Error::InvalidArgument(e.to_string()))?;
    writer.close().map_err(|e| life::Error::InvalidArgument(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_aggregate_carries_its_own_identity() {
        let cell = CellIndex::try_from(0x8a1fb46622dffffu64).unwrap();
        let aggregate = CellAggregate { cell, value: 42.0 };
        assert_eq!(aggregate.value, 42.0);
        assert_eq!(aggregate.cell, cell);
    }
}
