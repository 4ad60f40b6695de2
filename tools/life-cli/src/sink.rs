//! A [`life::Sink`] that buffers row-stripes written by
//! `life::save`'s parallel workers and flushes them to a GeoTIFF once
//! the whole raster has been produced.
//!
//! Grounded on `geo::raster::io::write`, the one-shot whole-raster
//! writer `crates/geo` exposes; region-at-a-time writes would need a
//! raw `gdal::raster::RasterBand` handle per worker, which the
//! reference Python implementation gets from GDAL directly but which
//! `crates/geo`'s safe wrapper does not currently expose.

use std::sync::Mutex;

use geo::{GeoReference, GeoTransform, RasterSize};
use life::error::{Error, Result};
use life::Sink;

pub struct GeoTiffSink {
    buffer: Mutex<Vec<f64>>,
    cols: i64,
    meta: GeoReference,
    path: std::path::PathBuf,
}

impl GeoTiffSink {
    pub fn new(path: impl Into<std::path::PathBuf>, projection: &str, left: f64, top: f64, xstep: f64, ystep: f64, cols: i64, rows: i64) -> Self {
        let meta = GeoReference::new(
            projection.to_string(),
            RasterSize::with_rows_cols(geo::Rows(rows as i32), geo::Columns(cols as i32)),
            GeoTransform::new([left, xstep, 0.0, top, 0.0, ystep]),
            Some(0.0),
        );
        GeoTiffSink {
            buffer: Mutex::new(vec![0.0; (cols * rows) as usize]),
            cols,
            meta,
            path: path.into(),
        }
    }

    pub fn finish(self) -> Result<()> {
        let buffer = self.buffer.into_inner().expect("sink mutex is never poisoned");
        geo::raster::io::write(&buffer, &self.meta, &self.path, &[]).map_err(Error::Geo)
    }
}

impl Sink for GeoTiffSink {
    fn write_block(&self, yoff: i64, xsize: i64, ysize: i64, data: &[f64]) -> Result<()> {
        debug_assert_eq!(xsize, self.cols);
        let mut buffer = self.buffer.lock().expect("sink mutex is never poisoned");
        let start = (yoff * self.cols) as usize;
        let end = start + (xsize * ysize) as usize;
        buffer[start..end].copy_from_slice(data);
        Ok(())
    }
}
