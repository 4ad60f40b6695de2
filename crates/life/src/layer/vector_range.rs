use std::path::Path;

use gdal::vector::LayerAccess;
use geo::{GeoReference, GeoTransform, RasterSize};

use crate::error::{Error, Result};
use crate::geo::{snap_envelope_to_grid, window_for_area, Area, HasExtent, PixelScale, Window};
use crate::layer::{DataType, Layer};

/// A mask rasterized on the fly from a vector range file filtered by an
/// attribute predicate, e.g. a species' IUCN range polygon restricted
/// to a particular season.
///
/// Grounded on `VectorRangeLayer.__init__` in the reference
/// implementation: scan matching features for their combined envelope,
/// snap it to the target pixel grid, and burn with `ALL_TOUCHED=TRUE`
/// semantics via `geo::vector::algo::rasterize`.
pub struct VectorRangeLayer {
    area: Area,
    scale: PixelScale,
    projection: String,
    data: Vec<u8>,
    cols: i64,
    rows: i64,
    window: Window,
}

impl VectorRangeLayer {
    pub fn open(
        range_vectors: impl AsRef<Path>,
        where_filter: &str,
        scale: PixelScale,
        projection: &str,
    ) -> Result<Self> {
        let dataset = geo::vector::gdalio::dataset::open_read_only(range_vectors.as_ref()).map_err(Error::Geo)?;
        let mut layer = dataset.layer(0).map_err(|e| Error::Geo(e.into()))?;
        layer.set_attribute_filter(where_filter).map_err(|e| Error::Geo(e.into()))?;

        let mut left = f64::MAX;
        let mut top = f64::MIN;
        let mut right = f64::MIN;
        let mut bottom = f64::MAX;
        let mut found = false;

        layer.reset_feature_reading();
        for feature in layer.features() {
            let Some(geometry) = feature.geometry() else { continue };
            let envelope = geometry.envelope();
            left = left.min(envelope.MinX);
            right = right.max(envelope.MaxX);
            top = top.max(envelope.MaxY);
            bottom = bottom.min(envelope.MinY);
            found = true;
        }

        if !found {
            return Err(Error::NoFeatures(where_filter.to_string()));
        }

        let area = snap_envelope_to_grid(left, top, right, bottom, scale);
        let cols = (area.width() / scale.xstep.abs()).round() as i64;
        let rows = (area.height() / scale.ystep.abs()).round() as i64;

        layer.set_attribute_filter(where_filter).map_err(|e| Error::Geo(e.into()))?;

        let meta = GeoReference::new(
            projection.to_string(),
            RasterSize::with_rows_cols(geo::Rows(rows as i32), geo::Columns(cols as i32)),
            GeoTransform::new([area.left, scale.xstep, 0.0, area.top, 0.0, scale.ystep]),
            Some(0.0),
        );

        let (_, data) = geo::vector::algo::rasterize::<u8>(
            &dataset,
            &meta,
            &["ALL_TOUCHED=TRUE".to_string(), "BURN_VALUES=1".to_string()],
        )
        .map_err(Error::Geo)?;

        Ok(VectorRangeLayer {
            area,
            scale,
            projection: projection.to_string(),
            data,
            cols,
            rows,
            window: Window {
                xoff: 0,
                yoff: 0,
                xsize: cols,
                ysize: rows,
            },
        })
    }
}

impl HasExtent for VectorRangeLayer {
    fn area(&self) -> Area {
        self.area
    }

    fn pixel_scale(&self) -> Option<PixelScale> {
        Some(self.scale)
    }
}

impl Layer for VectorRangeLayer {
    fn projection(&self) -> &str {
        &self.projection
    }

    fn datatype(&self) -> DataType {
        DataType::Byte
    }

    fn window(&self) -> Window {
        self.window
    }

    fn set_window_for_intersection(&mut self, area: Area) -> Result<()> {
        self.window = window_for_area(self.area, self.scale, self.cols, self.rows, area)?;
        Ok(())
    }

    fn set_window_for_union(&mut self, area: Area) -> Result<()> {
        self.window = crate::geo::padded_window_for_area(self.area, self.scale, area)?;
        Ok(())
    }

    fn reset_window(&mut self) {
        self.window = Window {
            xoff: 0,
            yoff: 0,
            xsize: self.cols,
            ysize: self.rows,
        };
    }

    fn read_window(&self, x: i64, y: i64, xsize: i64, ysize: i64) -> Result<Vec<f64>> {
        let abs_x = self.window.xoff + x;
        let abs_y = self.window.yoff + y;

        let mut out = Vec::with_capacity((xsize * ysize) as usize);
        for row in 0..ysize {
            let py = abs_y + row;
            for col in 0..xsize {
                let px = abs_x + col;
                if px < 0 || py < 0 || px >= self.cols || py >= self.rows {
                    out.push(0.0);
                } else {
                    out.push(self.data[(py * self.cols + px) as usize] as f64);
                }
            }
        }
        Ok(out)
    }
}
