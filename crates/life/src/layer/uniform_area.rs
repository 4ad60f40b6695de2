use std::path::Path;

use geo::raster::io::RasterIO;

use crate::error::Result;
use crate::geo::{Area, HasExtent, PixelScale, Window};
use crate::layer::{DataType, Layer};

/// A single-column raster (one value per latitude row, e.g. a pixel-area
/// map) that is replicated across a full 360deg-wide band.
///
/// Grounded verbatim on `UniformAreaLayer` in the reference
/// implementation: the backing dataset has `RasterXSize == 1`, and
/// `ReadAsArray` replicates `databand[row]` across however many columns
/// are asked for, rather than actually storing a full-width raster.
pub struct UniformAreaRowLayer {
    rows: Vec<f64>,
    ystep: f64,
    top: f64,
    window: Window,
    full_width_cols: i64,
}

impl UniformAreaRowLayer {
    /// Loads a shrunk (single-column) area raster prepared offline by
    /// `shrink_uniform_area_raster` (see `life-kernels::area`).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut reader = RasterIO::open_read_only(path)?;
        let georef = reader.georeference(1)?;
        let raster_size = reader.raster_size()?;
        if raster_size.cols.count() > 1 {
            return Err(crate::error::Error::InvalidArgument(
                "expected a shrunk (single-column) area raster".to_string(),
            ));
        }

        let (_, data) = reader.read_raster_band::<f64>(1)?;
        let transform = georef.geo_transform();
        let ystep = transform.cell_size_y();
        let xstep = transform.cell_size_x();
        let full_width_cols = (360.0 / xstep).round() as i64;

        Ok(UniformAreaRowLayer {
            rows: data.as_slice().to_vec(),
            ystep,
            top: transform.top_left().y(),
            window: Window {
                xoff: 0,
                yoff: 0,
                xsize: full_width_cols,
                ysize: raster_size.rows.count() as i64,
            },
            full_width_cols,
        })
    }
}

impl HasExtent for UniformAreaRowLayer {
    fn area(&self) -> Area {
        Area {
            left: -180.0,
            top: self.top,
            right: 180.0,
            bottom: self.top + (self.rows.len() as f64) * self.ystep,
        }
    }

    fn pixel_scale(&self) -> Option<PixelScale> {
        Some(PixelScale::new(360.0 / self.full_width_cols as f64, self.ystep))
    }
}

impl Layer for UniformAreaRowLayer {
    fn projection(&self) -> &str {
        "EPSG:4326"
    }

    fn datatype(&self) -> DataType {
        DataType::Float64
    }

    fn window(&self) -> Window {
        self.window
    }

    fn set_window_for_intersection(&mut self, area: Area) -> Result<()> {
        self.window = crate::geo::window_for_area(self.area(), self.pixel_scale().unwrap(), self.full_width_cols, self.rows.len() as i64, area)?;
        Ok(())
    }

    fn set_window_for_union(&mut self, area: Area) -> Result<()> {
        self.window = crate::geo::padded_window_for_area(self.area(), self.pixel_scale().unwrap(), area)?;
        Ok(())
    }

    fn reset_window(&mut self) {
        self.window = Window {
            xoff: 0,
            yoff: 0,
            xsize: self.full_width_cols,
            ysize: self.rows.len() as i64,
        };
    }

    fn read_window(&self, _x: i64, y: i64, xsize: i64, ysize: i64) -> Result<Vec<f64>> {
        let abs_y = self.window.yoff + y;
        let mut out = Vec::with_capacity((xsize * ysize) as usize);
        for row in 0..ysize {
            let idx = abs_y + row;
            let value = self.rows.get(idx as usize).copied().unwrap_or(0.0);
            out.extend(std::iter::repeat(value).take(xsize as usize));
        }
        Ok(out)
    }
}
