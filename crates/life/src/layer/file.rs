use std::cell::RefCell;
use std::path::Path;

use geo::raster::io::RasterIO;
use geo::{GeoReference, GeoTransform, RasterSize};

use crate::error::{Error, Result};
use crate::geo::{window_for_area, Area, HasExtent, PixelScale, Window};
use crate::layer::{DataType, Layer};

/// A layer backed by a single-band raster file on disk, read lazily
/// through `geo::raster::io::RasterIO`.
///
/// Grounded on `Layer.__init__`/`Layer.ReadAsArray` in the reference
/// Python implementation: the geotransform is captured once at open
/// time, the window defaults to the whole raster, and reads are
/// relative to the current window.
pub struct FileLayer {
    reader: RefCell<RasterIO>,
    georef: GeoReference,
    datatype: DataType,
    native_cols: i64,
    native_rows: i64,
    window: Window,
}

impl FileLayer {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut reader = RasterIO::open_read_only(path)?;
        let georef = reader.georeference(1)?;
        let raster_size = reader.raster_size()?;
        let datatype = match reader.data_type(1)? {
            geo::ArrayDataType::Uint8 | geo::ArrayDataType::Int8 => DataType::Byte,
            geo::ArrayDataType::Int16 | geo::ArrayDataType::Uint16 => DataType::Int16,
            geo::ArrayDataType::Int32 | geo::ArrayDataType::Uint32 => DataType::Int32,
            geo::ArrayDataType::Float32 => DataType::Float32,
            _ => DataType::Float64,
        };

        let cols = raster_size.cols.count() as i64;
        let rows = raster_size.rows.count() as i64;

        Ok(FileLayer {
            reader: RefCell::new(reader),
            georef,
            datatype,
            native_cols: cols,
            native_rows: rows,
            window: Window {
                xoff: 0,
                yoff: 0,
                xsize: cols,
                ysize: rows,
            },
        })
    }

    fn transform(&self) -> GeoTransform {
        self.georef.geo_transform()
    }

    fn scale(&self) -> PixelScale {
        PixelScale::new(self.transform().cell_size_x(), self.transform().cell_size_y())
    }
}

impl HasExtent for FileLayer {
    fn area(&self) -> Area {
        let t = self.transform();
        Area {
            left: t.top_left().x(),
            top: t.top_left().y(),
            right: t.top_left().x() + (self.native_cols as f64) * t.cell_size_x(),
            bottom: t.top_left().y() + (self.native_rows as f64) * t.cell_size_y(),
        }
    }

    fn pixel_scale(&self) -> Option<PixelScale> {
        Some(self.scale())
    }
}

impl Layer for FileLayer {
    fn projection(&self) -> &str {
        self.georef.projection()
    }

    fn datatype(&self) -> DataType {
        self.datatype
    }

    fn window(&self) -> Window {
        self.window
    }

    fn set_window_for_intersection(&mut self, area: Area) -> Result<()> {
        self.window = window_for_area(self.area(), self.scale(), self.native_cols, self.native_rows, area)?;
        Ok(())
    }

    fn set_window_for_union(&mut self, area: Area) -> Result<()> {
        self.window = crate::geo::padded_window_for_area(self.area(), self.scale(), area)?;
        Ok(())
    }

    fn reset_window(&mut self) {
        self.window = Window {
            xoff: 0,
            yoff: 0,
            xsize: self.native_cols,
            ysize: self.native_rows,
        };
    }

    fn read_window(&self, x: i64, y: i64, xsize: i64, ysize: i64) -> Result<Vec<f64>> {
        let abs_x = self.window.xoff + x;
        let abs_y = self.window.yoff + y;

        // Union-expansion may ask for rows/columns that only partly
        // overlap the native raster; pad per-pixel rather than
        // all-or-nothing, matching `UniformAreaRowLayer`/`VectorRangeLayer`.
        let valid_x0 = abs_x.max(0);
        let valid_x1 = (abs_x + xsize).min(self.native_cols);
        let valid_y0 = abs_y.max(0);
        let valid_y1 = (abs_y + ysize).min(self.native_rows);

        let mut out = vec![0.0; (xsize * ysize) as usize];
        if valid_x1 <= valid_x0 || valid_y1 <= valid_y0 {
            return Ok(out);
        }

        let overlap_cols = valid_x1 - valid_x0;
        let overlap_rows = valid_y1 - valid_y0;

        let t = self.transform();
        let bounds = GeoReference::new(
            self.georef.projection().to_string(),
            RasterSize::with_rows_cols(geo::Rows(overlap_rows as i32), geo::Columns(overlap_cols as i32)),
            GeoTransform::new([
                t.top_left().x() + (valid_x0 as f64) * t.cell_size_x(),
                t.cell_size_x(),
                0.0,
                t.top_left().y() + (valid_y0 as f64) * t.cell_size_y(),
                0.0,
                t.cell_size_y(),
            ]),
            None,
        );

        let (_, data) = self
            .reader
            .borrow_mut()
            .read_raster_band_region::<f64>(1, &bounds)
            .map_err(Error::Geo)?;
        let data = data.as_slice();

        let dst_x0 = valid_x0 - abs_x;
        let dst_y0 = valid_y0 - abs_y;
        for row in 0..overlap_rows {
            let src_start = (row * overlap_cols) as usize;
            let src_row = &data[src_start..src_start + overlap_cols as usize];
            let dst_start = ((dst_y0 + row) * xsize + dst_x0) as usize;
            out[dst_start..dst_start + overlap_cols as usize].copy_from_slice(src_row);
        }

        Ok(out)
    }
}
