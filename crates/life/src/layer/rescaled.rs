use std::path::Path;

use crate::error::Result;
use crate::geo::{Area, HasExtent, PixelScale, Window};
use crate::layer::{DataType, FileLayer, Layer};

/// Wraps a file layer and resamples it to a different pixel scale using
/// nearest-neighbor lookups, for when a layer (e.g. a PNV map) must be
/// compared against peers at a finer resolution.
///
/// Grounded on `yirgacheffe.layers.RescaledRasterLayer`, used in
/// `prepare_layers/make_restore_map.py` to bring a coarser PNV layer up
/// to the current map's resolution before the crosswalk recode.
pub struct RescaledLayer {
    inner: FileLayer,
    scale: PixelScale,
    window: Window,
}

impl RescaledLayer {
    pub fn open(path: impl AsRef<Path>, scale: PixelScale) -> Result<Self> {
        let inner = FileLayer::open(path)?;
        let area = inner.area();
        let cols = (area.width() / scale.xstep.abs()).round() as i64;
        let rows = (area.height() / scale.ystep.abs()).round() as i64;
        Ok(RescaledLayer {
            inner,
            scale,
            window: Window {
                xoff: 0,
                yoff: 0,
                xsize: cols,
                ysize: rows,
            },
        })
    }
}

impl HasExtent for RescaledLayer {
    fn area(&self) -> Area {
        self.inner.area()
    }

    fn pixel_scale(&self) -> Option<PixelScale> {
        Some(self.scale)
    }
}

impl Layer for RescaledLayer {
    fn projection(&self) -> &str {
        self.inner.projection()
    }

    fn datatype(&self) -> DataType {
        self.inner.datatype()
    }

    fn window(&self) -> Window {
        self.window
    }

    fn set_window_for_intersection(&mut self, area: Area) -> Result<()> {
        let cols = self.window.xsize;
        let rows = self.window.ysize;
        self.window = crate::geo::window_for_area(self.area(), self.scale, cols, rows, area)?;
        Ok(())
    }

    fn set_window_for_union(&mut self, area: Area) -> Result<()> {
        self.window = crate::geo::padded_window_for_area(self.area(), self.scale, area)?;
        Ok(())
    }

    fn reset_window(&mut self) {
        let area = self.area();
        let cols = (area.width() / self.scale.xstep.abs()).round() as i64;
        let rows = (area.height() / self.scale.ystep.abs()).round() as i64;
        self.window = Window {
            xoff: 0,
            yoff: 0,
            xsize: cols,
            ysize: rows,
        };
    }

    fn read_window(&self, x: i64, y: i64, xsize: i64, ysize: i64) -> Result<Vec<f64>> {
        let area = self.inner.area();
        let inner_scale = self.inner.pixel_scale().expect("file layers always have a pixel scale");

        let mut out = Vec::with_capacity((xsize * ysize) as usize);
        for row in 0..ysize {
            let py = self.window.yoff + y + row;
            let map_y = area.top + (py as f64) * self.scale.ystep;
            let inner_row = ((area.top - map_y) / inner_scale.ystep.abs()).floor() as i64;
            for col in 0..xsize {
                let px = self.window.xoff + x + col;
                let map_x = area.left + (px as f64) * self.scale.xstep;
                let inner_col = ((map_x - area.left) / inner_scale.xstep).floor() as i64;
                let value = self.inner.read_window(inner_col, inner_row, 1, 1)?;
                out.push(value[0]);
            }
        }
        Ok(out)
    }
}
