use crate::error::Result;
use crate::geo::{Area, HasExtent, PixelScale, Window};
use crate::layer::{DataType, Layer};

/// A scalar fill that is compatible with any pixel scale and spans the
/// whole globe, used for "no such raster" sentinels and for algebra with
/// plain numeric constants.
///
/// Grounded on `NullLayer`/`ConstantLayer` in the reference
/// implementation: `pixel_scale()` returns `None` so it never
/// constrains `find_intersection`/`find_union`, and every read just
/// returns the fill value.
#[derive(Debug, Clone, Copy)]
pub struct ConstantLayer {
    value: f64,
    window: Window,
}

impl ConstantLayer {
    pub fn new(value: f64) -> Self {
        ConstantLayer {
            value,
            window: Window {
                xoff: 0,
                yoff: 0,
                xsize: i64::MAX,
                ysize: i64::MAX,
            },
        }
    }
}

impl HasExtent for ConstantLayer {
    fn area(&self) -> Area {
        Area {
            left: -180.0,
            top: 90.0,
            right: 180.0,
            bottom: -90.0,
        }
    }

    fn pixel_scale(&self) -> Option<PixelScale> {
        None
    }
}

impl Layer for ConstantLayer {
    fn projection(&self) -> &str {
        "EPSG:4326"
    }

    fn datatype(&self) -> DataType {
        DataType::Float64
    }

    fn window(&self) -> Window {
        self.window
    }

    fn set_window_for_intersection(&mut self, _area: Area) -> Result<()> {
        Ok(())
    }

    fn set_window_for_union(&mut self, _area: Area) -> Result<()> {
        Ok(())
    }

    fn reset_window(&mut self) {}

    fn read_window(&self, _x: i64, _y: i64, xsize: i64, ysize: i64) -> Result<Vec<f64>> {
        Ok(vec![self.value; (xsize * ysize) as usize])
    }
}
