//! Area/PixelScale/Window primitives and the intersection/union math that
//! every layer source and the operator graph build on top of.

use approx::relative_eq;

use crate::error::{Error, Result};

/// A geographic bounding box, in the projection's native units, with the
/// axis convention `top > bottom` and `right > left`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Area {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Area {
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    fn to_rect(self) -> geo::Rect<f64> {
        geo::Rect::from_nw_se(geo::Point::new(self.left, self.top), geo::Point::new(self.right, self.bottom))
    }

    fn from_rect(rect: geo::Rect<f64>) -> Self {
        Area {
            left: rect.top_left().x(),
            top: rect.top_left().y(),
            right: rect.bottom_right().x(),
            bottom: rect.bottom_right().y(),
        }
    }
}

/// Pixel pitch. `ystep` is conventionally negative (north-up rasters).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelScale {
    pub xstep: f64,
    pub ystep: f64,
}

impl PixelScale {
    pub fn new(xstep: f64, ystep: f64) -> Self {
        PixelScale { xstep, ystep }
    }

    fn compatible_with(&self, other: &PixelScale) -> bool {
        relative_eq!(self.xstep, other.xstep, epsilon = 1e-9) && relative_eq!(self.ystep, other.ystep, epsilon = 1e-9)
    }
}

/// A pixel-space sub-window of a layer's native raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub xoff: i64,
    pub yoff: i64,
    pub xsize: i64,
    pub ysize: i64,
}

/// Anything that has a geographic extent and, optionally, a pixel scale.
/// `None` pixel scale means "adopts whatever scale its peers use" (e.g. a
/// `Constant` layer).
pub trait HasExtent {
    fn area(&self) -> Area;
    fn pixel_scale(&self) -> Option<PixelScale>;
}

fn reference_scale(layers: &[&dyn HasExtent]) -> Result<Option<PixelScale>> {
    let mut scale: Option<PixelScale> = None;
    for layer in layers {
        if let Some(s) = layer.pixel_scale() {
            match scale {
                None => scale = Some(s),
                Some(existing) => {
                    if !existing.compatible_with(&s) {
                        return Err(Error::ScaleMismatch);
                    }
                }
            }
        }
    }
    Ok(scale)
}

/// Intersection of the geographic extents of all the given layers.
///
/// Mirrors `Layer.find_intersection` from the reference Python
/// implementation: layers without an opinion on scale (e.g. a constant
/// fill) are allowed to participate freely. The pairwise bbox math is
/// delegated to `geo::Rect::intersection`.
pub fn intersection(layers: &[&dyn HasExtent]) -> Result<Area> {
    if layers.is_empty() {
        return Err(Error::InvalidArgument("expected a non-empty list of layers".to_string()));
    }
    reference_scale(layers)?;

    let mut acc = layers[0].area().to_rect();
    for layer in &layers[1..] {
        acc = acc.intersection(&layer.area().to_rect());
    }

    if acc.is_empty() {
        return Err(Error::NoIntersection);
    }

    Ok(Area::from_rect(acc))
}

/// Bounding-box union of the geographic extents of all the given layers.
pub fn union(layers: &[&dyn HasExtent]) -> Result<Area> {
    if layers.is_empty() {
        return Err(Error::InvalidArgument("expected a non-empty list of layers".to_string()));
    }
    reference_scale(layers)?;

    let left = layers.iter().map(|l| l.area().left).fold(f64::MAX, f64::min);
    let top = layers.iter().map(|l| l.area().top).fold(f64::MIN, f64::max);
    let right = layers.iter().map(|l| l.area().right).fold(f64::MIN, f64::max);
    let bottom = layers.iter().map(|l| l.area().bottom).fold(f64::MAX, f64::min);

    Ok(Area { left, top, right, bottom })
}

/// Derives the pixel-space window within `layer_area`/`layer_scale`/
/// `layer_size` that corresponds to `target`, rounding to the nearest
/// pixel and rejecting misalignment greater than half a pixel.
pub fn window_for_area(
    layer_area: Area,
    layer_scale: PixelScale,
    layer_cols: i64,
    layer_rows: i64,
    target: Area,
) -> Result<Window> {
    let xstep = layer_scale.xstep;
    let ystep = -layer_scale.ystep.abs();

    let xoff_f = (target.left - layer_area.left) / xstep;
    let yoff_f = (layer_area.top - target.top) / ystep.abs();
    let xsize_f = target.width() / xstep;
    let ysize_f = target.height() / ystep.abs();

    check_alignment("xoff", xoff_f)?;
    check_alignment("yoff", yoff_f)?;
    check_alignment("xsize", xsize_f)?;
    check_alignment("ysize", ysize_f)?;

    let window = Window {
        xoff: xoff_f.round() as i64,
        yoff: yoff_f.round() as i64,
        xsize: xsize_f.round() as i64,
        ysize: ysize_f.round() as i64,
    };

    if window.xoff < 0 || window.yoff < 0 {
        return Err(Error::WindowMisalignment("window has a negative offset".to_string()));
    }
    if window.xoff + window.xsize > layer_cols || window.yoff + window.ysize > layer_rows {
        return Err(Error::WindowMisalignment("window is bigger than the dataset".to_string()));
    }

    Ok(window)
}

/// As [`window_for_area`], but allows negative offsets and a window that
/// extends past the layer's own bounds, for the union-expansion case
/// where reads outside the original footprint synthesize the "outside"
/// value instead of failing.
pub fn padded_window_for_area(layer_area: Area, layer_scale: PixelScale, target: Area) -> Result<Window> {
    let xstep = layer_scale.xstep;
    let ystep = layer_scale.ystep.abs();

    let xoff_f = (target.left - layer_area.left) / xstep;
    let yoff_f = (layer_area.top - target.top) / ystep;
    let xsize_f = target.width() / xstep;
    let ysize_f = target.height() / ystep;

    check_alignment("xoff", xoff_f)?;
    check_alignment("yoff", yoff_f)?;
    check_alignment("xsize", xsize_f)?;
    check_alignment("ysize", ysize_f)?;

    Ok(Window {
        xoff: xoff_f.round() as i64,
        yoff: yoff_f.round() as i64,
        xsize: xsize_f.round() as i64,
        ysize: ysize_f.round() as i64,
    })
}

fn check_alignment(name: &str, value: f64) -> Result<()> {
    let rounded = value.round();
    if (value - rounded).abs() > 0.5 {
        return Err(Error::WindowMisalignment(format!(
            "{name} does not align to the pixel grid: {value}"
        )));
    }
    Ok(())
}

/// Snaps a vector envelope (left, top, right, bottom in map units) to the
/// pixel grid implied by `scale`, using floor/ceil against the absolute
/// pixel step, matching `VectorRangeLayer.__init__`'s rounding rule.
pub fn snap_envelope_to_grid(left: f64, top: f64, right: f64, bottom: f64, scale: PixelScale) -> Area {
    let abs_x = scale.xstep.abs();
    let abs_y = scale.ystep.abs();
    Area {
        left: (left / abs_x).floor() * abs_x,
        top: (top / abs_y).ceil() * abs_y,
        right: (right / abs_x).ceil() * abs_x,
        bottom: (bottom / abs_y).floor() * abs_y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        area: Area,
        scale: Option<PixelScale>,
    }

    impl HasExtent for Fixed {
        fn area(&self) -> Area {
            self.area
        }
        fn pixel_scale(&self) -> Option<PixelScale> {
            self.scale
        }
    }

    #[test]
    fn intersection_of_overlapping_areas() {
        let a = Fixed {
            area: Area {
                left: 0.0,
                top: 10.0,
                right: 10.0,
                bottom: 0.0,
            },
            scale: Some(PixelScale::new(1.0, -1.0)),
        };
        let b = Fixed {
            area: Area {
                left: 5.0,
                top: 8.0,
                right: 15.0,
                bottom: -2.0,
            },
            scale: Some(PixelScale::new(1.0, -1.0)),
        };
        let result = intersection(&[&a, &b]).unwrap();
        assert_eq!(result, Area {
            left: 5.0,
            top: 8.0,
            right: 10.0,
            bottom: 0.0
        });
    }

    #[test]
    fn no_intersection_is_an_error() {
        let a = Fixed {
            area: Area {
                left: 0.0,
                top: 10.0,
                right: 10.0,
                bottom: 0.0,
            },
            scale: Some(PixelScale::new(1.0, -1.0)),
        };
        let b = Fixed {
            area: Area {
                left: 20.0,
                top: 10.0,
                right: 30.0,
                bottom: 0.0,
            },
            scale: Some(PixelScale::new(1.0, -1.0)),
        };
        assert!(matches!(intersection(&[&a, &b]), Err(Error::NoIntersection)));
    }

    #[test]
    fn scale_mismatch_is_rejected() {
        let a = Fixed {
            area: Area {
                left: 0.0,
                top: 10.0,
                right: 10.0,
                bottom: 0.0,
            },
            scale: Some(PixelScale::new(1.0, -1.0)),
        };
        let b = Fixed {
            area: Area {
                left: 0.0,
                top: 10.0,
                right: 10.0,
                bottom: 0.0,
            },
            scale: Some(PixelScale::new(0.5, -0.5)),
        };
        assert!(matches!(intersection(&[&a, &b]), Err(Error::ScaleMismatch)));
    }

    #[test]
    fn union_is_a_superset() {
        let a = Fixed {
            area: Area {
                left: 0.0,
                top: 10.0,
                right: 10.0,
                bottom: 0.0,
            },
            scale: Some(PixelScale::new(1.0, -1.0)),
        };
        let b = Fixed {
            area: Area {
                left: 5.0,
                top: 15.0,
                right: 20.0,
                bottom: -5.0,
            },
            scale: Some(PixelScale::new(1.0, -1.0)),
        };
        let result = union(&[&a, &b]).unwrap();
        assert_eq!(result, Area {
            left: 0.0,
            top: 15.0,
            right: 20.0,
            bottom: -5.0
        });
    }

    #[test]
    fn constant_layer_has_no_scale_opinion() {
        let a = Fixed {
            area: Area {
                left: -180.0,
                top: 90.0,
                right: 180.0,
                bottom: -90.0,
            },
            scale: None,
        };
        let b = Fixed {
            area: Area {
                left: 0.0,
                top: 10.0,
                right: 10.0,
                bottom: 0.0,
            },
            scale: Some(PixelScale::new(1.0, -1.0)),
        };
        let result = intersection(&[&a, &b]).unwrap();
        assert_eq!(result, Area {
            left: 0.0,
            top: 10.0,
            right: 10.0,
            bottom: 0.0
        });
    }
}
