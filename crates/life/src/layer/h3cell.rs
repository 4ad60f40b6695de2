use h3o::{CellIndex, LatLng};

use crate::error::Result;
use crate::geo::{snap_envelope_to_grid, window_for_area, Area, HasExtent, PixelScale, Window};
use crate::layer::{DataType, Layer};

/// A mask rasterized from a single H3 cell's boundary polygon, treated
/// as planar in the target CRS.
///
/// Grounded conceptually on the cell-to-raster conversion approach of
/// `h3ron`'s raster converter, adapted here to burn a single cell
/// against its own pixel-snapped envelope (the same approach
/// `VectorRangeLayer` uses for species ranges) rather than a whole H3
/// grid at once; built on `h3o` rather than the legacy `h3`/`h3ron`
/// bindings (see DESIGN.md).
pub struct H3CellLayer {
    area: Area,
    scale: PixelScale,
    cols: i64,
    rows: i64,
    data: Vec<u8>,
    window: Window,
}

/// Width, in degrees, of the dateline-straddling band `new_banded`
/// rasterizes a split antimeridian cell against on each side of +/-180.
/// Wide enough for any cell up to a coarse H3 resolution; a cell whose
/// boundary reaches further than this from the seam falls back to
/// `new`'s whole-envelope rasterization (see `HasExtent`'s caller in
/// `life_kernels::h3agg::aggregate`).
pub const ANTIMERIDIAN_BAND_WIDTH_DEGREES: f64 = 2.0;

impl H3CellLayer {
    pub fn new(cell: CellIndex, scale: PixelScale) -> Result<Self> {
        let boundary = cell.boundary();
        let mut left = f64::MAX;
        let mut right = f64::MIN;
        let mut top = f64::MIN;
        let mut bottom = f64::MAX;
        for vertex in boundary.iter() {
            let lng = vertex.lng();
            let lat = vertex.lat();
            left = left.min(lng);
            right = right.max(lng);
            top = top.max(lat);
            bottom = bottom.min(lat);
        }

        let area = snap_envelope_to_grid(left, top, right, bottom, scale);
        Self::rasterize(cell, scale, area)
    }

    /// Rasterizes `cell` against an explicit `band`, rather than the
    /// cell's own (possibly antimeridian-spanning) envelope. Used to
    /// cover a dateline-straddling cell as the union of a west-of-seam
    /// and an east-of-seam band, each a well-formed (non-wrapping) area.
    pub fn new_banded(cell: CellIndex, scale: PixelScale, band: Area) -> Result<Self> {
        let area = snap_envelope_to_grid(band.left, band.top, band.right, band.bottom, scale);
        Self::rasterize(cell, scale, area)
    }

    /// True if `cell`'s boundary vertices span more than half the globe
    /// in longitude, the telltale sign of an H3 library reporting raw
    /// (non-unwrapped) longitudes for a cell that actually straddles
    /// +/-180.
    pub fn straddles_antimeridian(cell: CellIndex) -> bool {
        let mut left = f64::MAX;
        let mut right = f64::MIN;
        for vertex in cell.boundary().iter() {
            left = left.min(vertex.lng());
            right = right.max(vertex.lng());
        }
        right - left > 180.0
    }

    /// The two bands `straddles_antimeridian`-flagged cells should be
    /// rasterized against, or `None` if the cell's vertices reach
    /// further than [`ANTIMERIDIAN_BAND_WIDTH_DEGREES`] from the seam
    /// (the caller should fall back to [`H3CellLayer::new`]).
    pub fn antimeridian_bands(cell: CellIndex) -> Option<(Area, Area)> {
        let mut top = f64::MIN;
        let mut bottom = f64::MAX;
        let band = ANTIMERIDIAN_BAND_WIDTH_DEGREES;
        for vertex in cell.boundary().iter() {
            let lng = vertex.lng();
            if 180.0 - lng.abs() > band {
                return None;
            }
            top = top.max(vertex.lat());
            bottom = bottom.min(vertex.lat());
        }
        let west = Area { left: -180.0, top, right: -180.0 + band, bottom };
        let east = Area { left: 180.0 - band, top, right: 180.0, bottom };
        Some((west, east))
    }

    fn rasterize(cell: CellIndex, scale: PixelScale, area: Area) -> Result<Self> {
        let cols = (area.width() / scale.xstep.abs()).round().max(1.0) as i64;
        let rows = (area.height() / scale.ystep.abs()).round().max(1.0) as i64;

        let mut data = vec![0u8; (cols * rows) as usize];
        for row in 0..rows {
            let lat = area.top - (row as f64 + 0.5) * scale.ystep.abs();
            for col in 0..cols {
                let lng = area.left + (col as f64 + 0.5) * scale.xstep;
                let Ok(point) = LatLng::new(lat, lng) else { continue };
                if point.to_cell(cell.resolution()) == cell {
                    data[(row * cols + col) as usize] = 1;
                }
            }
        }

        Ok(H3CellLayer {
            area,
            scale,
            cols,
            rows,
            data,
            window: Window {
                xoff: 0,
                yoff: 0,
                xsize: cols,
                ysize: rows,
            },
        })
    }
}

impl HasExtent for H3CellLayer {
    fn area(&self) -> Area {
        self.area
    }

    fn pixel_scale(&self) -> Option<PixelScale> {
        Some(self.scale)
    }
}

impl Layer for H3CellLayer {
    fn projection(&self) -> &str {
        "EPSG:4326"
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
