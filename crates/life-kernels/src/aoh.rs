//! Area-of-Habitat: the pixel area within a species' range that also
//! satisfies its habitat and elevation preferences.
//!
//! Grounded on `persistence/__init__.py::_calculate`'s AoH recipe:
//! `habitat.isin(habitat_codes) & (elevation >= min) & (elevation <= max)
//! & range_mask`, multiplied by a nan-safe pixel-area layer and either
//! summed (`layer.sum()`) or rasterized (`layer.save(dst)`).

use life::graph::Node;
use life::layer::LayerSource;
use life::{resolve, save, sum, AreaMode, ConstantLayer, DataType, Sink};

use crate::error::Result;

/// The season an IUCN range polygon (or the species as a whole)
/// applies to. Grounded on the IUCN `seasonality` field, mapped the
/// same way `iucn_modlib`'s `Seasonality` enum does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seasonality {
    Resident,
    Breeding,
    Nonbreeding,
    Passage,
}

impl Seasonality {
    /// The IUCN `seasonal` attribute codes this seasonality matches,
    /// mirroring `iucn_modlib.translator.iucn_seasons`: resident ranges
    /// also count as both breeding and nonbreeding range for species
    /// that are not flagged migratory.
    pub fn iucn_season_codes(self) -> &'static [f64] {
        match self {
            Seasonality::Resident => &[1.0],
            Seasonality::Breeding => &[2.0],
            Seasonality::Nonbreeding => &[3.0],
            Seasonality::Passage => &[4.0],
        }
    }

    /// Parses the `aoh --seasonality` CLI value, matching
    /// `persistence.Seasonality`'s three values (passage ranges are not
    /// exposed at the CLI and have no corresponding flag value).
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "resident" => Ok(Seasonality::Resident),
            "breeding" => Ok(Seasonality::Breeding),
            "nonbreeding" => Ok(Seasonality::Nonbreeding),
            other => Err(crate::error::Error::UnknownSeasonality(other.to_string())),
        }
    }

    /// The uppercase tag used in persisted-state filenames
    /// (`{taxid}_{SEASON}.tif`), matching `Season.name` in
    /// `deltap/global_code_residents_pixel.py`.
    pub fn tag(self) -> &'static str {
        match self {
            Seasonality::Resident => "RESIDENT",
            Seasonality::Breeding => "BREEDING",
            Seasonality::Nonbreeding => "NONBREEDING",
            Seasonality::Passage => "PASSAGE",
        }
    }

    /// The vector range layer's where-clause value, matching
    /// `persistence/__init__.py::calculator`'s
    /// `f"id_no = {taxid} and season in ('{seasonality.value}', 'resident')"`.
    pub fn range_where_filter(self, taxid: &str) -> String {
        let value = match self {
            Seasonality::Resident => "resident",
            Seasonality::Breeding => "breeding",
            Seasonality::Nonbreeding => "nonbreeding",
            Seasonality::Passage => "passage",
        };
        format!("id_no = {taxid} and season in ('{value}', 'resident')")
    }
}

/// Translates a land-cover raster's codes into an `isin` habitat mask,
/// so the same AoH recipe works against either the Jung et al. or the
/// ESA-CCI land-cover products.
///
/// Grounded on `HabitatLayer`/`area_of_habitat.py`'s translator
/// indirection: different land-cover products encode the same IUCN
/// habitat classes with different pixel values.
pub trait HabitatTranslator {
    /// The raster pixel values this translator considers to be within
    /// `habitat_codes` (IUCN habitat classes, e.g. `"1.4"`).
    fn raster_codes_for(&self, habitat_codes: &[String]) -> Vec<f64>;
}

/// A fixed lookup already resolved to codes of the backing raster
/// product (the common case once a `crate::crosswalk::HabitatCrosswalk`
/// has been consulted).
pub struct ResolvedHabitatCodes(pub Vec<f64>);

impl HabitatTranslator for ResolvedHabitatCodes {
    fn raster_codes_for(&self, _habitat_codes: &[String]) -> Vec<f64> {
        self.0.clone()
    }
}

/// Elevation bounds a species tolerates, in meters. `None` means
/// unbounded on that side, matching `elevation_lower_bound`/
/// `elevation_upper_bound` left blank in the reference species data.
#[derive(Debug, Clone, Copy)]
pub struct ElevationRange {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl ElevationRange {
    pub fn unbounded() -> Self {
        ElevationRange { lower: None, upper: None }
    }
}

/// Everything the AoH recipe needs for one species/season: its habitat
/// raster, elevation raster, per-pixel area raster, and a range mask
/// (typically a `VectorRangeLayer` or `Computed` union of per-season
/// vector ranges).
pub struct AohInputs {
    pub habitat: Node,
    pub elevation: Node,
    pub pixel_area: Node,
    pub range_mask: Node,
    pub habitat_codes: Vec<f64>,
    pub elevation_range: ElevationRange,
}

/// Builds the lazy AoH expression: `habitat.isin(codes) & elevation
/// bounds & range_mask`, in area units (the product of `pixel_area`).
pub fn aoh_expression(inputs: AohInputs) -> Node {
    let mut mask = inputs.habitat.isin(inputs.habitat_codes);

    if let Some(lower) = inputs.elevation_range.lower {
        mask = mask.and(inputs.elevation.clone().ge_scalar(lower));
    }
    if let Some(upper) = inputs.elevation_range.upper {
        mask = mask.and(inputs.elevation.clone().le_scalar(upper));
    }

    mask.and(inputs.range_mask).mul_layer(inputs.pixel_area.nan_to_num(0.0))
}

/// Resolves the expression's working area over an intersection of its
/// inputs and sums it to a single area-of-habitat figure (km^2 or ha,
/// depending on the pixel-area layer's units).
pub fn aoh_sum(expression: Node) -> Result<f64> {
    let (_area, cols, rows) = resolve(&expression, AreaMode::Intersection)?;
    Ok(sum(&expression, cols, rows)?)
}

/// As [`aoh_sum`], but writes the per-pixel AoH raster to `sink` instead
/// of reducing it, for recipes that need the spatial pattern (e.g. H3
/// aggregation).
pub fn aoh_raster(expression: Node, sink: &(impl Sink + ?Sized)) -> Result<()> {
    let (_area, cols, rows) = resolve(&expression, AreaMode::Intersection)?;
    save(&expression, cols, rows, sink, DataType::Float64)?;
    Ok(())
}

/// A pixel-area layer with no geographic variation at all, for unit
/// tests and any recipe run against a Cartesian (non-geographic) test
/// raster.
pub fn unit_pixel_area() -> Node {
    Node::leaf(LayerSource::Constant(ConstantLayer::new(1.0)))
}
