//! Persistence delta (ΔP): the per-pixel change in a species'
//! persistence probability between its current and scenario
//! area-of-habitat, run through an extinction-risk curve.
//!
//! Grounded on `deltap/global_code_residents_pixel.py`: the power-curve
//! and Gompertz curve constants, the migratory geometric-mean
//! composition, and — critically — the fact that `new_AOH`/`new_P`/ΔP
//! are computed pixel-by-pixel over the current (C) and scenario (S)
//! AoH rasters, not as a single scalar ratio.

use life::graph::Node;
use life::layer::LayerSource;
use life::{resolve, save, sum, AreaMode, ConstantLayer, DataType, Sink};

use crate::error::{Error, Result};

/// The extinction-risk curve relating the fraction of historic habitat
/// remaining to a species' persistence probability.
///
/// Grounded on `deltap/global_code_residents_pixel.py`: `Power(z)`
/// implements `x.powf(z)` for `z` in `{0.1, 0.25, 0.5, 1.0}`, and
/// `Gompertz` implements the fitted curve
/// `exp(-exp(GOMPERTZ_A + GOMPERTZ_B * x.powf(GOMPERTZ_ALPHA)))`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExtinctionCurve {
    Power { z: f64 },
    Gompertz,
}

/// Fitted Gompertz constants from the reference species-area model.
pub const GOMPERTZ_A: f64 = 2.5;
pub const GOMPERTZ_B: f64 = -14.5;
pub const GOMPERTZ_ALPHA: f64 = 1.0;

impl ExtinctionCurve {
    pub fn power(z: f64) -> Result<Self> {
        const VALID_Z: [f64; 4] = [0.1, 0.25, 0.5, 1.0];
        if !VALID_Z.iter().any(|v| (v - z).abs() < 1e-9) {
            return Err(Error::UnknownCurve(format!("z={z}")));
        }
        Ok(ExtinctionCurve::Power { z })
    }

    /// `f(x)`, unclamped: `x^z` for the power curve, the Gompertz form
    /// otherwise. `new_P`/`old_P` clamp the *result* of this to 1, not
    /// the input, so a scenario that increases habitat beyond
    /// `C_total` is allowed to push `x` above 1.
    fn curve_value(self, x: f64) -> f64 {
        match self {
            ExtinctionCurve::Power { z } => x.powf(z),
            ExtinctionCurve::Gompertz => (-(GOMPERTZ_A + GOMPERTZ_B * x.powf(GOMPERTZ_ALPHA)).exp()).exp(),
        }
    }

    /// Persistence probability for a habitat-remaining fraction `x`,
    /// clamped to `[0, 1]` first. Used where `x` is already known to be
    /// a plain ratio (e.g. a migratory season's historic-AoH fraction).
    pub fn persistence(self, x: f64) -> f64 {
        self.curve_value(x.clamp(0.0, 1.0))
    }
}

/// One season's current/scenario AoH rasters plus the scalar totals
/// the ΔP formula needs: `C_total = sum(current)`, `H = sum(historic)`.
///
/// A scenario raster missing on disk is represented as
/// `Node::leaf(LayerSource::Constant(ConstantLayer::new(0.0)))` by the
/// caller (the species went extinct under that scenario), matching
/// `open_layer_as_float64`'s `"nan"` sentinel path in the reference
/// implementation.
pub struct SeasonRasters {
    pub current: Node,
    pub scenario: Node,
    pub current_total: f64,
    pub historic_total: f64,
}

impl SeasonRasters {
    /// Builds a [`SeasonRasters`] from already-opened current/historic
    /// rasters, summing `historic` (and `current`, unless the caller
    /// already has `C_total`) once up front — `delta_p_expression`
    /// only ever touches the per-pixel `current`/`scenario` nodes.
    pub fn new(current: Node, scenario: Node, historic: &Node) -> Result<Self> {
        let (_area, cols, rows) = resolve(&current, AreaMode::Intersection)?;
        let current_total = sum(&current, cols, rows)?;
        let (_area, hcols, hrows) = resolve(historic, AreaMode::Intersection)?;
        let historic_total = sum(historic, hcols, hrows)?;
        Ok(SeasonRasters {
            current,
            scenario,
            current_total,
            historic_total,
        })
    }

    /// A scenario raster missing from disk: the species is treated as
    /// extinct under that scenario everywhere.
    pub fn missing_scenario() -> Node {
        Node::leaf(LayerSource::Constant(ConstantLayer::new(0.0)))
    }
}

/// Per-pixel new persistence for one season:
/// `new_AOH(x,y) = (C_total - C(x,y)) + S(x,y)`,
/// `new_P(x,y) = min(1, f(new_AOH(x,y) / H))`.
fn new_persistence_expression(season: &SeasonRasters, curve: ExtinctionCurve) -> Result<Node> {
    if season.historic_total == 0.0 {
        return Err(Error::ZeroHistoricAoH);
    }
    let h = season.historic_total;
    let new_aoh = season.current.clone().mul(-1.0).add(season.current_total).add_layer(season.scenario.clone());
    Ok(new_aoh.div(h).apply(move |x| curve.curve_value(x).min(1.0)))
}

/// `old_P = min(1, f(C_total / H))`, a single scalar per season.
fn old_persistence_scalar(season: &SeasonRasters, curve: ExtinctionCurve) -> Result<f64> {
    if season.historic_total == 0.0 {
        return Err(Error::ZeroHistoricAoH);
    }
    Ok(curve.curve_value(season.current_total / season.historic_total).min(1.0))
}

/// A species' season rasters for however many seasons its range
/// covers: a resident species only has `resident`, a migrant has both
/// `breeding` and `nonbreeding`.
#[derive(Default)]
pub struct SpeciesSeasons {
    pub resident: Option<SeasonRasters>,
    pub breeding: Option<SeasonRasters>,
    pub nonbreeding: Option<SeasonRasters>,
}

/// Builds the lazy ΔP expression for a species: `new_P(x,y) - old_P`,
/// composing migratory species' breeding/nonbreeding persistence as a
/// geometric mean (`sqrt(P_breeding * P_nonbreeding)`) before
/// subtracting, matching `global_code_residents_pixel.py`'s treatment
/// of migratory species.
pub fn delta_p_expression(species: SpeciesSeasons, curve: ExtinctionCurve) -> Result<Node> {
    if let Some(resident) = &species.resident {
        let new_p = new_persistence_expression(resident, curve)?;
        let old_p = old_persistence_scalar(resident, curve)?;
        return Ok(new_p.sub(old_p));
    }

    let breeding = species.breeding.as_ref().ok_or(Error::MissingSeason("breeding"))?;
    let nonbreeding = species.nonbreeding.as_ref().ok_or(Error::MissingSeason("nonbreeding"))?;

    let new_p_b = new_persistence_expression(breeding, curve)?;
    let new_p_n = new_persistence_expression(nonbreeding, curve)?;
    let new_p = new_p_b.mul_layer(new_p_n).apply(f64::sqrt);

    let old_p_b = old_persistence_scalar(breeding, curve)?;
    let old_p_n = old_persistence_scalar(nonbreeding, curve)?;
    let old_p = (old_p_b * old_p_n).sqrt();

    Ok(new_p.sub(old_p))
}

/// Resolves and writes a ΔP expression to `sink` as a Float64 raster,
/// the same way [`crate::aoh::aoh_raster`] does for AoH.
pub fn delta_p_raster(expression: Node, sink: &(impl Sink + ?Sized)) -> Result<()> {
    let (_area, cols, rows) = resolve(&expression, AreaMode::Intersection)?;
    save(&expression, cols, rows, sink, DataType::Float64)?;
    Ok(())
}
