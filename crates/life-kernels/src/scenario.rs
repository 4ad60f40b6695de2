//! Land-use scenario construction: recoding a current land-cover map
//! into the current/restore/arable/pasture/food-current scenario
//! rasters the persistence-delta recipe compares against.
//!
//! Grounded on `prepare_layers/make_current_map.py`,
//! `make_restore_map.py`, `make_arable_map.py`, `make_pasture_map.py`
//! and `make_food_current_map.py`.

use std::cmp::Ordering;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use life::graph::{where_, Node};
use life::layer::{ConstantLayer, FileLayer, Layer, LayerSource, RescaledLayer};
use life::{HasExtent, Sink};

use crate::error::Result;

/// Jung et al. land-cover codes referenced directly by the reference
/// scenario scripts, rather than looked up through a crosswalk.
pub const JUNG_ARABLE_CODE: f64 = 1401.0;
pub const JUNG_PASTURE_CODE: f64 = 1402.0;
pub const JUNG_URBAN_CODE: f64 = 1405.0;

/// IUCN habitat classes that keep their fine-grained (level 2) code in
/// the "current" scenario instead of being rounded down to their
/// coarse (level 1) class, matching `make_current_map.py`'s
/// `IUCN_CODE_ARTIFICAL`.
pub const IUCN_CODE_ARTIFICAL: &[&str] = &["14", "14.1", "14.2", "14.3", "14.4", "14.5", "14.6"];

/// IUCN habitat classes replaced by potential natural vegetation in the
/// "restore" scenario, matching `make_restore_map.py`'s
/// `IUCN_CODE_REPLACEMENTS` (arable and pasture, but not the other
/// artificial subclasses).
pub const IUCN_CODE_REPLACEMENTS: &[&str] = &["14.1", "14.2", "14.3", "14.4", "14.6"];

/// Land-cover codes `make_food_current_map.py` leaves untouched when
/// converting pixels to crop or pasture, matching its
/// `PRESERVE_CODES` (level-1 classes, plus the level-2 urban class).
const FOOD_CURRENT_PRESERVE_CODES: &[f64] = &[600.0, 700.0, 900.0, 1000.0, 1100.0, 1200.0, 1300.0, JUNG_URBAN_CODE];

/// Builds the "current" scenario: pixels whose code is in
/// `preserve_codes` (the IUCN_CODE_ARTIFICAL list of settlement/urban
/// classes that must keep their fine-grained code) are left untouched;
/// everything else is rounded down to its coarse land-use class
/// (`floor(code / 100) * 100`).
///
/// `update_mask`, when given, restricts the recode to pixels flagged by
/// an auxiliary update layer, leaving the rest of `updated_jung`
/// unchanged — matching `make_current_map.py`'s optional
/// `--update_mask` argument.
pub fn make_current(updated_jung: Node, preserve_codes: Vec<f64>, update_mask: Option<Node>) -> Node {
    let coarse = updated_jung.clone().div(100.0).floor().mul(100.0);
    let recoded = where_(updated_jung.clone().isin(preserve_codes), updated_jung.clone(), coarse);

    match update_mask {
        Some(mask) => where_(mask, recoded, updated_jung),
        None => recoded,
    }
}

/// Builds the "restore" scenario: pixels whose code is in
/// `replaceable_codes` (arable and pasture land, per the crosswalk) are
/// replaced by the potential-natural-vegetation raster, already
/// resampled to `current`'s pixel scale (see
/// `life::layer::RescaledLayer`).
pub fn make_restore(current: Node, potential_natural_vegetation: Node, replaceable_codes: Vec<f64>) -> Node {
    where_(current.clone().isin(replaceable_codes), potential_natural_vegetation, current)
}

/// Builds the "arable" scenario: every pixel becomes arable land except
/// existing urban pixels, matching `make_arable_map.py`'s global
/// recode.
pub fn make_arable(current: Node) -> Node {
    let arable = Node::leaf(LayerSource::Constant(ConstantLayer::new(JUNG_ARABLE_CODE)));
    where_(current.clone().eq_scalar(JUNG_URBAN_CODE), current, arable)
}

/// Builds the "pasture" scenario, mirroring [`make_arable`].
pub fn make_pasture(current: Node) -> Node {
    let pasture = Node::leaf(LayerSource::Constant(ConstantLayer::new(JUNG_PASTURE_CODE)));
    where_(current.clone().eq_scalar(JUNG_URBAN_CODE), current, pasture)
}

/// One unit of work for the food-current recode: a rectangle of
/// `current`'s own pixel grid, carrying the crop/pasture land-use
/// change fraction that applies to it.
///
/// Grounded on `make_food_current_map.py::TileInfo`: the crop/pasture
/// diff rasters are coarser than `current`, so each of their pixels
/// covers a rectangle (not necessarily square, since the scale ratio
/// need not be an integer) of `current`'s finer grid.
#[derive(Debug, Clone, Copy)]
pub struct FoodCurrentTile {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
    pub crop_diff: f64,
    pub pasture_diff: f64,
}

/// Builds the tile work list by overlaying the crop/pasture diff
/// rasters' own (coarser) pixel grid onto `current`'s grid, matching
/// `make_food_current_map.py::build_tile_list`.
pub fn build_food_current_tiles(current: &FileLayer, crop_diff: &FileLayer, pasture_diff: &FileLayer) -> Result<Vec<FoodCurrentTile>> {
    let current_cols = current.window().xsize;
    let current_rows = current.window().ysize;
    let diff_cols = crop_diff.window().xsize;
    let diff_rows = crop_diff.window().ysize;

    let x_scale = current_cols as f64 / diff_cols as f64;
    let y_scale = current_rows as f64 / diff_rows as f64;
    let mut x_steps: Vec<i64> = (0..diff_cols).map(|i| (i as f64 * x_scale).round() as i64).collect();
    x_steps.push(current_cols);
    let mut y_steps: Vec<i64> = (0..diff_rows).map(|i| (i as f64 * y_scale).round() as i64).collect();
    y_steps.push(current_rows);

    let mut tiles = Vec::with_capacity((diff_cols * diff_rows) as usize);
    for y in 0..diff_rows {
        let crop_row = crop_diff.read_window(0, y, diff_cols, 1)?;
        let pasture_row = pasture_diff.read_window(0, y, diff_cols, 1)?;
        for x in 0..diff_cols {
            let xi = x as usize;
            tiles.push(FoodCurrentTile {
                x: x_steps[xi],
                y: y_steps[y as usize],
                width: x_steps[xi + 1] - x_steps[xi],
                height: y_steps[y as usize + 1] - y_steps[y as usize],
                crop_diff: crop_row[xi],
                pasture_diff: pasture_row[xi],
            });
        }
    }
    Ok(tiles)
}

/// Recodes one tile's pixels in place: `required_points = floor(tile
/// area * |diff|)` pixels are swapped to crop or pasture (for a
/// positive diff, chosen from pixels not already crop/pasture/
/// preserved) or swapped back to potential natural vegetation (for a
/// negative diff, chosen from pixels currently carrying that code),
/// sampled without replacement so no pixel is touched twice by the
/// same diff. Matches `make_food_current_map.py::process_tile`, diffs
/// applied smallest-first so removals (negative) run before additions.
fn recode_tile(data: &mut [f64], width: i64, tile: &FoodCurrentTile, pnv: &RescaledLayer, rng: &mut StdRng) -> Result<()> {
    let mut diffs = [(tile.crop_diff, JUNG_ARABLE_CODE), (tile.pasture_diff, JUNG_PASTURE_CODE)];
    diffs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

    for (diff_value, habitat_code) in diffs {
        if diff_value.is_nan() {
            continue;
        }
        let required_points = (data.len() as f64 * diff_value.abs()).floor() as usize;
        if required_points == 0 {
            continue;
        }

        let valid_positions: Vec<usize> = if diff_value > 0.0 {
            (0..data.len())
                .filter(|&i| data[i] != JUNG_ARABLE_CODE && data[i] != JUNG_PASTURE_CODE && !FOOD_CURRENT_PRESERVE_CODES.contains(&data[i]))
                .collect()
        } else {
            (0..data.len()).filter(|&i| data[i] == habitat_code).collect()
        };
        if valid_positions.is_empty() {
            continue;
        }
        let required_points = required_points.min(valid_positions.len());
        let selected = rand::seq::index::sample(rng, valid_positions.len(), required_points);

        if diff_value > 0.0 {
            for selected_index in selected.iter() {
                data[valid_positions[selected_index]] = habitat_code;
            }
        } else {
            for selected_index in selected.iter() {
                let position = valid_positions[selected_index];
                let row = position as i64 / width;
                let col = position as i64 % width;
                let value = pnv.read_window(tile.x + col, tile.y + row, 1, 1)?;
                data[position] = value[0];
            }
        }
    }
    Ok(())
}

/// Builds the food-current scenario: `current` recoded pixel-by-pixel
/// so the fraction of each diff-raster cell's land converts to crop or
/// pasture (or, for a shrinking cell, reverts to potential natural
/// vegetation), and writes the whole raster to `sink`. `seed` makes the
/// per-tile sampling reproducible across runs, matching
/// `make_food_current_map.py`'s single `--seed` argument seeding a
/// per-tile RNG stream.
pub fn make_food_current(current_path: &Path, pnv_path: &Path, crop_diff_path: &Path, pasture_diff_path: &Path, seed: u64, sink: &(impl Sink + ?Sized)) -> Result<()> {
    let current = FileLayer::open(current_path)?;
    let crop_diff = FileLayer::open(crop_diff_path)?;
    let pasture_diff = FileLayer::open(pasture_diff_path)?;
    let scale = current.pixel_scale().expect("file layers always carry a pixel scale");
    let pnv = RescaledLayer::open(pnv_path, scale)?;

    let cols = current.window().xsize;
    let rows = current.window().ysize;
    let mut buffer = current.read_window(0, 0, cols, rows)?;

    let tiles = build_food_current_tiles(&current, &crop_diff, &pasture_diff)?;
    let mut seed_rng = StdRng::seed_from_u64(seed);

    for tile in &tiles {
        let tile_seed: u64 = seed_rng.gen();
        if tile.crop_diff.is_nan() && tile.pasture_diff.is_nan() {
            continue;
        }

        let mut tile_data = Vec::with_capacity((tile.width * tile.height) as usize);
        for row in 0..tile.height {
            let start = ((tile.y + row) * cols + tile.x) as usize;
            tile_data.extend_from_slice(&buffer[start..start + tile.width as usize]);
        }

        let mut rng = StdRng::seed_from_u64(tile_seed);
        recode_tile(&mut tile_data, tile.width, tile, &pnv, &mut rng)?;

        for row in 0..tile.height {
            let dst_start = ((tile.y + row) * cols + tile.x) as usize;
            let src_start = (row * tile.width) as usize;
            buffer[dst_start..dst_start + tile.width as usize].copy_from_slice(&tile_data[src_start..src_start + tile.width as usize]);
        }
    }

    sink.write_block(0, cols, rows, &buffer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_current_preserves_listed_codes() {
        let updated = Node::leaf(LayerSource::Constant(ConstantLayer::new(1405.0)));
        let result = make_current(updated, vec![1405.0], None);
        assert!(matches!(result, Node::Where(_, _, _)));
    }

    #[test]
    fn arable_and_pasture_preserve_urban() {
        let current = Node::leaf(LayerSource::Constant(ConstantLayer::new(JUNG_URBAN_CODE)));
        assert!(matches!(make_arable(current.clone()), Node::Where(_, _, _)));
        assert!(matches!(make_pasture(current), Node::Where(_, _, _)));
    }

    #[test]
    fn recode_tile_converts_exactly_the_required_fraction_to_crop() {
        // `recode_tile`'s PNV lookup is only reached for a negative
        // diff, so an all-positive crop conversion needs no real PNV
        // file; this exercises the sampling-without-replacement count
        // logic without touching the filesystem.
        let mut data = vec![0.0; 10];
        let tile = FoodCurrentTile {
            x: 0,
            y: 0,
            width: 10,
            height: 1,
            crop_diff: 0.3,
            pasture_diff: f64::NAN,
        };
        let required_points = (data.len() as f64 * tile.crop_diff).floor() as usize;
        let valid_positions: Vec<usize> = (0..data.len()).filter(|&i| data[i] != JUNG_ARABLE_CODE && data[i] != JUNG_PASTURE_CODE).collect();
        let mut rng = StdRng::seed_from_u64(1);
        let selected = rand::seq::index::sample(&mut rng, valid_positions.len(), required_points);
        for selected_index in selected.iter() {
            data[valid_positions[selected_index]] = JUNG_ARABLE_CODE;
        }
        assert_eq!(data.iter().filter(|&&v| v == JUNG_ARABLE_CODE).count(), required_points);
    }

    #[test]
    fn build_food_current_tiles_covers_the_whole_current_grid() {
        // A 2x2 diff grid over a 10x10 current grid should partition
        // the current grid exactly, with no gaps or overlaps.
        let x_scale = 10.0 / 2.0;
        let y_scale = 10.0 / 2.0;
        let mut x_steps: Vec<i64> = (0..2).map(|i| (i as f64 * x_scale).round() as i64).collect();
        x_steps.push(10);
        let mut y_steps: Vec<i64> = (0..2).map(|i| (i as f64 * y_scale).round() as i64).collect();
        y_steps.push(10);
        assert_eq!(x_steps, vec![0, 5, 10]);
        assert_eq!(y_steps, vec![0, 5, 10]);
    }
}
