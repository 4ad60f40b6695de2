//! Species richness and endemism: reductions over a folder of
//! per-species AoH rasters, run through the two-stage process pool in
//! `life::stage`.
//!
//! Grounded on `predictors/species_richness.py` (stage one sums a
//! presence/absence indicator over a chunk of species rasters, stage
//! two sums the partials) and `predictors/endemism.py` (the same
//! shape, but stage one instead divides each species' own AoH by the
//! global richness raster).

use std::path::{Path, PathBuf};

use life::graph::Node;
use life::layer::{FileLayer, LayerSource};
use life::stage::{run_stage, Job, ScratchSpace};
use life::{resolve, save, AreaMode, DataType, Sink};

use crate::error::{Error, Result};

/// The internal worker subcommand `tools/life-cli` dispatches stage-one
/// jobs to.
pub const STAGE_WORKER_SUBCOMMAND: &str = "stage-worker";

/// Lists every `.tif`/`.tiff` file under `dir`, recursively, sorted for
/// a deterministic chunking order. Each file is one species' AoH
/// raster, matching the `--aohs_folder` of `richness`/`endemism`.
pub fn list_aohs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        for entry in std::fs::read_dir(&current).map_err(Error::Io)? {
            let entry = entry.map_err(Error::Io)?;
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.extension().is_some_and(|ext| ext == "tif" || ext == "tiff") {
                out.push(path);
            }
        }
    }
    out.sort();
    Ok(out)
}

/// Splits `paths` into up to `worker_count` roughly-even chunks, one
/// per stage-one job, mirroring the bounded worker pool that drains a
/// shared species queue in the reference implementation.
fn chunk(paths: Vec<PathBuf>, worker_count: usize) -> Vec<Vec<PathBuf>> {
    let worker_count = worker_count.max(1).min(paths.len().max(1));
    let mut chunks = vec![Vec::new(); worker_count];
    for (index, path) in paths.into_iter().enumerate() {
        chunks[index % worker_count].push(path);
    }
    chunks.retain(|c| !c.is_empty());
    chunks
}

/// Stage one for richness: sums a presence/absence (`aoh != 0`)
/// indicator across every raster in `paths`, matching
/// `species_richness.py`'s per-worker accumulator.
pub fn richness_indicator(paths: &[PathBuf]) -> Result<Node> {
    let mut acc: Option<Node> = None;
    for path in paths {
        let indicator = Node::leaf(LayerSource::File(FileLayer::open(path)?)).ne_scalar(0.0);
        acc = Some(match acc {
            Some(running) => running.add_layer(indicator),
            None => indicator,
        });
    }
    acc.ok_or(Error::EmptyAccumulation)
}

/// Stage one for endemism: each species' own AoH divided by the
/// precomputed global richness raster, summed across `paths`, matching
/// `endemism.py`'s per-worker accumulator.
pub fn endemism_ratio(paths: &[PathBuf], species_richness: &Path) -> Result<Node> {
    let richness = Node::leaf(LayerSource::File(FileLayer::open(species_richness)?));
    let mut acc: Option<Node> = None;
    for path in paths {
        let aoh = Node::leaf(LayerSource::File(FileLayer::open(path)?));
        let ratio = aoh.div_layer(richness.clone());
        acc = Some(match acc {
            Some(running) => running.add_layer(ratio),
            None => ratio,
        });
    }
    acc.ok_or(Error::EmptyAccumulation)
}

/// Stage two: sums every stage-one partial, treating NaN as 0 (a pixel
/// outside a chunk's own union footprint reads back as 0 already, but
/// the reference implementation's `nan_to_num` before the final add is
/// kept here as the same belt-and-braces guard).
pub fn merge_partials(paths: &[PathBuf]) -> Result<Node> {
    let mut acc: Option<Node> = None;
    for path in paths {
        let layer = Node::leaf(LayerSource::File(FileLayer::open(path)?)).nan_to_num(0.0);
        acc = Some(match acc {
            Some(running) => running.add_layer(layer),
            None => layer,
        });
    }
    acc.ok_or(Error::EmptyAccumulation)
}

/// Builds the stage-one `Job` list for `chunks`, each invoking
/// [`STAGE_WORKER_SUBCOMMAND`] with `--mode mode`, one `--input` per
/// raster in the chunk, and (for endemism) `--species-richness`.
fn stage_jobs(mode: &str, chunks: Vec<Vec<PathBuf>>, species_richness: Option<&Path>, scratch: &ScratchSpace) -> Vec<Job> {
    chunks
        .into_iter()
        .enumerate()
        .map(|(index, paths)| {
            let output = scratch.job_output(&format!("partial-{index}.tif"));
            let mut args = vec!["--mode".to_string(), mode.to_string()];
            for path in &paths {
                args.push("--input".to_string());
                args.push(path.to_string_lossy().into_owned());
            }
            if let Some(richness) = species_richness {
                args.push("--species-richness".to_string());
                args.push(richness.to_string_lossy().into_owned());
            }
            args.push("--output".to_string());
            args.push(output.to_string_lossy().into_owned());
            Job { args, output }
        })
        .collect()
}

/// Runs the full two-stage pipeline: partitions `paths` across
/// `worker_count` stage-one OS-process workers (`mode` is `"richness"`
/// or `"endemism"`), then returns the lazy expression summing their
/// partials. The caller resolves and writes this to the final output.
pub fn run_two_stage(mode: &str, paths: Vec<PathBuf>, species_richness: Option<&Path>, worker_count: usize) -> Result<Node> {
    if paths.is_empty() {
        return Err(Error::EmptyAccumulation);
    }
    let scratch = ScratchSpace::new(&format!("life-{mode}-"))?;
    let chunks = chunk(paths, worker_count);
    let jobs = stage_jobs(mode, chunks, species_richness, &scratch);
    let partials = run_stage(STAGE_WORKER_SUBCOMMAND, jobs, worker_count)?;
    merge_partials(&partials)
}

/// Resolves `expression` over the union of its inputs' footprints and
/// streams it to `sink`, for both the stage-one worker's own output and
/// the final stage-two reduction.
pub fn resolve_and_save(expression: &Node, sink: &(impl Sink + ?Sized)) -> Result<()> {
    let (_area, cols, rows) = resolve(expression, AreaMode::Union)?;
    save(expression, cols, rows, sink, DataType::Float64)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn richness_indicator_rejects_an_empty_list() {
        assert!(matches!(richness_indicator(&[]), Err(Error::EmptyAccumulation)));
    }

    #[test]
    fn merge_partials_rejects_an_empty_list() {
        assert!(matches!(merge_partials(&[]), Err(Error::EmptyAccumulation)));
    }

    #[test]
    fn chunk_distributes_paths_round_robin_and_drops_empty_chunks() {
        let paths: Vec<PathBuf> = (0..5).map(|i| PathBuf::from(format!("species-{i}.tif"))).collect();
        let chunks = chunk(paths, 8);
        assert_eq!(chunks.len(), 5);
        assert!(chunks.iter().all(|c| c.len() == 1));

        let paths: Vec<PathBuf> = (0..5).map(|i| PathBuf::from(format!("species-{i}.tif"))).collect();
        let chunks = chunk(paths, 2);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks.iter().map(|c| c.len()).sum::<usize>(), 5);
    }

    #[test]
    fn stage_jobs_carry_mode_inputs_and_output() {
        let scratch = ScratchSpace::new("life-test-").unwrap();
        let chunks = vec![vec![PathBuf::from("a.tif"), PathBuf::from("b.tif")]];
        let jobs = stage_jobs("richness", chunks, None, &scratch);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].args[0], "--mode");
        assert_eq!(jobs[0].args[1], "richness");
        assert!(jobs[0].args.contains(&"a.tif".to_string()));
        assert!(jobs[0].args.contains(&"b.tif".to_string()));
    }
}
