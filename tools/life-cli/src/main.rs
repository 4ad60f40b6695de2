use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use env_logger::{Env, TimestampPrecision};
use indicatif::{MultiProgress, ProgressBar};
use indicatif_log_bridge::LogWrapper;

use life::graph::Node;
use life::layer::{FileLayer, LayerSource, UniformAreaRowLayer, VectorRangeLayer};
use life::{resolve, save, sum, AreaMode, DataType, HasExtent, Layer, RescaledLayer};
use life_kernels::aoh::{aoh_expression, aoh_sum, AohInputs, Seasonality};
use life_kernels::crosswalk::HabitatCrosswalk;
use life_kernels::deltap::{delta_p_expression, ExtinctionCurve, SeasonRasters, SpeciesSeasons};
use life_kernels::scenario;
use life_kernels::species_batch::SpeciesBatch;

mod config;
mod sink;

use config::Config;
use sink::GeoTiffSink;

pub type Result<T> = anyhow::Result<T>;

/// Computes area-of-habitat, persistence delta, species richness and
/// land-use scenario rasters for biodiversity-persistence modeling.
#[derive(Parser, Debug)]
#[clap(name = "life", about = "Raster algebra engine for biodiversity persistence modeling")]
struct Opt {
    #[arg(long, global = true)]
    no_progress: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Computes the area-of-habitat for one species/season.
    Aoh {
        /// Run configuration (experiment input paths, IUCN settings).
        #[arg(long)]
        config: PathBuf,
        /// Which `config.experiments` entry to resolve inputs from.
        #[arg(long)]
        experiment: String,
        #[arg(long)]
        taxid: String,
        /// "resident", "breeding", or "nonbreeding".
        #[arg(long)]
        seasonality: String,
        /// Sums to a single figure instead of writing a raster when set.
        #[arg(long)]
        sum_only: bool,
        /// Directory `{taxid}_{SEASON}.tif` is written under, when given.
        #[arg(long)]
        geotiffs: Option<PathBuf>,
    },
    /// Computes the persistence delta between a species' current and
    /// scenario area-of-habitat rasters.
    Deltap {
        #[arg(long)]
        taxid: String,
        /// Set for a migratory species (breeding + nonbreeding seasons)
        /// instead of a resident one.
        #[arg(long)]
        migratory: bool,
        /// Directory holding `{taxid}_{SEASON}.tif` current-AoH rasters.
        #[arg(long)]
        current_path: PathBuf,
        /// Directory holding the scenario-AoH rasters; a missing file is
        /// treated as the species going extinct under that scenario.
        #[arg(long)]
        scenario_path: PathBuf,
        /// Directory holding the historic-AoH rasters.
        #[arg(long)]
        historic_path: PathBuf,
        /// `0.1`, `0.25`, `0.5`, `1.0`, or `gompertz`.
        #[arg(long)]
        z: String,
        #[arg(long)]
        sum_only: bool,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Sums a presence/absence indicator across a folder of per-species
    /// AoH rasters via the two-stage stage runner.
    Richness {
        #[arg(long)]
        aohs_folder: PathBuf,
        #[arg(long)]
        output: PathBuf,
        #[arg(short = 'j', long)]
        worker_count: Option<usize>,
    },
    /// Sums each species' own AoH divided by a precomputed richness
    /// raster across a folder of per-species AoH rasters, via the
    /// two-stage stage runner.
    Endemism {
        #[arg(long)]
        aohs_folder: PathBuf,
        #[arg(long)]
        species_richness: PathBuf,
        #[arg(long)]
        output: PathBuf,
        #[arg(short = 'j', long)]
        worker_count: Option<usize>,
    },
    /// Recodes a land-cover map into the "current" scenario.
    MakeCurrent {
        #[arg(long)]
        current: PathBuf,
        #[arg(long)]
        crosswalk: PathBuf,
        #[arg(long)]
        update_mask: Option<PathBuf>,
        #[arg(long)]
        output: PathBuf,
        #[arg(short = 'j', long)]
        worker_count: Option<usize>,
    },
    /// Recodes arable/pasture/urban pixels into the "restore" scenario
    /// using a resampled potential-natural-vegetation raster.
    MakeRestore {
        #[arg(long)]
        current: PathBuf,
        #[arg(long)]
        pnv: PathBuf,
        #[arg(long)]
        crosswalk: PathBuf,
        #[arg(long)]
        output: PathBuf,
        #[arg(short = 'j', long)]
        worker_count: Option<usize>,
    },
    /// Recodes every non-urban pixel into the "arable" scenario.
    MakeArable {
        #[arg(long)]
        current: PathBuf,
        /// Accepted for symmetry with `make-current`/`make-restore`; the
        /// arable recode is a global constant, not crosswalk-driven.
        #[arg(long)]
        crosswalk: Option<PathBuf>,
        #[arg(long)]
        output: PathBuf,
        #[arg(short = 'j', long)]
        worker_count: Option<usize>,
    },
    /// Recodes every non-urban pixel into the "pasture" scenario.
    MakePasture {
        #[arg(long)]
        current: PathBuf,
        #[arg(long)]
        crosswalk: Option<PathBuf>,
        #[arg(long)]
        output: PathBuf,
        #[arg(short = 'j', long)]
        worker_count: Option<usize>,
    },
    /// Builds the stochastic food-current scenario: `current_lvl1`
    /// recoded pixel-by-pixel against a coarser crop/pasture
    /// land-use-change diff raster pair.
    MakeFoodCurrent {
        #[arg(long)]
        current_lvl1: PathBuf,
        #[arg(long)]
        pnv: PathBuf,
        #[arg(long)]
        crop_diff: PathBuf,
        #[arg(long)]
        pasture_diff: PathBuf,
        #[arg(long)]
        seed: u64,
        #[arg(long)]
        output: PathBuf,
        #[arg(short = 'j', long)]
        worker_count: Option<usize>,
    },
    /// Aggregates a per-pixel raster into one value per H3 cell.
    #[cfg(feature = "h3")]
    H3Aggregate {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        resolution: u8,
        #[arg(long)]
        output: PathBuf,
        /// Recorded in the Parquet file's metadata.
        #[arg(long)]
        species: String,
        #[arg(long)]
        source: String,
    },
    /// Internal worker entry point for the richness/endemism stage
    /// runner. Not meant to be invoked directly; `life::stage::run_stage`
    /// dispatches to this when re-invoking the current binary.
    #[command(hide = true)]
    StageWorker {
        /// "richness" or "endemism".
        #[arg(long)]
        mode: String,
        #[arg(long = "input", required = true)]
        inputs: Vec<PathBuf>,
        #[arg(long)]
        species_richness: Option<PathBuf>,
        #[arg(long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let opt = Opt::parse();

    let logger = env_logger::Builder::from_env(Env::default().default_filter_or("warn")).format_timestamp(Some(TimestampPrecision::Millis)).build();
    let multi = MultiProgress::new();
    let level = logger.filter();
    LogWrapper::new(multi.clone(), logger).try_init().ok();
    log::set_max_level(level);

    let gdal_config = geo::RuntimeConfiguration::builder()
        .config_options(vec![("GDAL_DISABLE_READDIR_ON_OPEN".into(), "YES".into()), ("GDAL_PAM_ENABLED".into(), "NO".into())])
        .build();
    gdal_config.apply()?;

    let progress = if opt.no_progress { None } else { Some(multi.add(ProgressBar::new_spinner())) };

    if let Some(worker_count) = single_process_worker_count(&opt.command) {
        rayon::ThreadPoolBuilder::new().num_threads(worker_count).build_global().ok();
    }

    match opt.command {
        Command::Aoh {
            config,
            experiment,
            taxid,
            seasonality,
            sum_only,
            geotiffs,
        } => run_aoh(config, experiment, taxid, seasonality, sum_only, geotiffs)?,
        Command::Deltap {
            taxid,
            migratory,
            current_path,
            scenario_path,
            historic_path,
            z,
            sum_only,
            output,
        } => run_deltap(taxid, migratory, current_path, scenario_path, historic_path, z, sum_only, output)?,
        Command::Richness { aohs_folder, output, worker_count } => run_richness(aohs_folder, output, worker_count)?,
        Command::Endemism {
            aohs_folder,
            species_richness,
            output,
            worker_count,
        } => run_endemism(aohs_folder, species_richness, output, worker_count)?,
        Command::MakeCurrent {
            current,
            crosswalk,
            update_mask,
            output,
            worker_count: _,
        } => run_make_current(current, crosswalk, update_mask, output)?,
        Command::MakeRestore {
            current,
            pnv,
            crosswalk,
            output,
            worker_count: _,
        } => run_make_restore(current, pnv, crosswalk, output)?,
        Command::MakeArable {
            current,
            crosswalk: _,
            output,
            worker_count: _,
        } => run_make_arable(current, output)?,
        Command::MakePasture {
            current,
            crosswalk: _,
            output,
            worker_count: _,
        } => run_make_pasture(current, output)?,
        Command::MakeFoodCurrent {
            current_lvl1,
            pnv,
            crop_diff,
            pasture_diff,
            seed,
            output,
            worker_count: _,
        } => run_make_food_current(current_lvl1, pnv, crop_diff, pasture_diff, seed, output)?,
        #[cfg(feature = "h3")]
        Command::H3Aggregate {
            input,
            resolution,
            output,
            species,
            source,
        } => run_h3_aggregate(input, resolution, output, species, source)?,
        Command::StageWorker { mode, inputs, species_richness, output } => run_stage_worker(mode, inputs, species_richness, output)?,
    }

    if let Some(p) = progress {
        p.finish_with_message("done");
    }

    Ok(())
}

/// The `-j` worker count for commands that parallelize a single-process
/// evaluation via `life::save`'s rayon-backed writer, or `None` for
/// commands whose parallelism is the OS-process stage runner instead
/// (`richness`/`endemism`) or that carry no such flag.
fn single_process_worker_count(command: &Command) -> Option<usize> {
    match command {
        Command::MakeCurrent { worker_count, .. }
        | Command::MakeRestore { worker_count, .. }
        | Command::MakeArable { worker_count, .. }
        | Command::MakePasture { worker_count, .. }
        | Command::MakeFoodCurrent { worker_count, .. } => *worker_count,
        _ => None,
    }
}

fn open_file_node(path: &Path) -> Result<Node> {
    Ok(Node::leaf(LayerSource::File(FileLayer::open(path)?)))
}

/// Opens a per-pixel-area raster, preferring the shrunk single-column
/// representation (`UniformAreaRowLayer`) when the file qualifies, and
/// falling back to a plain file layer otherwise.
fn open_pixel_area_node(path: &Path) -> Result<Node> {
    if path.extension().is_some_and(|e| e == "tif" || e == "tiff") {
        if let Ok(layer) = UniformAreaRowLayer::open(path) {
            return Ok(Node::leaf(LayerSource::UniformAreaRow(layer)));
        }
    }
    open_file_node(path)
}

/// Resolves `expression`'s working area under `area_mode`, writes it to
/// a GeoTIFF at `output`, and flushes the sink.
fn write_raster(expression: &Node, area_mode: AreaMode, output: &Path) -> Result<()> {
    let (area, cols, rows) = resolve(expression, area_mode)?;
    let scale = expression.pixel_scale().ok_or_else(|| anyhow::anyhow!("expression carries no pixel scale"))?;
    let sink = GeoTiffSink::new(output.to_path_buf(), "EPSG:4326", area.left, area.top, scale.xstep, scale.ystep, cols, rows);
    save(expression, cols, rows, &sink, DataType::Float64)?;
    sink.finish()?;
    Ok(())
}

fn run_aoh(config_path: PathBuf, experiment_name: String, taxid: String, seasonality: String, sum_only: bool, geotiffs: Option<PathBuf>) -> Result<()> {
    let config = Config::load(&config_path)?;
    let experiment = config.experiment(&experiment_name)?;
    let seasonality = Seasonality::parse(&seasonality)?;

    let iucn_batch = experiment.iucn_batch.as_ref().ok_or_else(|| anyhow::anyhow!("experiment '{experiment_name}' has no iucn_batch configured"))?;
    let species_batch = SpeciesBatch::load(iucn_batch)?;
    let entry = species_batch.lookup(&taxid)?;

    let habitat_node = open_file_node(&experiment.habitat)?;
    let elevation_node = open_file_node(&experiment.elevation)?;
    let scale = habitat_node.pixel_scale().ok_or_else(|| anyhow::anyhow!("habitat raster carries no pixel scale"))?;
    let projection = "EPSG:4326";

    let where_filter = seasonality.range_where_filter(&taxid);
    let range_node = Node::leaf(LayerSource::VectorRange(VectorRangeLayer::open(&experiment.range, &where_filter, scale, projection)?));
    let pixel_area_node = open_pixel_area_node(&experiment.area)?;

    let expression = aoh_expression(AohInputs {
        habitat: habitat_node,
        elevation: elevation_node,
        pixel_area: pixel_area_node,
        range_mask: range_node,
        habitat_codes: entry.habitat_codes.clone(),
        elevation_range: entry.elevation_range,
    });

    if sum_only || geotiffs.is_none() {
        println!("{}", aoh_sum(expression)?);
        return Ok(());
    }

    let output_dir = geotiffs.expect("checked above");
    std::fs::create_dir_all(&output_dir)?;
    let output = output_dir.join(format!("{taxid}_{}.tif", seasonality.tag()));
    write_raster(&expression, AreaMode::Intersection, &output)
}

fn parse_curve(z: &str) -> Result<ExtinctionCurve> {
    if z.eq_ignore_ascii_case("gompertz") {
        return Ok(ExtinctionCurve::Gompertz);
    }
    let value: f64 = z.parse().map_err(|_| anyhow::anyhow!("--z must be 'gompertz' or one of 0.1/0.25/0.5/1.0, got '{z}'"))?;
    Ok(ExtinctionCurve::power(value)?)
}

/// Opens a species' current/scenario/historic rasters for one season,
/// keyed by the `{taxid}_{SEASON}.tif` naming convention `aoh --geotiffs`
/// writes. A scenario raster missing from `scenario_path` is treated as
/// the species going extinct under that scenario.
fn open_season_rasters(taxid: &str, season: Seasonality, current_path: &Path, scenario_path: &Path, historic_path: &Path) -> Result<SeasonRasters> {
    let filename = format!("{taxid}_{}.tif", season.tag());
    let current = open_file_node(&current_path.join(&filename))?;
    let historic = open_file_node(&historic_path.join(&filename))?;

    let scenario_file = scenario_path.join(&filename);
    let scenario = if scenario_file.exists() { open_file_node(&scenario_file)? } else { SeasonRasters::missing_scenario() };

    Ok(SeasonRasters::new(current, scenario, &historic)?)
}

#[allow(clippy::too_many_arguments)]
fn run_deltap(taxid: String, migratory: bool, current_path: PathBuf, scenario_path: PathBuf, historic_path: PathBuf, z: String, sum_only: bool, output: Option<PathBuf>) -> Result<()> {
    let curve = parse_curve(&z)?;

    let species = if migratory {
        SpeciesSeasons {
            breeding: Some(open_season_rasters(&taxid, Seasonality::Breeding, &current_path, &scenario_path, &historic_path)?),
            nonbreeding: Some(open_season_rasters(&taxid, Seasonality::Nonbreeding, &current_path, &scenario_path, &historic_path)?),
            resident: None,
        }
    } else {
        SpeciesSeasons {
            resident: Some(open_season_rasters(&taxid, Seasonality::Resident, &current_path, &scenario_path, &historic_path)?),
            ..Default::default()
        }
    };

    let expression = delta_p_expression(species, curve)?;

    if sum_only || output.is_none() {
        let (_area, cols, rows) = resolve(&expression, AreaMode::Intersection)?;
        println!("{}", sum(&expression, cols, rows)?);
        return Ok(());
    }

    write_raster(&expression, AreaMode::Intersection, &output.expect("checked above"))
}

fn run_richness(aohs_folder: PathBuf, output: PathBuf, worker_count: Option<usize>) -> Result<()> {
    let paths = life_kernels::richness::list_aohs(&aohs_folder)?;
    let worker_count = worker_count.unwrap_or_else(num_cpus::get);
    let expression = life_kernels::richness::run_two_stage("richness", paths, None, worker_count)?;
    write_raster(&expression, AreaMode::Union, &output)
}

fn run_endemism(aohs_folder: PathBuf, species_richness: PathBuf, output: PathBuf, worker_count: Option<usize>) -> Result<()> {
    let paths = life_kernels::richness::list_aohs(&aohs_folder)?;
    let worker_count = worker_count.unwrap_or_else(num_cpus::get);
    let expression = life_kernels::richness::run_two_stage("endemism", paths, Some(&species_richness), worker_count)?;
    write_raster(&expression, AreaMode::Union, &output)
}

fn run_stage_worker(mode: String, inputs: Vec<PathBuf>, species_richness: Option<PathBuf>, output: PathBuf) -> Result<()> {
    let expression = match mode.as_str() {
        "richness" => life_kernels::richness::richness_indicator(&inputs)?,
        "endemism" => {
            let species_richness = species_richness.ok_or_else(|| anyhow::anyhow!("endemism stage worker requires --species-richness"))?;
            life_kernels::richness::endemism_ratio(&inputs, &species_richness)?
        }
        other => anyhow::bail!("unknown stage-worker mode '{other}'"),
    };
    write_raster(&expression, AreaMode::Union, &output)
}

fn run_make_current(current: PathBuf, crosswalk: PathBuf, update_mask: Option<PathBuf>, output: PathBuf) -> Result<()> {
    let current_node = open_file_node(&current)?;
    let crosswalk = HabitatCrosswalk::load(&crosswalk)?;
    let preserve_codes = crosswalk.codes_for_habitats(scenario::IUCN_CODE_ARTIFICAL);
    let mask_node = update_mask.as_deref().map(open_file_node).transpose()?;

    let expression = scenario::make_current(current_node, preserve_codes, mask_node);
    write_raster(&expression, AreaMode::Intersection, &output)
}

fn run_make_restore(current: PathBuf, pnv: PathBuf, crosswalk: PathBuf, output: PathBuf) -> Result<()> {
    let current_node = open_file_node(&current)?;
    let scale = current_node.pixel_scale().ok_or_else(|| anyhow::anyhow!("current raster carries no pixel scale"))?;
    let pnv_node = Node::leaf(LayerSource::Rescaled(Box::new(RescaledLayer::open(&pnv, scale)?)));
    let crosswalk = HabitatCrosswalk::load(&crosswalk)?;
    let replaceable_codes = crosswalk.codes_for_habitats(scenario::IUCN_CODE_REPLACEMENTS);

    let expression = scenario::make_restore(current_node, pnv_node, replaceable_codes);
    write_raster(&expression, AreaMode::Intersection, &output)
}

fn run_make_arable(current: PathBuf, output: PathBuf) -> Result<()> {
    let current_node = open_file_node(&current)?;
    let expression = scenario::make_arable(current_node);
    write_raster(&expression, AreaMode::Intersection, &output)
}

fn run_make_pasture(current: PathBuf, output: PathBuf) -> Result<()> {
    let current_node = open_file_node(&current)?;
    let expression = scenario::make_pasture(current_node);
    write_raster(&expression, AreaMode::Intersection, &output)
}

fn run_make_food_current(current_lvl1: PathBuf, pnv: PathBuf, crop_diff: PathBuf, pasture_diff: PathBuf, seed: u64, output: PathBuf) -> Result<()> {
    let current = FileLayer::open(&current_lvl1)?;
    let scale = current.pixel_scale().ok_or_else(|| anyhow::anyhow!("current raster carries no pixel scale"))?;
    let area = current.area();
    let cols = current.window().xsize;
    let rows = current.window().ysize;
    drop(current);

    let sink = GeoTiffSink::new(output, "EPSG:4326", area.left, area.top, scale.xstep, scale.ystep, cols, rows);
    scenario::make_food_current(&current_lvl1, &pnv, &crop_diff, &pasture_diff, seed, &sink)?;
    sink.finish()?;
    Ok(())
}

#[cfg(feature = "h3")]
fn run_h3_aggregate(input: PathBuf, resolution: u8, output: PathBuf, species: String, source: String) -> Result<()> {
    let expression = open_file_node(&input)?;
    let scale = expression.pixel_scale().ok_or_else(|| anyhow::anyhow!("input raster carries no pixel scale"))?;
    let area = expression.area().ok_or_else(|| anyhow::anyhow!("input raster carries no extent"))?;
    let resolution = h3o::Resolution::try_from(resolution).map_err(|e| anyhow::anyhow!("invalid H3 resolution: {e}"))?;

    let cells = life_kernels::h3agg::cells_within(area, resolution);
    let aggregates = life_kernels::h3agg::aggregate(&expression, &cells, scale)?;

    let timestamp = std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).map(|d| d.as_secs().to_string()).unwrap_or_else(|_| "unknown".to_string());
    let host = std::env::var("HOSTNAME").unwrap_or_else(|_| "unknown".to_string());
    let commit = option_env!("VERGEN_GIT_SHA").unwrap_or("unknown").to_string();
    let metadata = life_kernels::h3agg::RunMetadata { species, source, timestamp, host, commit };

    life_kernels::h3agg::write_parquet(&aggregates, &metadata, &output)?;
    Ok(())
}
