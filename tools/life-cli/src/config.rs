//! Run configuration loaded from JSON: where each named experiment's
//! input rasters/vectors live, and (out-of-scope beyond the seam) IUCN
//! API credentials.
//!
//! Grounded on spec section 6's Configuration JSON
//! (`{experiments:{NAME:{habitat,elevation,area,range,translator,
//! iucn_batch?}},iucn:{api_key?}}`) and on `tools/tileserver`'s
//! `serde_json`-loaded config pattern.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Which land-cover product's pixel codes `habitat` uses, recorded for
/// `HabitatTranslator` selection. IUCN habitat-class-to-raster-code
/// ingestion itself lives in `iucn_batch` (out of scope to generate,
/// in scope to consume), so this is presently descriptive metadata.
///
/// Grounded on `persistence/__init__.py::LandModel`/`JungModel`/
/// `ESACCIModel`.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Translator {
    Jung,
    Esacci,
}

/// One named experiment: the input rasters/vectors an `aoh` run
/// resolves `--taxid`/`--seasonality` against.
#[derive(Debug, Deserialize)]
pub struct Experiment {
    pub habitat: PathBuf,
    pub elevation: PathBuf,
    pub area: PathBuf,
    pub range: PathBuf,
    pub translator: Translator,
    /// A pre-resolved per-species lookup (raster habitat codes +
    /// elevation bounds, keyed by taxid). IUCN batch/DB ingestion
    /// itself is out of scope; this crate consumes the batch file
    /// rather than producing it.
    pub iucn_batch: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
pub struct IucnConfig {
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub experiments: HashMap<String, Experiment>,
    #[serde(default)]
    pub iucn: IucnConfig,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn experiment(&self, name: &str) -> anyhow::Result<&Experiment> {
        self.experiments.get(name).ok_or_else(|| anyhow::anyhow!("no experiment named '{name}' in the run configuration"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_an_experiment_and_the_iucn_block() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(
            &mut file,
            br#"{
                "experiments": {
                    "birds-2024": {
                        "habitat": "habitat.tif",
                        "elevation": "elevation.tif",
                        "area": "area.tif",
                        "range": "ranges.gpkg",
                        "translator": "jung",
                        "iucn_batch": "batch.csv"
                    }
                },
                "iucn": { "api_key": "secret" }
            }"#,
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        let experiment = config.experiment("birds-2024").unwrap();
        assert_eq!(experiment.translator, Translator::Jung);
        assert_eq!(experiment.iucn_batch, Some(PathBuf::from("batch.csv")));
        assert_eq!(config.iucn.api_key.as_deref(), Some("secret"));
        assert!(config.experiment("missing").is_err());
    }

    #[test]
    fn iucn_block_defaults_when_absent() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(
            &mut file,
            br#"{"experiments": {}}"#,
        )
        .unwrap();
        let config = Config::load(file.path()).unwrap();
        assert!(config.iucn.api_key.is_none());
    }
}
