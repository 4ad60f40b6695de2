//! Crosswalk table mapping land-cover raster codes to the IUCN habitat
//! classes they represent.
//!
//! Grounded on the `crosswalk.csv` tables loaded throughout
//! `prepare_layers/*.py` and `persistence/__init__.py`: a flat
//! `code,habitat` table read once and consulted for the rest of a run.
//! `make_restore_map.py` replaces matched pixels with the potential
//! natural vegetation raster directly (see `life::layer::RescaledLayer`)
//! rather than through a second code-to-code crosswalk.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
struct HabitatRow {
    code: i32,
    habitat: String,
}

/// Maps raster land-cover codes to the IUCN habitat classes they
/// represent. A single code can map to more than one habitat class
/// (e.g. "4.4" forest-plantation sometimes also counting as "1.4").
#[derive(Debug, Clone, Default)]
pub struct HabitatCrosswalk {
    code_to_habitats: HashMap<i32, Vec<String>>,
}

impl HabitatCrosswalk {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path).map_err(Error::Csv)?;
        let mut code_to_habitats: HashMap<i32, Vec<String>> = HashMap::new();
        for row in reader.deserialize() {
            let row: HabitatRow = row.map_err(Error::Csv)?;
            code_to_habitats.entry(row.code).or_default().push(row.habitat);
        }
        Ok(HabitatCrosswalk { code_to_habitats })
    }

    /// Every raster code whose crosswalk entry includes any of `habitats`.
    pub fn codes_for_habitats(&self, habitats: &[&str]) -> Vec<f64> {
        self.code_to_habitats
            .iter()
            .filter(|(_, h)| h.iter().any(|entry| habitats.contains(&entry.as_str())))
            .map(|(code, _)| *code as f64)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn habitat_crosswalk_groups_codes_by_class() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "code,habitat").unwrap();
        writeln!(file, "100,1.1").unwrap();
        writeln!(file, "100,1.4").unwrap();
        writeln!(file, "200,2.1").unwrap();
        let crosswalk = HabitatCrosswalk::load(file.path()).unwrap();
        let mut codes = crosswalk.codes_for_habitats(&["1.1"]);
        codes.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(codes, vec![100.0]);
    }
}
