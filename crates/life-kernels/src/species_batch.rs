//! A pre-resolved per-species lookup table driving `aoh --taxid`:
//! raster habitat codes and elevation bounds, keyed by taxid.
//!
//! IUCN batch/DB ingestion that *produces* this table is out of scope
//! (an external collaborator); this crate only consumes the resulting
//! CSV, the way `crosswalk.rs` consumes a crosswalk CSV rather than
//! deriving one from IUCN habitat-code metadata itself.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::aoh::ElevationRange;
use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
struct SpeciesBatchRow {
    taxid: String,
    /// `;`-separated raster habitat codes, already resolved against a
    /// `HabitatTranslator`.
    habitat_codes: String,
    elevation_lower: Option<f64>,
    elevation_upper: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct SpeciesBatchEntry {
    pub habitat_codes: Vec<f64>,
    pub elevation_range: ElevationRange,
}

/// Keyed by taxid (IUCN `id_no`, kept as a string since some IDs carry
/// subspecies suffixes).
#[derive(Debug, Clone, Default)]
pub struct SpeciesBatch {
    by_taxid: HashMap<String, SpeciesBatchEntry>,
}

impl SpeciesBatch {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path).map_err(Error::Csv)?;
        let mut by_taxid = HashMap::new();
        for row in reader.deserialize() {
            let row: SpeciesBatchRow = row.map_err(Error::Csv)?;
            let habitat_codes = row
                .habitat_codes
                .split(';')
                .filter(|code| !code.is_empty())
                .map(|code| code.parse::<f64>())
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|_| Error::InvalidSpeciesBatch(row.taxid.clone()))?;
            by_taxid.insert(
                row.taxid,
                SpeciesBatchEntry {
                    habitat_codes,
                    elevation_range: ElevationRange {
                        lower: row.elevation_lower,
                        upper: row.elevation_upper,
                    },
                },
            );
        }
        Ok(SpeciesBatch { by_taxid })
    }

    pub fn lookup(&self, taxid: &str) -> Result<&SpeciesBatchEntry> {
        self.by_taxid.get(taxid).ok_or_else(|| Error::NoSpeciesBatchEntry(taxid.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_habitat_codes_and_elevation_bounds() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "taxid,habitat_codes,elevation_lower,elevation_upper").unwrap();
        writeln!(file, "12345,100;200,0,1000").unwrap();
        writeln!(file, "99999,300,,").unwrap();

        let batch = SpeciesBatch::load(file.path()).unwrap();

        let entry = batch.lookup("12345").unwrap();
        assert_eq!(entry.habitat_codes, vec![100.0, 200.0]);
        assert_eq!(entry.elevation_range.lower, Some(0.0));
        assert_eq!(entry.elevation_range.upper, Some(1000.0));

        let unbounded = batch.lookup("99999").unwrap();
        assert_eq!(unbounded.elevation_range.lower, None);
        assert_eq!(unbounded.elevation_range.upper, None);
    }

    #[test]
    fn missing_taxid_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "taxid,habitat_codes,elevation_lower,elevation_upper").unwrap();
        writeln!(file, "1,100,,").unwrap();
        let batch = SpeciesBatch::load(file.path()).unwrap();
        assert!(matches!(batch.lookup("2"), Err(Error::NoSpeciesBatchEntry(taxid)) if taxid == "2"));
    }
}
