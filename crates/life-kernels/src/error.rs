use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("historic area-of-habitat is zero, persistence is undefined")]
    ZeroHistoricAoH,

    #[error("unknown extinction curve kind: {0}")]
    UnknownCurve(String),

    #[error("migratory species is missing its {0} season AoH")]
    MissingSeason(&'static str),

    #[error("no species-batch entry for taxid {0}")]
    NoSpeciesBatchEntry(String),

    #[error("malformed habitat codes in species-batch row for taxid {0}")]
    InvalidSpeciesBatch(String),

    #[error("unknown seasonality: {0}")]
    UnknownSeasonality(String),

    #[error("no input rasters to accumulate")]
    EmptyAccumulation,

    #[error(transparent)]
    Life(#[from] life::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
