use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No intersection between layers")]
    NoIntersection,
    #[error("Layers do not share a compatible pixel scale")]
    ScaleMismatch,
    #[error("Window does not align to the pixel grid: {0}")]
    WindowMisalignment(String),
    #[error("Layer datatype mismatch: expected {expected}, found {found}")]
    DatatypeMismatch { expected: String, found: String },
    #[error("No features matched filter: {0}")]
    NoFeatures(String),
    #[error("Historic area of habitat is zero, cannot compute persistence")]
    ZeroHistoricAoH,
    #[error("Worker process failed with exit code {exit_code}")]
    WorkerFailed { exit_code: i32 },
    #[error("Geo error: {0}")]
    Geo(#[from] geo::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
