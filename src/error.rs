use thiserror::Error;

pub type Result<T> = std::result::Result<T, TrackingError>;

/// Every failure here is local to one tick or one calibration attempt.
#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("need at least {required} visible markers, got {found}")]
    InsufficientObservations { required: usize, found: usize },

    #[error("no correspondence with at least {min_visible} matched markers")]
    NoCorrespondence { min_visible: usize },

    #[error("a single matched marker cannot fix the pose of a {markers}-marker tool")]
    UnvalidatedMatch { markers: usize },

    #[error("degenerate rigid solve: {model} model points vs {observed} observed points")]
    SolveDegenerate { model: usize, observed: usize },

    #[error("calibration needs at least 3 markers, got {0}")]
    CalibrationInsufficientPoints(usize),

    #[error("no tool model installed")]
    MissingModel,

    #[error("invalid tool model: {0}")]
    InvalidModel(String),

    #[error("malformed configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
