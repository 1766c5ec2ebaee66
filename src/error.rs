use thiserror::Error;

/// Application error types.
///
/// None of these are fatal inside the scoring core: calculators log them and
/// degrade to an absent value.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Unknown feature: {0}")]
    UnknownFeature(String),

    #[error("Catalog load error: {0}")]
    CatalogLoad(String),

    #[error("Failed to compute {feature}: {reason}")]
    ComputationFailure { feature: String, reason: String },

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl AppError {
    /// Shorthand for a per-feature arithmetic fault.
    pub fn computation(feature: &str, reason: impl Into<String>) -> Self {
        AppError::ComputationFailure {
            feature: feature.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
