use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AssociateError {
    #[error(
        "No matching reference point{}",
        .within_km.map(|km| format!(" within {km} km")).unwrap_or_default()
    )]
    NoMatchFound { within_km: Option<f64> },

    #[error("Reference feature {index} does not have a Point geometry")]
    NotAPoint { index: usize },

    #[error("Maximum distance must be a finite, non-negative number of kilometres, got {0}")]
    InvalidRadius(f64),
}
