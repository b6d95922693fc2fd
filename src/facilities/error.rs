use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FacilityError {
    #[error("Facility {index} has no point or polygon vertices to derive a position from")]
    EmptyGeometry { index: usize },

    #[error("Facility {index} has no geometry")]
    MissingGeometry { index: usize },

    #[error("Facility {index} is a {kind}, which has no representative point")]
    UnsupportedGeometry { index: usize, kind: &'static str },
}
