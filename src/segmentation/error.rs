use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SegmentError {
    #[error("Timestamp {index} ('{value}') is not a recognised date or date-time")]
    MalformedTimestamp { index: usize, value: String },

    #[error("Property '{property}' of point {point} has {found} values, expected {expected}")]
    MisalignedInput {
        point: usize,
        property: String,
        expected: usize,
        found: usize,
    },

    #[error("Collection has no '{0}' series to take timestamps from")]
    MissingTimestamps(String),
}
