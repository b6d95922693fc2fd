use crate::association::error::AssociateError;
use crate::facilities::error::FacilityError;
use crate::ingest::error::IngestError;
use crate::segmentation::error::SegmentError;
use crate::store::error::StoreError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AquaWatchError {
    #[error(transparent)]
    Associate(#[from] AssociateError),

    #[error(transparent)]
    Segment(#[from] SegmentError),

    #[error(transparent)]
    Facility(#[from] FacilityError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to create directory '{0}'")]
    DirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to determine the system {0} directory")]
    DirResolution(&'static str),
}
