use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read GeoJSON file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to write GeoJSON file '{0}'")]
    Write(PathBuf, #[source] std::io::Error),

    #[error("Failed to create output directory '{0}'")]
    DirCreation(PathBuf, #[source] std::io::Error),

    #[error("'{0}' is not a valid GeoJSON feature collection")]
    Parse(PathBuf, #[source] serde_json::Error),

    #[error("Failed to serialize feature collection")]
    Serialize(#[source] serde_json::Error),

    #[error("Failed to move temporary file into place at '{0}'")]
    Persist(PathBuf, #[source] tempfile::PersistError),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
