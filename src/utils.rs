use log::info;
use std::io;
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "aquawatch";

pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join(APP_DIR_NAME))
}

pub fn default_cache_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|p| p.join(APP_DIR_NAME))
}

pub async fn ensure_dir_exists(path: &Path) -> io::Result<()> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(io::Error::other(format!(
            "Path exists but is not a directory: {}",
            path.display()
        ))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("Creating directory: {}", path.display());
            tokio::fs::create_dir_all(path).await
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_dir_exists(&nested).await.unwrap();
        assert!(nested.is_dir());
        ensure_dir_exists(&nested).await.unwrap();
    }

    #[tokio::test]
    async fn rejects_a_file_in_the_way() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(ensure_dir_exists(file.path()).await.is_err());
    }
}
