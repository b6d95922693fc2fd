use crate::store::error::StoreError;
use crate::types::day_bucket::DaySegmentation;
use crate::types::feature::FeatureCollection;
use chrono::NaiveDate;
use log::{debug, info};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::{fs, task};

pub async fn read_collection(path: &Path) -> Result<FeatureCollection, StoreError> {
    let bytes = fs::read(path)
        .await
        .map_err(|e| StoreError::Read(path.to_path_buf(), e))?;
    let path = path.to_path_buf();
    task::spawn_blocking(move || {
        serde_json::from_slice::<FeatureCollection>(&bytes).map_err(|e| StoreError::Parse(path, e))
    })
    .await?
}

/// Writes `collection` to `path`, replacing any existing file.
///
/// The JSON is written to a temporary file next to `path` and renamed over
/// it, so readers never observe a half-written collection.
pub async fn write_collection(path: &Path, collection: &FeatureCollection) -> Result<(), StoreError> {
    let count = collection.len();
    let path = path.to_path_buf();
    let collection = collection.clone();
    let written = path.clone();
    task::spawn_blocking(move || {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|e| StoreError::DirCreation(dir.clone(), e))?;

        let bytes = serde_json::to_vec(&collection).map_err(StoreError::Serialize)?;
        let mut file =
            NamedTempFile::new_in(&dir).map_err(|e| StoreError::Write(path.clone(), e))?;
        file.write_all(&bytes)
            .and_then(|_| file.flush())
            .map_err(|e| StoreError::Write(path.clone(), e))?;
        file.persist(&path)
            .map_err(|e| StoreError::Persist(path.clone(), e))?;
        Ok::<_, StoreError>(())
    })
    .await??;

    info!("Wrote {} features to {:?}", count, written);
    Ok(())
}

/// File name of the `occurrence`-th bucket (0-based) for `date`.
fn day_file_name(date: NaiveDate, occurrence: usize) -> String {
    match occurrence {
        0 => format!("data-{}.geojson", date.format("%Y-%m-%d")),
        n => format!("data-{}-{}.geojson", date.format("%Y-%m-%d"), n),
    }
}

/// Writes every bucket of `segmentation` into `dir` as its own GeoJSON file.
///
/// Buckets are named `data-YYYY-MM-DD.geojson`. A date that appears in more
/// than one bucket gets a `-<n>` suffix for its n-th extra bucket, so no
/// bucket overwrites another. Returns the written paths in bucket order.
pub async fn write_day_buckets(
    dir: &Path,
    segmentation: &DaySegmentation,
) -> Result<Vec<PathBuf>, StoreError> {
    fs::create_dir_all(dir)
        .await
        .map_err(|e| StoreError::DirCreation(dir.to_path_buf(), e))?;

    let mut seen: HashMap<NaiveDate, usize> = HashMap::new();
    let mut written = Vec::with_capacity(segmentation.len());
    for bucket in segmentation {
        let occurrence = seen.entry(bucket.date()).or_insert(0);
        if *occurrence > 0 {
            debug!(
                "Date {} appears again in bucket {}, writing a suffixed file",
                bucket.date(),
                bucket.range
            );
        }
        let path = dir.join(day_file_name(bucket.date(), *occurrence));
        *occurrence += 1;

        write_collection(&path, &bucket.collection).await?;
        written.push(path);
    }

    info!("Wrote {} day files to {:?}", written.len(), dir);
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmentation::segment::segment;
    use crate::types::coordinate::Coordinate;
    use crate::types::feature::{Feature, Properties, PropertyValue};

    fn wave_point(times: &[&str], heights: &[f64]) -> Feature {
        let mut properties = Properties::new();
        properties.insert(
            "time".to_string(),
            times.iter().copied().collect::<PropertyValue>(),
        );
        properties.insert(
            "wave_height".to_string(),
            heights.iter().copied().collect::<PropertyValue>(),
        );
        Feature::point(Coordinate::new(-0.5, 38.5), properties)
    }

    #[tokio::test]
    async fn written_collection_reads_back_identically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("waves.geojson");
        let collection = FeatureCollection::new(vec![wave_point(
            &["2024-04-23 00:00:00", "2024-04-23 01:00:00"],
            &[0.4, 0.45],
        )]);

        write_collection(&path, &collection).await.unwrap();
        assert_eq!(read_collection(&path).await.unwrap(), collection);

        let leftovers: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("waves.geojson")]);
    }

    #[tokio::test]
    async fn overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.geojson");
        std::fs::write(&path, "stale").unwrap();

        write_collection(&path, &FeatureCollection::default()).await.unwrap();
        assert!(read_collection(&path).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_json_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.geojson");
        std::fs::write(&path, r#"{"type": "FeatureCollection", "features": ["#).unwrap();
        assert!(matches!(
            read_collection(&path).await,
            Err(StoreError::Parse(..))
        ));
    }

    #[tokio::test]
    async fn reads_facility_files_with_unusual_features() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recintos.geojson");
        std::fs::write(
            &path,
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "geometry": null, "properties": {"zones": [[1, 2], [3, 4]]}},
                {"type": "Feature", "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 1]]},
                 "properties": {"owners": [{"name": "A"}]}},
                {"type": "Feature", "id": "R-1",
                 "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]},
                 "properties": null}
            ]}"#,
        )
        .unwrap();

        let collection = read_collection(&path).await.unwrap();
        assert_eq!(collection.len(), 3);
        assert!(collection.features[0].geometry.is_none());
    }

    #[tokio::test]
    async fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_collection(&dir.path().join("absent.geojson")).await,
            Err(StoreError::Read(..))
        ));
    }

    #[tokio::test]
    async fn day_files_are_named_by_date_and_never_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let times = [
            "2024-04-23 00:00:00",
            "2024-04-24 00:00:00",
            "2024-04-23 12:00:00",
        ];
        let points = vec![wave_point(&times, &[0.1, 0.2, 0.3])];
        let segmentation = segment(&times, &points).unwrap();

        let paths = write_day_buckets(dir.path(), &segmentation).await.unwrap();
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "data-2024-04-23.geojson",
                "data-2024-04-24.geojson",
                "data-2024-04-23-1.geojson",
            ]
        );

        let last = read_collection(&paths[2]).await.unwrap();
        let heights = last.features[0]
            .property("wave_height")
            .unwrap()
            .as_series()
            .unwrap();
        assert_eq!(heights.len(), 1);
        assert_eq!(heights[0].as_f64(), Some(0.3));
    }
}
