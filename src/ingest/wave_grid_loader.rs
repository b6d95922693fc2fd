use crate::ingest::error::IngestError;
use crate::types::wave_grid::{WaveGrid, WaveSeries, TIME_PROPERTY, WAVE_HEIGHT_PROPERTY};
use bincode::config::{Configuration, Fixint, LittleEndian};
use log::{info, warn};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use tokio::{fs, task};

const LATITUDE_COLUMN: &str = "latitude";
const LONGITUDE_COLUMN: &str = "longitude";
const CACHE_FILE_PREFIX: &str = "wave-grid-";
const BINCODE_CONFIG: Configuration<LittleEndian, Fixint> =
    bincode::config::standard().with_fixed_int_encoding();

/// Loads wave-height tables (`time,latitude,longitude,wave_height`) into a
/// [`WaveGrid`], keeping a bincode copy of every parsed table in the cache
/// directory.
pub struct WaveGridLoader {
    cache_dir: PathBuf,
}

/// What goes into a cache file: the grid and the CSV it was parsed from.
#[derive(Debug, Serialize, Deserialize)]
struct CachedGrid {
    source: String,
    grid: WaveGrid,
}

impl WaveGridLoader {
    pub fn new(cache_dir: &Path) -> WaveGridLoader {
        WaveGridLoader {
            cache_dir: cache_dir.to_path_buf(),
        }
    }

    /// Returns the grid for `csv_path`, parsing the CSV only if there is no
    /// cached copy of this same file at least as recent as the file.
    pub async fn load(&self, csv_path: &Path) -> Result<WaveGrid, IngestError> {
        let source = fs::canonicalize(csv_path)
            .await
            .map_err(|e| IngestError::SourceMetadata(csv_path.to_path_buf(), e))?;
        let cache_path = self.cache_path(&source);

        if Self::cache_is_fresh(&source, &cache_path).await? {
            match Self::read_cache(&cache_path, &source).await? {
                Some(grid) => {
                    info!("Cache hit for {:?} at {:?}", source, cache_path);
                    return Ok(grid);
                }
                None => warn!("Cache {:?} was written for another file", cache_path),
            }
        }

        warn!("Cache miss for {:?}. Parsing CSV.", source);
        let grid = Self::read_csv(&source).await?;

        fs::create_dir_all(&self.cache_dir)
            .await
            .map_err(|e| IngestError::CacheDirCreation(self.cache_dir.clone(), e))?;
        Self::write_cache(&grid, &source, &cache_path).await?;
        info!(
            "Cached {} grid points from {:?} to {:?}",
            grid.len(),
            source,
            cache_path
        );
        Ok(grid)
    }

    /// Cache file for a canonical source path. The stem keeps the name
    /// readable and the path hash keeps same-named files apart.
    fn cache_path(&self, source: &Path) -> PathBuf {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "waves".to_string());
        let mut hasher = DefaultHasher::new();
        source.hash(&mut hasher);
        self.cache_dir
            .join(format!("{}{}-{:016x}.bin", CACHE_FILE_PREFIX, stem, hasher.finish()))
    }

    async fn cache_is_fresh(source: &Path, cache_path: &Path) -> Result<bool, IngestError> {
        let csv = fs::metadata(source)
            .await
            .map_err(|e| IngestError::SourceMetadata(source.to_path_buf(), e))?;
        let Ok(cached) = fs::metadata(cache_path).await else {
            return Ok(false);
        };
        match (cached.modified(), csv.modified()) {
            (Ok(cached_at), Ok(source_at)) => Ok(cached_at >= source_at),
            _ => Ok(false),
        }
    }

    /// The cached grid, or `None` if the file was written for another source.
    async fn read_cache(cache_path: &Path, source: &Path) -> Result<Option<WaveGrid>, IngestError> {
        let path = cache_path.to_path_buf();
        let expected = source.to_string_lossy().into_owned();
        task::spawn_blocking(move || {
            let bytes =
                std::fs::read(&path).map_err(|e| IngestError::CacheRead(path.clone(), e))?;
            let (cached, _) =
                bincode::serde::decode_from_slice::<CachedGrid, _>(&bytes, BINCODE_CONFIG)
                    .map_err(|e| IngestError::CacheDecode(path, Box::new(e)))?;
            Ok((cached.source == expected).then_some(cached.grid))
        })
        .await?
    }

    async fn write_cache(grid: &WaveGrid, source: &Path, cache_path: &Path) -> Result<(), IngestError> {
        let cached = CachedGrid {
            source: source.to_string_lossy().into_owned(),
            grid: grid.clone(),
        };
        let bytes = task::spawn_blocking(move || {
            bincode::serde::encode_to_vec(&cached, BINCODE_CONFIG)
                .map_err(|e| IngestError::CacheEncode(Box::new(e)))
        })
        .await??;
        fs::write(cache_path, &bytes)
            .await
            .map_err(|e| IngestError::CacheWrite(cache_path.to_path_buf(), e))
    }

    /// Parses the CSV on a blocking thread.
    async fn read_csv(csv_path: &Path) -> Result<WaveGrid, IngestError> {
        let path = csv_path.to_path_buf();
        task::spawn_blocking(move || {
            let df = CsvReadOptions::default()
                .with_has_header(true)
                .try_into_reader_with_file_path(Some(path.clone()))
                .map_err(|e| IngestError::CsvRead {
                    path: path.clone(),
                    source: e,
                })?
                .finish()
                .map_err(|e| IngestError::CsvRead {
                    path: path.clone(),
                    source: e,
                })?;
            grid_from_frame(&df, &path)
        })
        .await?
    }
}

fn required_column<'a>(df: &'a DataFrame, name: &str, path: &Path) -> Result<&'a Column, IngestError> {
    df.column(name).map_err(|_| IngestError::MissingColumn {
        path: path.to_path_buf(),
        column: name.to_string(),
    })
}

fn float_values(df: &DataFrame, name: &str, path: &Path) -> Result<Vec<Option<f64>>, IngestError> {
    let column_type_error = |e| IngestError::ColumnType {
        column: name.to_string(),
        expected: "f64",
        source: e,
    };
    let column = required_column(df, name, path)?
        .cast(&DataType::Float64)
        .map_err(column_type_error)?;
    Ok(column.f64().map_err(column_type_error)?.into_iter().collect())
}

fn text_values(df: &DataFrame, name: &str, path: &Path) -> Result<Vec<Option<String>>, IngestError> {
    let column_type_error = |e| IngestError::ColumnType {
        column: name.to_string(),
        expected: "string",
        source: e,
    };
    let column = required_column(df, name, path)?
        .cast(&DataType::String)
        .map_err(column_type_error)?;
    Ok(column
        .str()
        .map_err(column_type_error)?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

fn require<T>(value: Option<T>, column: &str, row: usize) -> Result<T, IngestError> {
    value.ok_or_else(|| IngestError::MissingValue {
        column: column.to_string(),
        row,
    })
}

/// Groups table rows into one series per coordinate.
///
/// Rows are ordered by latitude then longitude; rows of the same coordinate
/// keep their file order. A coordinate with any missing wave height is left
/// out of the grid entirely.
fn grid_from_frame(df: &DataFrame, path: &Path) -> Result<WaveGrid, IngestError> {
    let times = text_values(df, TIME_PROPERTY, path)?;
    let latitudes = float_values(df, LATITUDE_COLUMN, path)?;
    let longitudes = float_values(df, LONGITUDE_COLUMN, path)?;
    let heights = float_values(df, WAVE_HEIGHT_PROPERTY, path)?;

    let mut rows = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        rows.push((
            require(latitudes[row], LATITUDE_COLUMN, row)?,
            require(longitudes[row], LONGITUDE_COLUMN, row)?,
            row,
        ));
    }
    rows.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));

    let mut points: Vec<WaveSeries> = Vec::new();
    let mut incomplete: Option<(f64, f64)> = None;
    for (latitude, longitude, row) in rows {
        let same_as_last = points
            .last()
            .is_some_and(|last| last.latitude == latitude && last.longitude == longitude);
        let time = require(times[row].clone(), TIME_PROPERTY, row)?;
        match heights[row] {
            Some(height) if same_as_last => {
                if let Some(last) = points.last_mut() {
                    last.time.push(time);
                    last.wave_height.push(height);
                }
            }
            Some(_) if incomplete == Some((latitude, longitude)) => {}
            Some(height) => points.push(WaveSeries {
                longitude,
                latitude,
                time: vec![time],
                wave_height: vec![height],
            }),
            None => {
                if same_as_last {
                    points.pop();
                }
                if incomplete != Some((latitude, longitude)) {
                    warn!(
                        "Dropping grid point ({}, {}): missing wave height in row {}",
                        longitude, latitude, row
                    );
                }
                incomplete = Some((latitude, longitude));
            }
        }
    }

    Ok(WaveGrid { points })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const CSV: &str = "\
time,latitude,longitude,wave_height
2024-04-23 00:00:00,38.5,-0.5,0.41
2024-04-23 00:00:00,38.0,-0.3,0.90
2024-04-23 01:00:00,38.5,-0.5,0.45
2024-04-23 01:00:00,38.0,-0.3,0.95
2024-04-23 00:00:00,38.0,-0.9,
2024-04-23 01:00:00,38.0,-0.9,0.30
";

    async fn write_csv(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).await.unwrap();
        path
    }

    #[tokio::test]
    async fn groups_rows_per_coordinate_sorted_by_lat_lon() {
        let dir = tempfile::tempdir().unwrap();
        let csv = write_csv(dir.path(), "copernicus_data.csv", CSV).await;
        let loader = WaveGridLoader::new(&dir.path().join("cache"));

        let grid = loader.load(&csv).await.unwrap();
        assert_eq!(grid.len(), 2, "incomplete point must be dropped: {grid:?}");

        let first = &grid.points[0];
        assert_eq!((first.longitude, first.latitude), (-0.3, 38.0));
        assert_eq!(first.wave_height, vec![0.90, 0.95]);
        assert_eq!(first.time, vec!["2024-04-23 00:00:00", "2024-04-23 01:00:00"]);

        let second = &grid.points[1];
        assert_eq!((second.longitude, second.latitude), (-0.5, 38.5));
        assert_eq!(second.wave_height, vec![0.41, 0.45]);
    }

    #[tokio::test]
    async fn reuses_cache_until_source_changes() {
        let dir = tempfile::tempdir().unwrap();
        let csv = write_csv(dir.path(), "waves.csv", CSV).await;
        let loader = WaveGridLoader::new(&dir.path().join("cache"));
        let parsed = loader.load(&csv).await.unwrap();

        let source = csv.canonicalize().unwrap();
        let cache_path = loader.cache_path(&source);
        assert!(cache_path.exists());

        // A cache that is newer than the CSV is used as-is.
        let mut doctored = parsed.clone();
        doctored.points.truncate(1);
        WaveGridLoader::write_cache(&doctored, &source, &cache_path)
            .await
            .unwrap();
        assert_eq!(loader.load(&csv).await.unwrap(), doctored);

        // Touching the CSV invalidates it.
        tokio::time::sleep(Duration::from_millis(20)).await;
        write_csv(dir.path(), "waves.csv", CSV).await;
        assert_eq!(loader.load(&csv).await.unwrap(), parsed);
    }

    #[tokio::test]
    async fn same_file_name_in_other_directory_has_its_own_cache() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("a")).unwrap();
        std::fs::create_dir_all(dir.path().join("b")).unwrap();
        let b = write_csv(
            &dir.path().join("b"),
            "waves.csv",
            "time,latitude,longitude,wave_height\n2024-04-23 00:00:00,10.0,10.0,9.9\n",
        )
        .await;
        let a = write_csv(
            &dir.path().join("a"),
            "waves.csv",
            "time,latitude,longitude,wave_height\n2024-04-23 00:00:00,38.5,-0.5,0.41\n",
        )
        .await;
        let loader = WaveGridLoader::new(&dir.path().join("cache"));

        let from_a = loader.load(&a).await.unwrap();
        let from_b = loader.load(&b).await.unwrap();
        assert_ne!(from_a, from_b);
        assert_eq!(from_b.points[0].wave_height, vec![9.9]);
        assert_eq!(loader.load(&a).await.unwrap().points[0].wave_height, vec![0.41]);
        assert_eq!(loader.load(&b).await.unwrap(), from_b);
    }

    #[tokio::test]
    async fn cache_written_for_another_source_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let csv = write_csv(dir.path(), "waves.csv", CSV).await;
        let loader = WaveGridLoader::new(&dir.path().join("cache"));
        let parsed = loader.load(&csv).await.unwrap();

        let source = csv.canonicalize().unwrap();
        let foreign = WaveGrid {
            points: parsed.points[..1].to_vec(),
        };
        WaveGridLoader::write_cache(&foreign, &dir.path().join("other.csv"), &loader.cache_path(&source))
            .await
            .unwrap();
        assert_eq!(loader.load(&csv).await.unwrap(), parsed);
    }

    #[tokio::test]
    async fn missing_column_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let csv = write_csv(
            dir.path(),
            "bad.csv",
            "time,latitude,longitude\n2024-04-23 00:00:00,38.5,-0.5\n",
        )
        .await;
        let loader = WaveGridLoader::new(&dir.path().join("cache"));
        match loader.load(&csv).await {
            Err(IngestError::MissingColumn { column, .. }) => assert_eq!(column, "wave_height"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_source_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let loader = WaveGridLoader::new(dir.path());
        let result = loader.load(&dir.path().join("absent.csv")).await;
        assert!(matches!(result, Err(IngestError::SourceMetadata(..))));
    }
}
