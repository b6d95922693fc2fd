//! The main entry point: an [`AquaWatch`] value that knows where processed
//! outputs and ingest caches live, and exposes the wave-processing steps as
//! builder-style operations.

use crate::association::associate::associate;
use crate::association::radius::associate_within_radius;
use crate::error::AquaWatchError;
use crate::facilities::enrich::{facility_id, with_wave_series};
use crate::facilities::representative::facility_queries;
use crate::ingest::wave_grid_loader::WaveGridLoader;
use crate::segmentation::segment::{segment_collection, shared_timestamps, slice_for_date};
use crate::store::geojson_store::{write_collection, write_day_buckets};
use crate::types::feature::FeatureCollection;
use crate::utils::{default_cache_dir, default_data_dir, ensure_dir_exists};
use bon::bon;
use chrono::NaiveDate;
use log::info;
use std::path::{Path, PathBuf};

const DAY_FILES_DIR: &str = "data_by_date";
const DATE_SEARCH_FILE: &str = "data_search.geojson";
const FACILITIES_WITH_DATA_FILE: &str = "recintos_with_data.geojson";

/// Client for converting, associating and splitting wave data.
///
/// Create one with [`AquaWatch::new()`] to use the platform data and cache
/// directories, or [`AquaWatch::with_dirs()`] to choose them.
///
/// # Examples
///
/// ```rust,no_run
/// # use aquawatch::{AquaWatch, AquaWatchError};
/// # async fn run() -> Result<(), AquaWatchError> {
/// let client = AquaWatch::new().await?;
/// let waves = client
///     .waves_to_geojson()
///     .csv("copernicus_data.csv")
///     .call()
///     .await?;
/// let paths = client.separate_by_date().collection(&waves).call().await?;
/// println!("Wrote {} day files", paths.len());
/// # Ok(())
/// # }
/// ```
pub struct AquaWatch {
    data_dir: PathBuf,
    cache_dir: PathBuf,
    loader: WaveGridLoader,
}

#[bon]
impl AquaWatch {
    /// Creates a client that writes outputs to `data_dir` and keeps parsed
    /// CSV caches in `cache_dir`. Both are created if missing.
    ///
    /// # Errors
    ///
    /// [`AquaWatchError::DirCreation`] if either directory cannot be created
    /// or the path exists and is not a directory.
    pub async fn with_dirs(data_dir: PathBuf, cache_dir: PathBuf) -> Result<Self, AquaWatchError> {
        for dir in [&data_dir, &cache_dir] {
            ensure_dir_exists(dir)
                .await
                .map_err(|e| AquaWatchError::DirCreation(dir.clone(), e))?;
        }
        Ok(Self {
            loader: WaveGridLoader::new(&cache_dir),
            data_dir,
            cache_dir,
        })
    }

    /// Creates a client using `aquawatch` folders inside the platform data
    /// and cache directories (e.g. `~/.local/share/aquawatch` and
    /// `~/.cache/aquawatch` on Linux).
    ///
    /// # Errors
    ///
    /// [`AquaWatchError::DirResolution`] if the platform has no such
    /// directory, [`AquaWatchError::DirCreation`] if it cannot be created.
    pub async fn new() -> Result<Self, AquaWatchError> {
        let data_dir = default_data_dir().ok_or(AquaWatchError::DirResolution("data"))?;
        let cache_dir = default_cache_dir().ok_or(AquaWatchError::DirResolution("cache"))?;
        Self::with_dirs(data_dir, cache_dir).await
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Loads a wave CSV (`time,latitude,longitude,wave_height`) and writes it
    /// as a GeoJSON collection with one point per grid coordinate.
    ///
    /// # Arguments
    ///
    /// * `.csv(impl Into<PathBuf>)`: **Required.** The CSV to load.
    /// * `.output(impl Into<String>)`: Optional. File name inside the data
    ///   directory. Defaults to the CSV's name with a `.geojson` extension.
    ///
    /// # Errors
    ///
    /// [`AquaWatchError::Ingest`] if the CSV cannot be parsed,
    /// [`AquaWatchError::Store`] if the collection cannot be written.
    #[builder]
    pub async fn waves_to_geojson(
        &self,
        #[builder(into)] csv: PathBuf,
        #[builder(into)] output: Option<String>,
    ) -> Result<FeatureCollection, AquaWatchError> {
        let output = match output {
            Some(name) => self.data_dir.join(name),
            None => self.data_dir.join(csv.with_extension("geojson").file_name().unwrap_or_default()),
        };

        let grid = self.loader.load(&csv).await?;
        let collection = grid.into_collection();
        write_collection(&output, &collection).await?;
        Ok(collection)
    }

    /// Finds the wave point that belongs to each facility.
    ///
    /// Facilities are represented by their point or the vertex average of
    /// their outer ring. Without a radius, every facility gets its nearest
    /// wave point by Manhattan distance, in facility order. With
    /// `.max_distance_km(..)`, the nearest point is chosen by great-circle
    /// distance, facilities with nothing in range are skipped, and each
    /// output point also carries `facility_index`, `distance_km` and, when
    /// the facility has an id, `facility_id`.
    ///
    /// # Errors
    ///
    /// [`AquaWatchError::Facility`] for a facility without vertices and
    /// [`AquaWatchError::Associate`] when there is nothing to match against.
    #[builder]
    pub async fn nearest_waves(
        &self,
        facilities: &FeatureCollection,
        waves: &FeatureCollection,
        max_distance_km: Option<f64>,
    ) -> Result<FeatureCollection, AquaWatchError> {
        let queries = facility_queries(facilities)?;
        let features = match max_distance_km {
            None => associate(&queries, &waves.features)?,
            Some(km) => associate_within_radius(&queries, &waves.features, km)?
                .into_iter()
                .map(|matched| {
                    let id = facility_id(&facilities.features[matched.query_index]);
                    matched.into_annotated_feature(id)
                })
                .collect(),
        };
        info!(
            "Matched {} of {} facilities to wave points",
            features.len(),
            queries.len()
        );
        Ok(FeatureCollection::new(features))
    }

    /// Copies the wave series of each facility's nearest wave point onto the
    /// facility itself and writes the result to the data directory.
    ///
    /// Facilities keep their geometry, id and properties. Matching works as
    /// in [`AquaWatch::nearest_waves`]; with a radius, facilities that have
    /// nothing in range are kept without wave series.
    ///
    /// # Arguments
    ///
    /// * `.facilities(&FeatureCollection)`: **Required.**
    /// * `.waves(&FeatureCollection)`: **Required.** Wave points with `time`/`wave_height` series.
    /// * `.max_distance_km(f64)`: Optional. Great-circle search radius.
    /// * `.output(impl Into<String>)`: Optional. Defaults to `recintos_with_data.geojson`.
    #[builder]
    pub async fn facilities_with_waves(
        &self,
        facilities: &FeatureCollection,
        waves: &FeatureCollection,
        max_distance_km: Option<f64>,
        #[builder(into)] output: Option<String>,
    ) -> Result<FeatureCollection, AquaWatchError> {
        let output = self
            .data_dir
            .join(output.as_deref().unwrap_or(FACILITIES_WITH_DATA_FILE));
        let queries = facility_queries(facilities)?;

        let enriched: FeatureCollection = match max_distance_km {
            None => facilities
                .features
                .iter()
                .zip(associate(&queries, &waves.features)?)
                .map(|(facility, wave_point)| with_wave_series(facility, &wave_point))
                .collect(),
            Some(km) => {
                let mut enriched = facilities.features.clone();
                for matched in associate_within_radius(&queries, &waves.features, km)? {
                    let facility = &facilities.features[matched.query_index];
                    enriched[matched.query_index] = with_wave_series(facility, &matched.feature);
                }
                FeatureCollection::new(enriched)
            }
        };

        write_collection(&output, &enriched).await?;
        Ok(enriched)
    }

    /// Splits a wave collection into one file per calendar day, using the
    /// `time` series of its first feature as the shared timeline.
    ///
    /// # Arguments
    ///
    /// * `.collection(&FeatureCollection)`: **Required.** Points with time-aligned series.
    /// * `.output_dir(impl Into<PathBuf>)`: Optional. Defaults to
    ///   `data_by_date` inside the data directory.
    ///
    /// # Returns
    ///
    /// The written file paths, one per day bucket, in timeline order.
    #[builder]
    pub async fn separate_by_date(
        &self,
        collection: &FeatureCollection,
        #[builder(into)] output_dir: Option<PathBuf>,
    ) -> Result<Vec<PathBuf>, AquaWatchError> {
        let output_dir = output_dir.unwrap_or_else(|| self.data_dir.join(DAY_FILES_DIR));
        let segmentation = segment_collection(collection)?;
        Ok(write_day_buckets(&output_dir, &segmentation).await?)
    }

    /// Extracts every reading of a single day from a wave collection and
    /// writes it to the data directory.
    ///
    /// # Arguments
    ///
    /// * `.collection(&FeatureCollection)`: **Required.**
    /// * `.date(NaiveDate)`: **Required.** The calendar day to keep.
    /// * `.output(impl Into<String>)`: Optional. Defaults to `data_search.geojson`.
    #[builder]
    pub async fn waves_for_date(
        &self,
        collection: &FeatureCollection,
        date: NaiveDate,
        #[builder(into)] output: Option<String>,
    ) -> Result<FeatureCollection, AquaWatchError> {
        let output = self
            .data_dir
            .join(output.as_deref().unwrap_or(DATE_SEARCH_FILE));
        let timestamps = shared_timestamps(collection)?;
        let day = slice_for_date(&timestamps, &collection.features, date)?;
        write_collection(&output, &day).await?;
        Ok(day)
    }
}
