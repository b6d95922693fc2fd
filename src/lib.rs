mod aquawatch;
mod association;
mod error;
mod facilities;
mod ingest;
mod segmentation;
mod store;
mod types;
mod utils;

pub use aquawatch::AquaWatch;
pub use error::AquaWatchError;

pub use types::coordinate::Coordinate;
pub use types::day_bucket::{DayBucket, DayRange, DaySegmentation};
pub use types::feature::{Feature, FeatureCollection, Geometry, Properties, PropertyValue, Scalar};
pub use types::wave_grid::{WaveGrid, WaveSeries, TIME_PROPERTY, WAVE_HEIGHT_PROPERTY};

pub use association::associate::{associate, nearest, ReferenceEntry, ReferenceSet};
pub use association::indexed::IndexedReference;
pub use association::radius::{associate_within_radius, RadiusMatch};

pub use segmentation::segment::{
    day_ranges, segment, segment_collection, shared_timestamps, slice_for_date,
};
pub use segmentation::timestamp::calendar_date;

pub use facilities::enrich::{facility_id, with_wave_series};
pub use facilities::representative::{facility_queries, representative_point};

pub use ingest::wave_grid_loader::WaveGridLoader;
pub use store::geojson_store::{read_collection, write_collection, write_day_buckets};

pub use association::error::AssociateError;
pub use facilities::error::FacilityError;
pub use ingest::error::IngestError;
pub use segmentation::error::SegmentError;
pub use store::error::StoreError;
