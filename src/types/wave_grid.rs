//! Typed form of the wave-height table once it has been grouped per grid point.
//!
//! This is what the CSV ingest produces and caches. It converts into the
//! generic GeoJSON model with [`WaveGrid::into_collection`].

use crate::types::coordinate::Coordinate;
use crate::types::feature::{Feature, FeatureCollection, Properties, PropertyValue};
use serde::{Deserialize, Serialize};

pub const TIME_PROPERTY: &str = "time";
pub const WAVE_HEIGHT_PROPERTY: &str = "wave_height";

/// Wave-height readings for one grid point, in source row order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveSeries {
    pub longitude: f64,
    pub latitude: f64,
    pub time: Vec<String>,
    pub wave_height: Vec<f64>,
}

impl WaveSeries {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.longitude, self.latitude)
    }

    pub fn into_feature(self) -> Feature {
        let coordinate = self.coordinate();
        let mut properties = Properties::new();
        properties.insert(
            TIME_PROPERTY.to_string(),
            self.time.into_iter().collect::<PropertyValue>(),
        );
        properties.insert(
            WAVE_HEIGHT_PROPERTY.to_string(),
            self.wave_height.into_iter().collect::<PropertyValue>(),
        );
        Feature::point(coordinate, properties)
    }
}

/// All grid points of one wave dataset, sorted by latitude then longitude.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaveGrid {
    pub points: Vec<WaveSeries>,
}

impl WaveGrid {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn into_collection(self) -> FeatureCollection {
        self.points.into_iter().map(WaveSeries::into_feature).collect()
    }
}
