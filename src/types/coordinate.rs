//! Geographic coordinates in GeoJSON order and the two distance metrics used
//! to match facilities against measurement points.

use haversine::{distance, Location as HaversineLocation, Units};
use serde::{Deserialize, Serialize};

/// A 2D position stored as `(longitude, latitude)` in decimal degrees.
///
/// The field order follows GeoJSON, so a `Coordinate` serializes to the same
/// `[lon, lat]` array used in `"coordinates"` members.
///
/// # Examples
///
/// ```
/// use aquawatch::Coordinate;
///
/// let cartagena = Coordinate::new(-0.98, 37.6);
/// assert_eq!(cartagena.lon(), -0.98);
/// assert_eq!(cartagena.lat(), 37.6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "[f64; 2]")]
pub struct Coordinate {
    lon: f64,
    lat: f64,
}

impl Coordinate {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Sum of absolute differences of the raw degree values.
    ///
    /// This is not a spatial distance: one degree of longitude and one degree
    /// of latitude weigh the same regardless of where on the globe they are.
    /// It is the metric [`crate::associate`] ranks candidates by.
    pub fn manhattan(&self, other: &Coordinate) -> f64 {
        (self.lon - other.lon).abs() + (self.lat - other.lat).abs()
    }

    /// Great-circle distance in kilometres.
    pub fn haversine_km(&self, other: &Coordinate) -> f64 {
        distance(self.into(), other.into(), Units::Kilometers)
    }

    /// Exact identity used to collapse duplicate reference points.
    /// `0.0` and `-0.0` are treated as the same position.
    pub(crate) fn same_position(&self, other: &Coordinate) -> bool {
        self.lon == other.lon && self.lat == other.lat
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from(value: [f64; 2]) -> Self {
        Coordinate::new(value[0], value[1])
    }
}

/// GeoJSON positions may carry an altitude as a third element; it is dropped.
impl TryFrom<Vec<f64>> for Coordinate {
    type Error = String;

    fn try_from(value: Vec<f64>) -> Result<Self, Self::Error> {
        match value.as_slice() {
            [lon, lat, ..] => Ok(Coordinate::new(*lon, *lat)),
            _ => Err(format!(
                "position needs at least 2 elements, found {}",
                value.len()
            )),
        }
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(value: Coordinate) -> Self {
        [value.lon, value.lat]
    }
}

impl From<&Coordinate> for HaversineLocation {
    fn from(value: &Coordinate) -> Self {
        HaversineLocation {
            latitude: value.lat,
            longitude: value.lon,
        }
    }
}
