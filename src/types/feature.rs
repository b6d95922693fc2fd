//! GeoJSON feature model shared by every stage of the pipeline.
//!
//! A [`Feature`] with a `Point` geometry is the "point with properties" record
//! that the associator and the segmenter consume and produce. Properties are
//! stored in a [`BTreeMap`] so that serialized output is stable.

use crate::types::coordinate::Coordinate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

pub type Properties = BTreeMap<String, PropertyValue>;

/// The seven GeoJSON geometry types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point {
        coordinates: Coordinate,
    },
    MultiPoint {
        coordinates: Vec<Coordinate>,
    },
    LineString {
        coordinates: Vec<Coordinate>,
    },
    MultiLineString {
        coordinates: Vec<Vec<Coordinate>>,
    },
    Polygon {
        coordinates: Vec<Vec<Coordinate>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Coordinate>>>,
    },
    GeometryCollection {
        geometries: Vec<Geometry>,
    },
}

impl Geometry {
    /// The GeoJSON `type` member.
    pub fn kind(&self) -> &'static str {
        match self {
            Geometry::Point { .. } => "Point",
            Geometry::MultiPoint { .. } => "MultiPoint",
            Geometry::LineString { .. } => "LineString",
            Geometry::MultiLineString { .. } => "MultiLineString",
            Geometry::Polygon { .. } => "Polygon",
            Geometry::MultiPolygon { .. } => "MultiPolygon",
            Geometry::GeometryCollection { .. } => "GeometryCollection",
        }
    }
}

/// A single JSON value that is not an array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
}

impl Scalar {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Non-finite values have no JSON representation and become `null`.
impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or(Scalar::Null, Scalar::Number)
    }
}

impl From<u64> for Scalar {
    fn from(value: u64) -> Self {
        Scalar::Number(value.into())
    }
}

impl From<usize> for Scalar {
    fn from(value: usize) -> Self {
        Scalar::Number((value as u64).into())
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

/// A named measurement on a point.
///
/// `Series` values are time-aligned with the dataset's shared timestamp
/// sequence and are what the segmenter slices. Everything else is carried
/// through untouched; arrays that hold arrays or objects end up in `Other`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Series(Vec<Scalar>),
    Scalar(Scalar),
    Object(Map<String, Value>),
    Other(Value),
}

impl PropertyValue {
    pub fn as_series(&self) -> Option<&[Scalar]> {
        match self {
            PropertyValue::Series(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            PropertyValue::Scalar(value) => Some(value),
            _ => None,
        }
    }
}

macro_rules! scalar_property {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for PropertyValue {
                fn from(value: $ty) -> Self {
                    PropertyValue::Scalar(value.into())
                }
            }
        )*
    };
}

scalar_property!(Scalar, f64, u64, usize, &str, String);

impl<T: Into<Scalar>> FromIterator<T> for PropertyValue {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        PropertyValue::Series(iter.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
enum FeatureTag {
    #[default]
    Feature,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
enum FeatureCollectionTag {
    #[default]
    FeatureCollection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type", default)]
    tag: FeatureTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// `None` for an unlocated feature (`"geometry": null`).
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub properties: Properties,
}

impl Feature {
    pub fn new(geometry: Geometry, properties: Properties) -> Self {
        Self {
            tag: FeatureTag::Feature,
            id: None,
            geometry: Some(geometry),
            properties,
        }
    }

    /// Creates a point feature.
    ///
    /// # Examples
    ///
    /// ```
    /// use aquawatch::{Coordinate, Feature, Properties};
    ///
    /// let mut props = Properties::new();
    /// props.insert("wave_height".into(), [0.4, 0.6].into_iter().collect());
    /// let buoy = Feature::point(Coordinate::new(-0.7, 37.9), props);
    /// assert_eq!(buoy.coordinate(), Some(Coordinate::new(-0.7, 37.9)));
    /// ```
    pub fn point(coordinate: Coordinate, properties: Properties) -> Self {
        Self::new(
            Geometry::Point {
                coordinates: coordinate,
            },
            properties,
        )
    }

    pub fn with_id(mut self, id: impl Into<Value>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// A copy with the same geometry and id but different properties.
    pub fn with_properties(&self, properties: Properties) -> Feature {
        Self {
            tag: self.tag,
            id: self.id.clone(),
            geometry: self.geometry.clone(),
            properties,
        }
    }

    /// The position of a `Point` feature, `None` for any other geometry or
    /// for no geometry at all.
    pub fn coordinate(&self) -> Option<Coordinate> {
        match &self.geometry {
            Some(Geometry::Point { coordinates }) => Some(*coordinates),
            _ => None,
        }
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type", default)]
    tag: FeatureCollectionTag,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            tag: FeatureCollectionTag::FeatureCollection,
            features,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl From<Vec<Feature>> for FeatureCollection {
    fn from(features: Vec<Feature>) -> Self {
        FeatureCollection::new(features)
    }
}

impl FromIterator<Feature> for FeatureCollection {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        FeatureCollection::new(iter.into_iter().collect())
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Properties, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Properties>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_wave_point_feature() {
        let raw = json!({
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": [-1.29, 38.77] },
            "properties": {
                "time": ["2024-04-23 00:00:00", "2024-04-23 01:00:00"],
                "wave_height": [0.52, 0.61]
            }
        });
        let feature: Feature = serde_json::from_value(raw).unwrap();
        assert_eq!(feature.coordinate(), Some(Coordinate::new(-1.29, 38.77)));
        let heights = feature.property("wave_height").unwrap().as_series().unwrap();
        assert_eq!(heights.len(), 2);
        assert_eq!(heights[1].as_f64(), Some(0.61));
        let times = feature.property("time").unwrap().as_series().unwrap();
        assert_eq!(times[0].as_str(), Some("2024-04-23 00:00:00"));
    }

    #[test]
    fn parses_polygon_with_null_properties_and_altitude() {
        let raw = json!({
            "type": "Feature",
            "id": 7,
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[0.0, 0.0, 3.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
            },
            "properties": null
        });
        let feature: Feature = serde_json::from_value(raw).unwrap();
        assert!(feature.properties.is_empty());
        assert_eq!(feature.id, Some(json!(7)));
        assert_eq!(feature.coordinate(), None);
        match feature.geometry {
            Some(Geometry::Polygon { coordinates }) => assert_eq!(coordinates[0].len(), 4),
            other => panic!("unexpected geometry {other:?}"),
        }
    }

    #[test]
    fn integer_properties_keep_their_representation() {
        let raw = json!({
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": [0.0, 0.0] },
            "properties": { "id": 12, "name": "Recinto 3", "meta": { "zone": "A" } }
        });
        let feature: Feature = serde_json::from_value(raw.clone()).unwrap();
        assert!(matches!(feature.property("meta"), Some(PropertyValue::Object(_))));
        assert_eq!(serde_json::to_value(&feature).unwrap(), raw);
    }

    #[test]
    fn collection_serializes_type_members() {
        let fc = FeatureCollection::new(vec![Feature::point(
            Coordinate::new(1.0, 2.0),
            Properties::new(),
        )]);
        let value = serde_json::to_value(&fc).unwrap();
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"][0]["type"], "Feature");
        assert_eq!(value["features"][0]["geometry"]["coordinates"], json!([1.0, 2.0]));
    }

    #[test]
    fn nested_array_properties_are_kept_verbatim() {
        let raw = json!({
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": [0.0, 0.0] },
            "properties": {
                "grid": [[1, 2], [3, 4]],
                "owners": [{ "name": "A" }, { "name": "B" }],
                "mixed": [1, [2]]
            }
        });
        let feature: Feature = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(
            feature.property("grid"),
            Some(&PropertyValue::Other(json!([[1, 2], [3, 4]])))
        );
        assert!(matches!(feature.property("owners"), Some(PropertyValue::Other(_))));
        assert!(feature.property("mixed").unwrap().as_series().is_none());
        assert_eq!(serde_json::to_value(&feature).unwrap(), raw);
    }

    #[test]
    fn every_geometry_type_and_null_geometry_parse() {
        let raw = json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": { "type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]] },
                    "properties": {}
                },
                {
                    "type": "Feature",
                    "geometry": {
                        "type": "MultiLineString",
                        "coordinates": [[[0.0, 0.0], [1.0, 1.0]]]
                    },
                    "properties": {}
                },
                {
                    "type": "Feature",
                    "geometry": {
                        "type": "GeometryCollection",
                        "geometries": [{ "type": "Point", "coordinates": [2.0, 3.0] }]
                    },
                    "properties": {}
                },
                { "type": "Feature", "geometry": null, "properties": { "name": "sin ubicar" } }
            ]
        });
        let fc: FeatureCollection = serde_json::from_value(raw.clone()).unwrap();
        let kinds: Vec<_> = fc
            .features
            .iter()
            .map(|f| f.geometry.as_ref().map(Geometry::kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                Some("LineString"),
                Some("MultiLineString"),
                Some("GeometryCollection"),
                None
            ]
        );
        assert_eq!(fc.features[3].coordinate(), None);
        assert_eq!(serde_json::to_value(&fc).unwrap(), raw);
    }

    #[test]
    fn non_finite_numbers_become_null() {
        assert_eq!(Scalar::from(f64::NAN), Scalar::Null);
        assert_eq!(Scalar::from(1.5).as_f64(), Some(1.5));
    }
}
