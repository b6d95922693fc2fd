use crate::types::feature::{Feature, PropertyValue, Scalar};
use serde_json::Value;

const ID_PROPERTY: &str = "id";

/// Identifier of a facility: its feature `id`, or else a non-null `id`
/// property.
pub fn facility_id(facility: &Feature) -> Option<Scalar> {
    match &facility.id {
        Some(Value::Number(n)) => return Some(Scalar::Number(n.clone())),
        Some(Value::String(s)) => return Some(Scalar::Text(s.clone())),
        _ => {}
    }
    facility
        .property(ID_PROPERTY)
        .and_then(PropertyValue::as_scalar)
        .filter(|id| **id != Scalar::Null)
        .cloned()
}

/// The facility with every series property of `wave_point` (such as `time`
/// and `wave_height`) copied onto it. Geometry, id and the facility's other
/// properties are kept; a series overwrites a facility property of the same
/// name.
pub fn with_wave_series(facility: &Feature, wave_point: &Feature) -> Feature {
    let mut properties = facility.properties.clone();
    for (name, value) in &wave_point.properties {
        if let PropertyValue::Series(_) = value {
            properties.insert(name.clone(), value.clone());
        }
    }
    facility.with_properties(properties)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::coordinate::Coordinate;
    use crate::types::feature::{Geometry, Properties};

    fn facility(properties: Properties) -> Feature {
        Feature::new(
            Geometry::Polygon {
                coordinates: vec![vec![
                    Coordinate::new(0.0, 0.0),
                    Coordinate::new(1.0, 0.0),
                    Coordinate::new(1.0, 1.0),
                    Coordinate::new(0.0, 0.0),
                ]],
            },
            properties,
        )
    }

    #[test]
    fn feature_id_wins_over_id_property() {
        let mut properties = Properties::new();
        properties.insert("id".into(), 3u64.into());
        assert_eq!(facility_id(&facility(properties.clone())), Some(Scalar::from(3u64)));
        assert_eq!(
            facility_id(&facility(properties).with_id("R-12")),
            Some(Scalar::from("R-12"))
        );
    }

    #[test]
    fn missing_or_null_id_is_none() {
        assert_eq!(facility_id(&facility(Properties::new())), None);
        let mut properties = Properties::new();
        properties.insert("id".into(), Scalar::Null.into());
        assert_eq!(facility_id(&facility(properties)), None);
    }

    #[test]
    fn copies_only_series_from_the_wave_point() {
        let mut own = Properties::new();
        own.insert("name".into(), "Recinto 4".into());
        let recinto = facility(own).with_id(4u64);

        let mut wave = Properties::new();
        wave.insert("time".into(), ["2024-04-23 00:00:00"].into_iter().collect());
        wave.insert("wave_height".into(), [0.7].into_iter().collect());
        wave.insert("name".into(), "grid".into());
        let wave_point = Feature::point(Coordinate::new(0.5, 0.5), wave);

        let enriched = with_wave_series(&recinto, &wave_point);
        assert_eq!(enriched.geometry, recinto.geometry);
        assert_eq!(enriched.id, recinto.id);
        assert_eq!(enriched.property("name"), Some(&PropertyValue::from("Recinto 4")));
        assert_eq!(
            enriched.property("wave_height").and_then(PropertyValue::as_series),
            Some(&[Scalar::from(0.7)][..])
        );
        assert!(enriched.property("time").is_some());
    }
}
