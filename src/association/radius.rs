use crate::association::associate::{matched_point, ReferenceSet};
use crate::association::error::AssociateError;
use crate::types::coordinate::Coordinate;
use crate::types::feature::{Feature, Scalar};
use log::debug;

/// A query that found a reference point within the allowed radius.
#[derive(Debug, Clone, PartialEq)]
pub struct RadiusMatch {
    /// Position of the query in the input slice.
    pub query_index: usize,
    /// Great-circle distance from the query to the match.
    pub distance_km: f64,
    /// The matched reference point (its coordinate and properties).
    pub feature: Feature,
}

impl RadiusMatch {
    /// The matched point with `facility_index` and `distance_km` added to
    /// its properties, plus `facility_id` when the facility has one.
    pub fn into_annotated_feature(self, facility_id: Option<Scalar>) -> Feature {
        let mut feature = self.feature;
        feature
            .properties
            .insert("facility_index".to_string(), Scalar::from(self.query_index).into());
        if let Some(id) = facility_id {
            feature.properties.insert("facility_id".to_string(), id.into());
        }
        feature
            .properties
            .insert("distance_km".to_string(), Scalar::from(self.distance_km).into());
        feature
    }
}

/// Associates each query with its nearest reference point by haversine
/// distance, dropping queries whose nearest point is farther than
/// `max_distance_km`.
///
/// Unlike [`crate::associate`] the output does not line up with the input, so
/// every [`RadiusMatch`] records the index of the query it belongs to. Ties are
/// resolved in favour of the earlier reference point and duplicate reference
/// coordinates are collapsed to their first occurrence.
///
/// # Errors
///
/// * [`AssociateError::InvalidRadius`] if `max_distance_km` is negative or not finite.
/// * [`AssociateError::NoMatchFound`] if `reference` is empty, or if there are
///   queries and none of them has a match within the radius.
/// * [`AssociateError::NotAPoint`] if a reference feature is not a point.
pub fn associate_within_radius(
    queries: &[Coordinate],
    reference: &[Feature],
    max_distance_km: f64,
) -> Result<Vec<RadiusMatch>, AssociateError> {
    if !max_distance_km.is_finite() || max_distance_km < 0.0 {
        return Err(AssociateError::InvalidRadius(max_distance_km));
    }
    let set = ReferenceSet::new(reference)?;

    let mut matches = Vec::with_capacity(queries.len());
    for (query_index, query) in queries.iter().enumerate() {
        let Some((entry, distance_km)) = set.nearest_by(|candidate| query.haversine_km(candidate))
        else {
            continue;
        };
        if distance_km > max_distance_km {
            debug!(
                "Query {} dropped: nearest point is {:.3} km away (limit {} km)",
                query_index, distance_km, max_distance_km
            );
            continue;
        }
        matches.push(RadiusMatch {
            query_index,
            distance_km,
            feature: matched_point(entry),
        });
    }

    if !queries.is_empty() && matches.is_empty() {
        return Err(AssociateError::NoMatchFound {
            within_km: Some(max_distance_km),
        });
    }
    Ok(matches)
}
