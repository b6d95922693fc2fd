//! Nearest-point association between facility locations and measurement
//! points, ranked by Manhattan distance on raw longitude/latitude.

use crate::association::error::AssociateError;
use crate::types::coordinate::Coordinate;
use crate::types::feature::Feature;
use log::debug;
use ordered_float::OrderedFloat;
use std::collections::HashSet;

/// A deduplicated view over a reference slice.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceEntry<'a> {
    /// Position of the feature in the slice the set was built from.
    pub index: usize,
    pub coordinate: Coordinate,
    pub feature: &'a Feature,
}

/// Candidate points a query is matched against.
///
/// Building the set validates that every feature is a point and collapses
/// features with identical coordinates onto the first of them, so only that
/// first feature can ever be returned as a match.
#[derive(Debug, Clone)]
pub struct ReferenceSet<'a> {
    entries: Vec<ReferenceEntry<'a>>,
}

impl<'a> ReferenceSet<'a> {
    pub fn new(reference: &'a [Feature]) -> Result<Self, AssociateError> {
        if reference.is_empty() {
            return Err(AssociateError::NoMatchFound { within_km: None });
        }

        let mut seen = HashSet::with_capacity(reference.len());
        let mut entries = Vec::with_capacity(reference.len());
        for (index, feature) in reference.iter().enumerate() {
            let coordinate = feature
                .coordinate()
                .ok_or(AssociateError::NotAPoint { index })?;
            if seen.insert(position_key(&coordinate)) {
                entries.push(ReferenceEntry {
                    index,
                    coordinate,
                    feature,
                });
            }
        }

        let collapsed = reference.len() - entries.len();
        if collapsed > 0 {
            debug!(
                "Collapsed {} reference points sharing a coordinate with an earlier point",
                collapsed
            );
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ReferenceEntry<'a>] {
        &self.entries
    }

    /// Entry minimising `metric`, together with its distance.
    /// The earliest entry wins when several share the minimum.
    pub fn nearest_by<F>(&self, metric: F) -> Option<(&ReferenceEntry<'a>, f64)>
    where
        F: Fn(&Coordinate) -> f64,
    {
        self.entries
            .iter()
            .map(|entry| (entry, metric(&entry.coordinate)))
            // min_by_key keeps the first of equal minima
            .min_by_key(|(_, distance)| OrderedFloat(*distance))
    }

    pub fn nearest(&self, query: &Coordinate) -> Option<&ReferenceEntry<'a>> {
        self.nearest_by(|candidate| query.manhattan(candidate))
            .map(|(entry, _)| entry)
    }
}

/// Normalises `-0.0` to `0.0` so both hash to the same key.
fn position_key(coordinate: &Coordinate) -> (u64, u64) {
    (
        (coordinate.lon() + 0.0).to_bits(),
        (coordinate.lat() + 0.0).to_bits(),
    )
}

/// A fresh point carrying the matched coordinate and a copy of its properties.
pub(crate) fn matched_point(entry: &ReferenceEntry<'_>) -> Feature {
    Feature::point(entry.coordinate, entry.feature.properties.clone())
}

/// Finds the reference point closest to `query`.
///
/// Returns the index of the match in `reference` and the feature itself.
///
/// # Errors
///
/// [`AssociateError::NoMatchFound`] if `reference` is empty,
/// [`AssociateError::NotAPoint`] if a reference feature is not a point.
pub fn nearest(
    query: Coordinate,
    reference: &[Feature],
) -> Result<(usize, &Feature), AssociateError> {
    let set = ReferenceSet::new(reference)?;
    let entry = set
        .nearest(&query)
        .ok_or(AssociateError::NoMatchFound { within_km: None })?;
    Ok((entry.index, entry.feature))
}

/// Associates each query with its nearest reference point.
///
/// The output has one point per query, in query order. Each output point is
/// located at the *matched reference point's* coordinate and carries that
/// point's properties; nothing identifying the query is attached, so callers
/// correlate results by position.
///
/// Distance is `|dlon| + |dlat|` in raw degrees. On equal distances the
/// reference point that appears first wins.
///
/// # Errors
///
/// [`AssociateError::NoMatchFound`] if `reference` is empty, even when there
/// are no queries. [`AssociateError::NotAPoint`] if a reference feature does
/// not have a point geometry.
///
/// # Examples
///
/// ```
/// use aquawatch::{associate, Coordinate, Feature, Properties};
///
/// let mut low = Properties::new();
/// low.insert("h".into(), 1.0.into());
/// let mut high = Properties::new();
/// high.insert("h".into(), 2.0.into());
/// let reference = vec![
///     Feature::point(Coordinate::new(0.0, 0.0), low.clone()),
///     Feature::point(Coordinate::new(10.0, 10.0), high),
/// ];
///
/// let matched = associate(&[Coordinate::new(1.0, 1.0)], &reference).unwrap();
/// assert_eq!(matched[0].coordinate(), Some(Coordinate::new(0.0, 0.0)));
/// assert_eq!(matched[0].properties, low);
/// ```
pub fn associate(
    queries: &[Coordinate],
    reference: &[Feature],
) -> Result<Vec<Feature>, AssociateError> {
    let set = ReferenceSet::new(reference)?;
    queries
        .iter()
        .map(|query| {
            set.nearest(query)
                .map(matched_point)
                .ok_or(AssociateError::NoMatchFound { within_km: None })
        })
        .collect()
}
