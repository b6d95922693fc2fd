//! R-tree accelerated variant of [`crate::associate`] for large reference sets.
//!
//! The tree is searched in Euclidean order. Since the Euclidean distance never
//! exceeds the Manhattan distance, the search can stop as soon as a candidate's
//! Euclidean distance is larger than the best Manhattan distance seen; every
//! remaining candidate is then strictly worse. Results, including tie-breaking
//! on the earliest reference point, match the linear scan exactly.

use crate::association::associate::{matched_point, ReferenceEntry, ReferenceSet};
use crate::association::error::AssociateError;
use crate::types::coordinate::Coordinate;
use crate::types::feature::Feature;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

#[derive(Debug, Clone, Copy)]
struct IndexedPoint {
    /// Position in the deduplicated entry list, which preserves input order.
    slot: usize,
    position: [f64; 2],
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

impl PointDistance for IndexedPoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.position[0] - point[0];
        let dy = self.position[1] - point[1];
        dx * dx + dy * dy
    }
}

pub struct IndexedReference<'a> {
    set: ReferenceSet<'a>,
    rtree: RTree<IndexedPoint>,
}

impl<'a> IndexedReference<'a> {
    pub fn new(reference: &'a [Feature]) -> Result<Self, AssociateError> {
        let set = ReferenceSet::new(reference)?;
        let points = set
            .entries()
            .iter()
            .enumerate()
            .map(|(slot, entry)| IndexedPoint {
                slot,
                position: [entry.coordinate.lon(), entry.coordinate.lat()],
            })
            .collect();
        Ok(Self {
            set,
            rtree: RTree::bulk_load(points),
        })
    }

    pub fn nearest(&self, query: &Coordinate) -> Option<&ReferenceEntry<'a>> {
        let target = [query.lon(), query.lat()];
        let entries = self.set.entries();
        let mut best: Option<(f64, usize)> = None;

        for candidate in self.rtree.nearest_neighbor_iter(&target) {
            let euclidean = candidate.distance_2(&target).sqrt();
            if let Some((best_distance, _)) = best {
                if euclidean > best_distance {
                    break;
                }
            }
            let distance = query.manhattan(&entries[candidate.slot].coordinate);
            best = match best {
                Some((best_distance, best_slot))
                    if distance > best_distance
                        || (distance == best_distance && candidate.slot > best_slot) =>
                {
                    Some((best_distance, best_slot))
                }
                _ => Some((distance, candidate.slot)),
            };
        }

        best.map(|(_, slot)| &entries[slot])
    }

    /// Same contract as [`crate::associate`].
    pub fn associate(&self, queries: &[Coordinate]) -> Result<Vec<Feature>, AssociateError> {
        queries
            .iter()
            .map(|query| {
                self.nearest(query)
                    .map(matched_point)
                    .ok_or(AssociateError::NoMatchFound { within_km: None })
            })
            .collect()
    }
}
