use crate::facilities::error::FacilityError;
use crate::types::coordinate::Coordinate;
use crate::types::feature::{Feature, FeatureCollection, Geometry};

/// Mean of a ring's vertices, skipping the closing vertex when the ring is
/// explicitly closed.
fn ring_mean(ring: &[Coordinate]) -> Option<Coordinate> {
    let vertices = match ring {
        [first, .., last] if ring.len() > 2 && first.same_position(last) => &ring[..ring.len() - 1],
        _ => ring,
    };
    if vertices.is_empty() {
        return None;
    }
    let n = vertices.len() as f64;
    let (lon, lat) = vertices
        .iter()
        .fold((0.0, 0.0), |(lon, lat), c| (lon + c.lon(), lat + c.lat()));
    Some(Coordinate::new(lon / n, lat / n))
}

/// The point used to represent a facility when matching it against
/// measurement points.
///
/// Points represent themselves. Polygons use the mean of the distinct
/// vertices of their exterior ring, so the closing vertex is not counted
/// twice. Multi-geometries use their first member and a geometry collection
/// its first member that has a representative. Line geometries have none.
///
/// The vertex mean is not an area centroid and is biased towards densely
/// digitised edges.
pub fn representative_point(geometry: &Geometry) -> Option<Coordinate> {
    match geometry {
        Geometry::Point { coordinates } => Some(*coordinates),
        Geometry::MultiPoint { coordinates } => coordinates.first().copied(),
        Geometry::Polygon { coordinates } => coordinates.first().and_then(|ring| ring_mean(ring)),
        Geometry::MultiPolygon { coordinates } => coordinates
            .first()
            .and_then(|polygon| polygon.first())
            .and_then(|ring| ring_mean(ring)),
        Geometry::GeometryCollection { geometries } => {
            geometries.iter().find_map(representative_point)
        }
        Geometry::LineString { .. } | Geometry::MultiLineString { .. } => None,
    }
}

fn facility_query(index: usize, facility: &Feature) -> Result<Coordinate, FacilityError> {
    let geometry = facility
        .geometry
        .as_ref()
        .ok_or(FacilityError::MissingGeometry { index })?;
    representative_point(geometry).ok_or_else(|| match geometry {
        Geometry::LineString { .. } | Geometry::MultiLineString { .. } => {
            FacilityError::UnsupportedGeometry {
                index,
                kind: geometry.kind(),
            }
        }
        _ => FacilityError::EmptyGeometry { index },
    })
}

/// Representative points of every facility, in collection order.
///
/// # Errors
///
/// For the first facility that has no representative point:
/// [`FacilityError::MissingGeometry`] when its geometry is null,
/// [`FacilityError::UnsupportedGeometry`] for lines and
/// [`FacilityError::EmptyGeometry`] when there are no vertices.
pub fn facility_queries(facilities: &FeatureCollection) -> Result<Vec<Coordinate>, FacilityError> {
    facilities
        .features
        .iter()
        .enumerate()
        .map(|(index, facility)| facility_query(index, facility))
        .collect()
}
