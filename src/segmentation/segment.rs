//! Splits datasets whose points share one timestamp sequence into one
//! collection per calendar day.

use crate::segmentation::error::SegmentError;
use crate::segmentation::timestamp::calendar_date;
use crate::types::day_bucket::{DayBucket, DayRange, DaySegmentation};
use crate::types::feature::{Feature, FeatureCollection, PropertyValue, Scalar};
use crate::types::wave_grid::TIME_PROPERTY;
use chrono::NaiveDate;
use log::debug;

fn parse_date(index: usize, value: &str) -> Result<NaiveDate, SegmentError> {
    calendar_date(value).ok_or_else(|| SegmentError::MalformedTimestamp {
        index,
        value: value.to_string(),
    })
}

/// Computes the per-day index ranges of a timestamp sequence.
///
/// A single left-to-right scan: a new range opens at index 0 and whenever the
/// calendar date differs from the previous element's; the open range is
/// closed at the previous index. Ranges are inclusive at both ends and
/// together cover `0..timestamps.len()` exactly once.
///
/// The sequence is expected to be in non-decreasing order. It is not sorted
/// here: if a date reappears after another date, it gets a second,
/// separate range.
///
/// # Errors
///
/// [`SegmentError::MalformedTimestamp`] for the first timestamp that does not
/// parse (see [`calendar_date`] for the accepted layouts).
///
/// # Examples
///
/// ```
/// use aquawatch::day_ranges;
///
/// let ranges = day_ranges(&["2024-01-01T00:00", "2024-01-01T01:00", "2024-01-02T00:00"]).unwrap();
/// let spans: Vec<_> = ranges.iter().map(|r| (r.date.to_string(), r.start, r.end)).collect();
/// assert_eq!(spans, [("2024-01-01".to_string(), 0, 1), ("2024-01-02".to_string(), 2, 2)]);
/// ```
pub fn day_ranges<S: AsRef<str>>(timestamps: &[S]) -> Result<Vec<DayRange>, SegmentError> {
    let mut ranges = Vec::new();
    let mut open: Option<DayRange> = None;

    for (index, timestamp) in timestamps.iter().enumerate() {
        let date = parse_date(index, timestamp.as_ref())?;
        if let Some(current) = open.as_mut() {
            if current.date == date {
                current.end = index;
                continue;
            }
            ranges.push(*current);
        }
        open = Some(DayRange {
            date,
            start: index,
            end: index,
        });
    }
    ranges.extend(open);
    Ok(ranges)
}

/// Every `Series` property of every point must have one value per timestamp.
fn check_alignment(expected: usize, points: &[Feature]) -> Result<(), SegmentError> {
    for (point, feature) in points.iter().enumerate() {
        for (property, value) in &feature.properties {
            if let PropertyValue::Series(values) = value {
                if values.len() != expected {
                    return Err(SegmentError::MisalignedInput {
                        point,
                        property: property.clone(),
                        expected,
                        found: values.len(),
                    });
                }
            }
        }
    }
    Ok(())
}

fn select<F>(feature: &Feature, pick: F) -> Feature
where
    F: Fn(&[Scalar]) -> Vec<Scalar>,
{
    let properties = feature
        .properties
        .iter()
        .map(|(name, value)| {
            let value = match value {
                PropertyValue::Series(values) => PropertyValue::Series(pick(values)),
                other => other.clone(),
            };
            (name.clone(), value)
        })
        .collect();
    feature.with_properties(properties)
}

/// Splits `points` into one collection per calendar day of `timestamps`.
///
/// Every output point keeps its geometry (and id); each `Series` property is
/// cut to the day's `[start, end]` slice and other properties are copied as
/// they are. Concatenating the buckets' series in order gives back the input
/// series.
///
/// An empty `timestamps` slice gives an empty result.
///
/// # Errors
///
/// * [`SegmentError::MisalignedInput`] if any series property's length is
///   not `timestamps.len()`.
/// * [`SegmentError::MalformedTimestamp`] if a timestamp does not parse.
pub fn segment<S: AsRef<str>>(
    timestamps: &[S],
    points: &[Feature],
) -> Result<DaySegmentation, SegmentError> {
    check_alignment(timestamps.len(), points)?;
    let ranges = day_ranges(timestamps)?;

    let buckets: Vec<DayBucket> = ranges
        .into_iter()
        .map(|range| DayBucket {
            range,
            collection: points
                .iter()
                .map(|point| select(point, |values| values[range.start..=range.end].to_vec()))
                .collect(),
        })
        .collect();

    debug!(
        "Split {} timestamps across {} points into {} day buckets",
        timestamps.len(),
        points.len(),
        buckets.len()
    );
    Ok(DaySegmentation { buckets })
}

/// Reads the timestamp sequence shared by a collection from the `time`
/// series of its first feature.
///
/// An empty collection has an empty sequence.
///
/// # Errors
///
/// * [`SegmentError::MissingTimestamps`] if the first feature has no `time` series.
/// * [`SegmentError::MalformedTimestamp`] if an entry is not a string.
pub fn shared_timestamps(collection: &FeatureCollection) -> Result<Vec<String>, SegmentError> {
    let Some(first) = collection.features.first() else {
        return Ok(Vec::new());
    };
    let series = first
        .property(TIME_PROPERTY)
        .and_then(PropertyValue::as_series)
        .ok_or_else(|| SegmentError::MissingTimestamps(TIME_PROPERTY.to_string()))?;

    series
        .iter()
        .enumerate()
        .map(|(index, value)| match value {
            Scalar::Text(text) => Ok(text.clone()),
            other => Err(SegmentError::MalformedTimestamp {
                index,
                value: serde_json::to_string(other).unwrap_or_default(),
            }),
        })
        .collect()
}

/// [`segment`] using the collection's own shared timestamps.
pub fn segment_collection(collection: &FeatureCollection) -> Result<DaySegmentation, SegmentError> {
    let timestamps = shared_timestamps(collection)?;
    segment(&timestamps, &collection.features)
}

/// Gathers every index whose calendar date is `date` into one collection.
///
/// Unlike [`segment`], indices do not need to be contiguous: the result holds
/// all of that day's readings even if the sequence is out of order. A date
/// that never occurs yields points with empty series.
pub fn slice_for_date<S: AsRef<str>>(
    timestamps: &[S],
    points: &[Feature],
    date: NaiveDate,
) -> Result<FeatureCollection, SegmentError> {
    check_alignment(timestamps.len(), points)?;
    let mut indices = Vec::new();
    for (index, timestamp) in timestamps.iter().enumerate() {
        if parse_date(index, timestamp.as_ref())? == date {
            indices.push(index);
        }
    }

    Ok(points
        .iter()
        .map(|point| select(point, |values| indices.iter().map(|&i| values[i].clone()).collect()))
        .collect())
}
