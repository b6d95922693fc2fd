use crate::types::feature::FeatureCollection;
use chrono::NaiveDate;
use std::fmt;

/// An inclusive `[start, end]` index range into a timestamp sequence
/// covering one calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DayRange {
    pub date: NaiveDate,
    pub start: usize,
    pub end: usize,
}

impl DayRange {
    /// Number of timestamps in the range. Never zero.
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index <= self.end
    }
}

impl fmt::Display for DayRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: [{}, {}]", self.date, self.start, self.end)
    }
}

/// One day's worth of every point, sliced to [`DayRange`].
#[derive(Debug, Clone, PartialEq)]
pub struct DayBucket {
    pub range: DayRange,
    pub collection: FeatureCollection,
}

impl DayBucket {
    pub fn date(&self) -> NaiveDate {
        self.range.date
    }
}

/// Result of splitting a dataset by calendar date.
///
/// Buckets are kept in scan order. With chronologically ordered input every
/// date appears once; an out-of-order sequence can produce several buckets
/// for the same date and they are kept separate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DaySegmentation {
    pub buckets: Vec<DayBucket>,
}

impl DaySegmentation {
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn ranges(&self) -> impl Iterator<Item = &DayRange> {
        self.buckets.iter().map(|bucket| &bucket.range)
    }

    /// First bucket for `date`, if any.
    pub fn get(&self, date: NaiveDate) -> Option<&DayBucket> {
        self.buckets.iter().find(|bucket| bucket.date() == date)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DayBucket> {
        self.buckets.iter()
    }
}

impl IntoIterator for DaySegmentation {
    type Item = DayBucket;
    type IntoIter = std::vec::IntoIter<DayBucket>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.into_iter()
    }
}

impl<'a> IntoIterator for &'a DaySegmentation {
    type Item = &'a DayBucket;
    type IntoIter = std::slice::Iter<'a, DayBucket>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.iter()
    }
}
