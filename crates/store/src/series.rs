//! Ordered usage series with dedup and fill semantics.

use chrono::{DateTime, Utc};

use crate::error::{Result, StoreError};
use crate::reading::{floor_to_hour, Reading};

/// Ordered sequence of hourly readings.
///
/// Invariants: timestamps strictly increasing, at most one reading per
/// hour key, every usage value finite.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    readings: Vec<Reading>,
}

impl TimeSeries {
    /// Build a series from raw rows: dedup by hour key (keep-last),
    /// sort ascending, forward-fill missing values, then mean-fill
    /// anything still missing (leading gaps).
    ///
    /// Non-finite usage values count as missing. Errors with
    /// [`StoreError::NoData`] when no row carries a usable value.
    pub fn from_rows(rows: Vec<(DateTime<Utc>, Option<f64>)>) -> Result<Self> {
        let mut deduped: Vec<(DateTime<Utc>, Option<f64>)> = Vec::with_capacity(rows.len());
        for (timestamp, usage) in rows {
            let timestamp = floor_to_hour(timestamp);
            let usage = usage.filter(|u| u.is_finite());
            match deduped.iter().position(|(t, _)| *t == timestamp) {
                Some(i) => deduped[i] = (timestamp, usage),
                None => deduped.push((timestamp, usage)),
            }
        }
        deduped.sort_by_key(|(timestamp, _)| *timestamp);

        let known: Vec<f64> = deduped.iter().filter_map(|(_, u)| *u).collect();
        if known.is_empty() {
            return Err(StoreError::NoData);
        }
        let mean = known.iter().sum::<f64>() / known.len() as f64;

        let mut readings = Vec::with_capacity(deduped.len());
        let mut carried: Option<f64> = None;
        for (timestamp, usage) in deduped {
            let usage = usage.or(carried).unwrap_or(mean);
            carried = Some(usage);
            readings.push(Reading { timestamp, usage });
        }
        Ok(Self { readings })
    }

    /// Keep-last upsert at the reading's hour key. Order is preserved;
    /// repeated identical inserts are idempotent.
    pub fn insert(&mut self, reading: Reading) {
        match self
            .readings
            .binary_search_by_key(&reading.timestamp, |r| r.timestamp)
        {
            Ok(i) => self.readings[i] = reading,
            Err(i) => self.readings.insert(i, reading),
        }
    }

    /// Arithmetic mean of all usage values. Zero for an empty series.
    pub fn mean(&self) -> f64 {
        if self.readings.is_empty() {
            return 0.0;
        }
        self.readings.iter().map(|r| r.usage).sum::<f64>() / self.readings.len() as f64
    }

    /// Usage values in timestamp order.
    pub fn values(&self) -> Vec<f64> {
        self.readings.iter().map(|r| r.usage).collect()
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn last(&self) -> Option<&Reading> {
        self.readings.last()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn hour(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 1, h, 0, 0).unwrap()
    }

    #[test]
    fn test_from_rows_dedup_keeps_last() {
        let series = TimeSeries::from_rows(vec![
            (hour(0), Some(10.0)),
            (hour(1), Some(11.0)),
            (hour(0), Some(12.0)),
        ])
        .unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.readings()[0].usage, 12.0);
    }

    #[test]
    fn test_from_rows_sorts_ascending() {
        let series = TimeSeries::from_rows(vec![
            (hour(3), Some(3.0)),
            (hour(1), Some(1.0)),
            (hour(2), Some(2.0)),
        ])
        .unwrap();

        let timestamps: Vec<_> = series.readings().iter().map(|r| r.timestamp).collect();
        assert!(timestamps.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_forward_fill_then_mean_fill() {
        let series = TimeSeries::from_rows(vec![
            (hour(0), None),
            (hour(1), Some(4.0)),
            (hour(2), None),
            (hour(3), Some(8.0)),
        ])
        .unwrap();

        let values = series.values();
        // Leading gap takes the mean of known values (6.0), the
        // interior gap carries the last known value forward.
        assert_eq!(values, vec![6.0, 4.0, 4.0, 8.0]);
    }

    #[test]
    fn test_nan_counts_as_missing() {
        let series =
            TimeSeries::from_rows(vec![(hour(0), Some(5.0)), (hour(1), Some(f64::NAN))]).unwrap();

        assert_eq!(series.values(), vec![5.0, 5.0]);
    }

    #[test]
    fn test_all_missing_is_an_error() {
        let result = TimeSeries::from_rows(vec![(hour(0), None), (hour(1), Some(f64::NAN))]);
        assert!(matches!(result, Err(StoreError::NoData)));
    }

    #[test]
    fn test_insert_replaces_at_same_hour() {
        let mut series = TimeSeries::from_rows(vec![(hour(0), Some(10.0))]).unwrap();

        series.insert(Reading::new(hour(0), 11.0));
        series.insert(Reading::new(hour(0), 11.0));

        assert_eq!(series.len(), 1);
        assert_eq!(series.readings()[0].usage, 11.0);
    }

    #[test]
    fn test_insert_keeps_strict_ordering() {
        let mut series = TimeSeries::from_rows(vec![(hour(5), Some(5.0))]).unwrap();
        for h in [9, 2, 7, 0, 5, 3] {
            series.insert(Reading::new(hour(h), h as f64));
        }

        let timestamps: Vec<_> = series.readings().iter().map(|r| r.timestamp).collect();
        assert!(timestamps.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(series.len(), 6);
    }

    #[test]
    fn test_mean() {
        let series = TimeSeries::from_rows(vec![
            (hour(0), Some(10.0)),
            (hour(1), Some(12.0)),
            (hour(2), Some(14.0)),
        ])
        .unwrap();

        assert_eq!(series.mean(), 12.0);
    }
}
