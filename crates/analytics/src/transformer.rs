//! Turns raw samples into the time-indexed, smoothed and truncated table the rest of
//! the pipeline works on.

use crate::error::AnalyticsError;
use chrono::{DateTime, Duration, Months, Utc};
use core_types::{Column, Sample};
use std::collections::BTreeMap;

type Kbn<T> = compensated_summation::KahanBabuskaNeumaier<T>;

/// The value columns stored at one timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Row {
    pub price: Option<f64>,
    pub volume: Option<f64>,
}

impl Row {
    pub fn value(&self, column: Column) -> Option<f64> {
        match column {
            Column::Price => self.price,
            Column::Volume => self.volume,
        }
    }

    fn set(&mut self, column: Column, value: Option<f64>) {
        match column {
            Column::Price => self.price = value,
            Column::Volume => self.volume = value,
        }
    }
}

/// Samples keyed by timestamp, ascending, one row per distinct timestamp.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesTable {
    rows: BTreeMap<DateTime<Utc>, Row>,
}

impl SeriesTable {
    /// Builds the table. A later sample with an already-seen timestamp replaces the
    /// earlier one.
    pub fn from_samples(samples: &[Sample]) -> Self {
        let rows = samples
            .iter()
            .map(|s| {
                (
                    s.timestamp,
                    Row {
                        price: s.price,
                        volume: s.volume,
                    },
                )
            })
            .collect();
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DateTime<Utc>, &Row)> {
        self.rows.iter()
    }

    /// Replaces every value with the mean of the column over the trailing window
    /// `(t - window, t]` ending at that row.
    ///
    /// Missing and non-finite values are skipped; a row whose window holds no usable
    /// value becomes missing.
    pub fn rolling_mean(&self, window: Duration) -> Result<SeriesTable, AnalyticsError> {
        if window < Duration::days(1) {
            return Err(AnalyticsError::InvalidWindow(window.num_days()));
        }

        let entries: Vec<(DateTime<Utc>, Row)> =
            self.rows.iter().map(|(ts, row)| (*ts, *row)).collect();
        let mut rolled: Vec<(DateTime<Utc>, Row)> =
            entries.iter().map(|(ts, _)| (*ts, Row::default())).collect();

        for column in Column::ALL {
            let means = trailing_means(&entries, column, window);
            for (slot, mean) in rolled.iter_mut().zip(means) {
                slot.1.set(column, mean);
            }
        }

        Ok(SeriesTable {
            rows: rolled.into_iter().collect(),
        })
    }

    /// Keeps the rows at or after `cutoff`.
    pub fn truncate_since(&self, cutoff: DateTime<Utc>) -> RollingWindowTable {
        let rows = self
            .rows
            .range(cutoff..)
            .map(|(ts, row)| (*ts, *row))
            .collect();
        RollingWindowTable { rows }
    }
}

/// Two-pointer sweep over the ascending entries.
///
/// The window sum is compensated, and a window whose usable values are all identical
/// yields that value exactly.
fn trailing_means(
    entries: &[(DateTime<Utc>, Row)],
    column: Column,
    window: Duration,
) -> Vec<Option<f64>> {
    let usable = |row: &Row| row.value(column).filter(|v| v.is_finite());

    let mut means = Vec::with_capacity(entries.len());
    let mut start = 0;
    let mut sum = Kbn::<f64>::default();
    let mut count = 0usize;
    // Latest run of equal usable values: its value, first index and length.
    let mut run_value: Option<f64> = None;
    let mut run_start = 0;
    let mut run_len = 0usize;

    for (i, (ts, row)) in entries.iter().enumerate() {
        if let Some(v) = usable(row) {
            sum += v;
            count += 1;
            if run_value == Some(v) {
                run_len += 1;
            } else {
                run_value = Some(v);
                run_start = i;
                run_len = 1;
            }
        }

        let lower = *ts - window;
        while entries[start].0 <= lower {
            if let Some(v) = usable(&entries[start].1) {
                sum -= v;
                count -= 1;
            }
            start += 1;
        }

        if count == 0 {
            sum = Kbn::default();
            means.push(None);
        } else if run_start < start || run_len == count {
            means.push(run_value);
        } else {
            means.push(Some(sum.total() / count as f64));
        }
    }

    means
}

/// The smoothed table restricted to the reporting period.
///
/// Rows are ascending by timestamp and unique per timestamp.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RollingWindowTable {
    rows: Vec<(DateTime<Utc>, Row)>,
}

impl RollingWindowTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[(DateTime<Utc>, Row)] {
        &self.rows
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.rows.iter().map(|(ts, _)| *ts).collect()
    }

    pub fn column(&self, column: Column) -> Vec<Option<f64>> {
        self.rows.iter().map(|(_, row)| row.value(column)).collect()
    }

    /// The value in the most recent row, if that row has one.
    pub fn latest(&self, column: Column) -> Option<f64> {
        self.rows.last().and_then(|(_, row)| row.value(column))
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.rows.first().map(|(ts, _)| *ts)
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.rows.last().map(|(ts, _)| *ts)
    }
}

/// `now` minus `months` calendar months. Day-of-month is clamped, so 31 March minus
/// one month is 29 February in a leap year. A span reaching past the earliest
/// representable date keeps everything.
pub fn cutoff_for(now: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    now.checked_sub_months(Months::new(months))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Runs the whole transform stage: index, smooth, truncate.
pub fn transform(
    samples: &[Sample],
    window: Duration,
    months: u32,
    now: DateTime<Utc>,
) -> Result<RollingWindowTable, AnalyticsError> {
    let series = SeriesTable::from_samples(samples);
    let rolled = series.rolling_mean(window)?;
    let cutoff = cutoff_for(now, months);
    let table = rolled.truncate_since(cutoff);

    tracing::debug!(
        samples = samples.len(),
        distinct = series.len(),
        kept = table.len(),
        %cutoff,
        "Transformed samples into rolling window table."
    );

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
    }

    fn daily(prices: &[f64], volumes: &[f64]) -> Vec<Sample> {
        prices
            .iter()
            .zip(volumes)
            .enumerate()
            .map(|(i, (p, v))| Sample::new(day(i as i64), Some(*p), Some(*v)))
            .collect()
    }

    #[test]
    fn later_duplicate_timestamps_win() {
        let samples = vec![
            Sample::new(day(0), Some(1.0), Some(10.0)),
            Sample::new(day(1), Some(2.0), Some(20.0)),
            Sample::new(day(0), Some(3.0), Some(30.0)),
        ];
        let table = SeriesTable::from_samples(&samples);

        assert_eq!(table.len(), 2);
        let (ts, row) = table.iter().next().unwrap();
        assert_eq!(*ts, day(0));
        assert_eq!(row.price, Some(3.0));
        assert_eq!(row.volume, Some(30.0));
    }

    #[test]
    fn seven_day_mean_of_the_reference_scenario() {
        let prices = [100.0, 100.0, 100.0, 105.0, 105.0, 105.0, 110.0, 110.0, 110.0, 110.0];
        let samples = daily(&prices, &[1.0; 10]);

        let rolled = SeriesTable::from_samples(&samples)
            .rolling_mean(Duration::days(7))
            .unwrap();
        let rows: Vec<_> = rolled.iter().map(|(_, r)| *r).collect();

        // The first row only sees itself.
        assert_eq!(rows[0].price, Some(100.0));
        // Samples 4..=10 fall inside (day 9 - 7d, day 9].
        assert_approx_eq!(rows[9].price.unwrap(), 755.0 / 7.0, 1e-9);
        assert!(rows.iter().all(|r| r.volume == Some(1.0)));
    }

    #[test]
    fn window_excludes_its_left_edge() {
        let samples = vec![
            Sample::new(day(0), Some(10.0), Some(1.0)),
            Sample::new(day(7), Some(20.0), Some(1.0)),
        ];
        let rolled = SeriesTable::from_samples(&samples)
            .rolling_mean(Duration::days(7))
            .unwrap();
        let last = rolled.iter().last().unwrap().1;
        assert_eq!(last.price, Some(20.0));
    }

    #[test]
    fn isolated_rows_keep_their_own_value() {
        let samples = vec![
            Sample::new(day(0), Some(10.0), Some(1.0)),
            Sample::new(day(30), Some(20.0), Some(2.0)),
            Sample::new(day(60), Some(30.0), Some(3.0)),
        ];
        let rolled = SeriesTable::from_samples(&samples)
            .rolling_mean(Duration::days(7))
            .unwrap();
        let prices: Vec<_> = rolled.iter().map(|(_, r)| r.price).collect();
        assert_eq!(prices, vec![Some(10.0), Some(20.0), Some(30.0)]);
    }

    #[test]
    fn missing_values_are_skipped() {
        let samples = vec![
            Sample::new(day(0), None, Some(1.0)),
            Sample::new(day(1), Some(4.0), None),
            Sample::new(day(2), Some(8.0), Some(3.0)),
        ];
        let rolled = SeriesTable::from_samples(&samples)
            .rolling_mean(Duration::days(7))
            .unwrap();
        let rows: Vec<_> = rolled.iter().map(|(_, r)| *r).collect();

        assert_eq!(rows[0].price, None);
        assert_eq!(rows[1].price, Some(4.0));
        assert_eq!(rows[2].price, Some(6.0));
        assert_eq!(rows[1].volume, Some(1.0));
        assert_eq!(rows[2].volume, Some(2.0));
    }

    #[test]
    fn zero_window_is_rejected() {
        let table = SeriesTable::from_samples(&daily(&[1.0], &[1.0]));
        assert_eq!(
            table.rolling_mean(Duration::zero()),
            Err(AnalyticsError::InvalidWindow(0))
        );
    }

    #[test]
    fn truncation_keeps_rows_at_or_after_the_cutoff() {
        let samples = daily(&[1.0, 2.0, 3.0, 4.0], &[1.0, 2.0, 3.0, 4.0]);
        let table = SeriesTable::from_samples(&samples).truncate_since(day(2));

        assert_eq!(table.timestamps(), vec![day(2), day(3)]);
        assert_eq!(table.column(Column::Price), vec![Some(3.0), Some(4.0)]);
        assert_eq!(table.latest(Column::Volume), Some(4.0));
    }

    #[test]
    fn long_cutoff_keeps_the_full_history() {
        let samples = daily(&[5.0, 6.0, 7.0], &[1.0, 2.0, 3.0]);
        let now = day(3);

        let table = transform(&samples, Duration::days(7), 1200, now).unwrap();
        let full = SeriesTable::from_samples(&samples)
            .rolling_mean(Duration::days(7))
            .unwrap();

        let expected: Vec<_> = full.iter().map(|(ts, row)| (*ts, *row)).collect();
        assert_eq!(table.rows(), expected.as_slice());
    }

    #[test]
    fn cutoff_leaving_no_rows_yields_an_empty_table() {
        let samples = daily(&[5.0, 6.0], &[1.0, 2.0]);
        let now = day(400);
        let table = transform(&samples, Duration::days(7), 1, now).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.latest(Column::Price), None);
    }

    #[test]
    fn constant_windows_keep_the_exact_value() {
        let samples = daily(&[0.1; 60], &[1.1; 60]);
        let rolled = SeriesTable::from_samples(&samples)
            .rolling_mean(Duration::days(7))
            .unwrap();

        assert!(rolled.iter().all(|(_, r)| r.price == Some(0.1)));
        assert!(rolled.iter().all(|(_, r)| r.volume == Some(1.1)));
    }

    #[test]
    fn constant_run_after_a_gap_is_exact() {
        let samples = vec![
            Sample::new(day(0), Some(5.0), Some(1.0)),
            Sample::new(day(1), None, Some(1.0)),
            Sample::new(day(2), Some(0.3), Some(1.0)),
            Sample::new(day(3), Some(0.3), Some(1.0)),
            Sample::new(day(9), Some(0.3), Some(1.0)),
            Sample::new(day(10), Some(0.3), Some(1.0)),
        ];
        let rolled = SeriesTable::from_samples(&samples)
            .rolling_mean(Duration::days(7))
            .unwrap();
        let prices: Vec<_> = rolled.iter().map(|(_, r)| r.price).collect();

        assert_eq!(prices[1], Some(5.0));
        assert_approx_eq!(prices[2].unwrap(), 5.3 / 2.0, 1e-12);
        // Day 0 has left the window by day 9.
        assert_eq!(prices[4], Some(0.3));
        assert_eq!(prices[5], Some(0.3));
    }

    #[test]
    fn oversized_month_span_keeps_the_full_history() {
        let samples = daily(&[5.0], &[1.0]);
        let now = day(1);

        assert_eq!(cutoff_for(now, u32::MAX), DateTime::<Utc>::MIN_UTC);
        let table = transform(&samples, Duration::days(7), u32::MAX, now).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.latest(Column::Price), Some(5.0));
    }

    #[test]
    fn cutoff_clamps_to_month_end() {
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap();
        let cutoff = cutoff_for(now, 1);
        assert_eq!(cutoff, Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap());
    }

    proptest! {
        #[test]
        fn table_is_an_ascending_subsequence_after_the_cutoff(
            offsets in prop::collection::vec(0i64..120, 1..60),
            months in 1u32..6,
        ) {
            let samples: Vec<Sample> = offsets
                .iter()
                .map(|d| Sample::new(day(*d), Some(*d as f64), Some(1.0)))
                .collect();
            let now = day(120);
            let cutoff = cutoff_for(now, months);

            let table = transform(&samples, Duration::days(7), months, now).unwrap();
            let stamps = table.timestamps();

            prop_assert!(stamps.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(stamps.iter().all(|ts| *ts >= cutoff));
            prop_assert!(stamps.iter().all(|ts| samples.iter().any(|s| s.timestamp == *ts)));
            let expected = samples
                .iter()
                .map(|s| s.timestamp)
                .filter(|ts| *ts >= cutoff)
                .collect::<std::collections::BTreeSet<_>>();
            prop_assert_eq!(stamps.len(), expected.len());
        }

        #[test]
        fn rolling_mean_matches_a_direct_average(
            values in prop::collection::vec((0i64..40, 0.0f64..1_000.0), 1..40),
        ) {
            let samples: Vec<Sample> = values
                .iter()
                .map(|(d, v)| Sample::new(day(*d), Some(*v), Some(*v)))
                .collect();
            let series = SeriesTable::from_samples(&samples);
            let window = Duration::days(7);
            let rolled = series.rolling_mean(window).unwrap();

            for (ts, row) in rolled.iter() {
                let inside: Vec<f64> = series
                    .iter()
                    .filter(|(other, _)| **other > *ts - window && **other <= *ts)
                    .filter_map(|(_, r)| r.price)
                    .collect();
                let expected = inside.iter().sum::<f64>() / inside.len() as f64;
                prop_assert!((row.price.unwrap() - expected).abs() < 1e-6);
            }
        }
    }
}
