use crate::error::AnalyticsError;
use crate::transformer::RollingWindowTable;
use chrono::{DateTime, Utc};
use core_types::{Column, StdDevEstimator};

/// Standardised deviations of one column, aligned with the table it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ZScoreSeries {
    pub column: Column,
    pub timestamps: Vec<DateTime<Utc>>,
    pub values: Vec<f64>,
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Standard deviation with the given estimator.
///
/// `None` when there are not enough values for the estimator (one value for the
/// sample estimator, none for the population one).
pub fn std_dev(values: &[f64], estimator: StdDevEstimator) -> Option<f64> {
    let n = values.len();
    let ddof = estimator.ddof();
    if n <= ddof {
        return None;
    }
    let mean = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    Some((sum_sq / (n - ddof) as f64).sqrt())
}

/// Computes the Z-score of every value in `column`.
pub fn column_zscore(
    table: &RollingWindowTable,
    column: Column,
    estimator: StdDevEstimator,
) -> Result<ZScoreSeries, AnalyticsError> {
    if table.is_empty() {
        return Err(AnalyticsError::EmptyWindow);
    }

    let raw = table.column(column);
    let missing = raw.iter().filter(|v| v.is_none()).count();
    if missing > 0 {
        return Err(AnalyticsError::MissingValues {
            column,
            count: missing,
        });
    }
    let values: Vec<f64> = raw.into_iter().flatten().collect();
    if values.iter().any(|v| !v.is_finite()) {
        return Err(AnalyticsError::NonFiniteValues { column });
    }

    // Fewer than two distinct values means zero spread, whatever rounding says.
    let first = values[0];
    if values.iter().all(|v| *v == first) {
        return Err(AnalyticsError::ZeroVariance { column });
    }

    let mean = mean(&values).ok_or(AnalyticsError::EmptyWindow)?;
    let sd = std_dev(&values, estimator)
        .filter(|sd| *sd > 0.0 && sd.is_finite())
        .ok_or(AnalyticsError::ZeroVariance { column })?;

    let values = values.iter().map(|v| (v - mean) / sd).collect();

    Ok(ZScoreSeries {
        column,
        timestamps: table.timestamps(),
        values,
    })
}

/// Computes Z-scores for every column independently, so a failure in one column
/// does not hide the result of the other.
pub fn zscores(
    table: &RollingWindowTable,
    estimator: StdDevEstimator,
) -> Vec<(Column, Result<ZScoreSeries, AnalyticsError>)> {
    Column::ALL
        .into_iter()
        .map(|column| (column, column_zscore(table, column, estimator)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transformer::SeriesTable;
    use assert_approx_eq::assert_approx_eq;
    use chrono::{Duration, TimeZone};
    use core_types::Sample;
    use proptest::prelude::*;

    fn table(prices: &[Option<f64>], volumes: &[Option<f64>]) -> RollingWindowTable {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let samples: Vec<Sample> = prices
            .iter()
            .zip(volumes)
            .enumerate()
            .map(|(i, (p, v))| Sample::new(start + Duration::days(i as i64), *p, *v))
            .collect();
        SeriesTable::from_samples(&samples).truncate_since(start)
    }

    #[test]
    fn std_dev_respects_the_estimator() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_approx_eq!(std_dev(&values, StdDevEstimator::Population).unwrap(), 2.0);
        assert_approx_eq!(
            std_dev(&values, StdDevEstimator::Sample).unwrap(),
            (32.0f64 / 7.0).sqrt()
        );
        assert_eq!(std_dev(&[1.0], StdDevEstimator::Sample), None);
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn zscores_are_standardised() {
        let t = table(
            &[Some(1.0), Some(2.0), Some(3.0), Some(4.0)],
            &[Some(10.0), Some(30.0), Some(20.0), Some(40.0)],
        );
        let z = column_zscore(&t, Column::Price, StdDevEstimator::Sample).unwrap();

        assert_eq!(z.timestamps, t.timestamps());
        let sd = (5.0f64 / 3.0).sqrt();
        assert_approx_eq!(z.values[0], -1.5 / sd);
        assert_approx_eq!(z.values[3], 1.5 / sd);
    }

    #[test]
    fn all_zero_column_is_a_domain_error() {
        let t = table(&[Some(1.0), Some(2.0)], &[Some(0.0), Some(0.0)]);
        let results = zscores(&t, StdDevEstimator::Sample);

        assert!(results[0].1.is_ok());
        assert_eq!(
            results[1].1,
            Err(AnalyticsError::ZeroVariance {
                column: Column::Volume
            })
        );
    }

    #[test]
    fn smoothed_constant_columns_are_a_domain_error() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let samples: Vec<Sample> = (0..60)
            .map(|i| Sample::new(start + Duration::days(i), Some(0.1), Some(1.1)))
            .collect();
        let t = crate::transformer::transform(&samples, Duration::days(7), 1, start + Duration::days(60))
            .unwrap();
        assert!(t.len() > 1);

        let results = zscores(&t, StdDevEstimator::Sample);
        assert_eq!(
            results[0].1,
            Err(AnalyticsError::ZeroVariance {
                column: Column::Price
            })
        );
        assert_eq!(
            results[1].1,
            Err(AnalyticsError::ZeroVariance {
                column: Column::Volume
            })
        );
    }

    #[test]
    fn single_row_is_a_domain_error() {
        let t = table(&[Some(5.0)], &[Some(1.0)]);
        assert_eq!(
            column_zscore(&t, Column::Price, StdDevEstimator::Population),
            Err(AnalyticsError::ZeroVariance {
                column: Column::Price
            })
        );
    }

    #[test]
    fn empty_table_is_reported() {
        let t = RollingWindowTable::default();
        assert_eq!(
            column_zscore(&t, Column::Price, StdDevEstimator::Sample),
            Err(AnalyticsError::EmptyWindow)
        );
    }

    #[test]
    fn missing_values_are_reported() {
        let t = table(&[Some(1.0), None, Some(3.0)], &[Some(1.0), Some(2.0), Some(3.0)]);
        assert_eq!(
            column_zscore(&t, Column::Price, StdDevEstimator::Sample),
            Err(AnalyticsError::MissingValues {
                column: Column::Price,
                count: 1
            })
        );
    }

    proptest! {
        #[test]
        fn zscores_have_zero_mean_and_unit_spread(
            values in prop::collection::vec(-1_000.0f64..1_000.0, 2..80),
        ) {
            let first = values[0];
            prop_assume!(values.iter().any(|v| (v - first).abs() > 1e-3));

            let opts: Vec<Option<f64>> = values.iter().copied().map(Some).collect();
            let t = table(&opts, &opts);

            for estimator in [StdDevEstimator::Sample, StdDevEstimator::Population] {
                let z = column_zscore(&t, Column::Price, estimator).unwrap();
                prop_assert!(mean(&z.values).unwrap().abs() < 1e-9);
                prop_assert!((std_dev(&z.values, estimator).unwrap() - 1.0).abs() < 1e-9);
            }
        }
    }
}
