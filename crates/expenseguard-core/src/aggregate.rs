//! Daily aggregation of transaction amounts
//!
//! `Time` is seconds since the Unix epoch. Each row is truncated to its UTC
//! calendar day and amounts are summed per day. Only days that occur in the
//! input are emitted; gaps are not filled with zero.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{DailyPoint, TimedAmount};
use crate::schema::TIME;

/// UTC calendar day containing an epoch-seconds timestamp
///
/// Fractional seconds are floored, so -0.5 falls on 1969-12-31.
pub fn epoch_day(seconds: f64, row: usize) -> Result<NaiveDate> {
    let invalid = |reason: String| Error::InvalidValue {
        row,
        column: TIME.to_string(),
        reason,
    };

    if !seconds.is_finite() {
        return Err(invalid(format!("{} is not a finite timestamp", seconds)));
    }
    let floored = seconds.floor();
    if floored < i64::MIN as f64 || floored > i64::MAX as f64 {
        return Err(invalid(format!("{} is out of range", seconds)));
    }

    DateTime::from_timestamp(floored as i64, 0)
        .map(|dt| dt.date_naive())
        .ok_or_else(|| invalid(format!("{} is out of range", seconds)))
}

/// Sum amounts per calendar day, in chronological order
pub fn aggregate_daily(rows: &[TimedAmount]) -> Result<Vec<DailyPoint>> {
    let mut days: BTreeMap<NaiveDate, f64> = BTreeMap::new();

    for (row, tx) in rows.iter().enumerate() {
        let day = epoch_day(tx.time, row)?;
        *days.entry(day).or_insert(0.0) += tx.amount;
    }

    let points: Vec<DailyPoint> = days
        .into_iter()
        .map(|(day, amount)| DailyPoint { day, amount })
        .collect();

    debug!(rows = rows.len(), days = points.len(), "Aggregated daily totals");
    Ok(points)
}

/// Require a minimum number of distinct days before forecasting
pub fn ensure_history(points: &[DailyPoint], min_days: usize) -> Result<()> {
    if points.len() < min_days {
        return Err(Error::InsufficientHistory {
            days: points.len(),
            required: min_days,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: f64 = 86_400.0;

    fn tx(time: f64, amount: f64) -> TimedAmount {
        TimedAmount { time, amount }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_epoch_day_truncation() {
        assert_eq!(epoch_day(0.0, 0).unwrap(), date(1970, 1, 1));
        assert_eq!(epoch_day(DAY - 1.0, 0).unwrap(), date(1970, 1, 1));
        assert_eq!(epoch_day(DAY, 0).unwrap(), date(1970, 1, 2));
        assert_eq!(epoch_day(172_792.5, 0).unwrap(), date(1970, 1, 2));
        assert_eq!(epoch_day(-0.5, 0).unwrap(), date(1969, 12, 31));
        assert_eq!(epoch_day(1_700_000_000.0, 0).unwrap(), date(2023, 11, 14));
    }

    #[test]
    fn test_epoch_day_rejects_out_of_range() {
        assert!(matches!(
            epoch_day(f64::NAN, 3),
            Err(Error::InvalidValue { row: 3, .. })
        ));
        assert!(epoch_day(1e300, 0).is_err());
    }

    #[test]
    fn test_groups_and_sums_per_day() {
        let rows = vec![
            tx(10.0, 5.0),
            tx(DAY + 10.0, 1.0),
            tx(20.0, 2.5),
            tx(DAY * 5.0, 4.0),
        ];

        let points = aggregate_daily(&rows).unwrap();
        assert_eq!(
            points,
            vec![
                DailyPoint { day: date(1970, 1, 1), amount: 7.5 },
                DailyPoint { day: date(1970, 1, 2), amount: 1.0 },
                DailyPoint { day: date(1970, 1, 6), amount: 4.0 },
            ]
        );
    }

    #[test]
    fn test_order_independent() {
        let rows: Vec<TimedAmount> = (0..40)
            .map(|i| tx((i % 13) as f64 * DAY + i as f64, i as f64 * 1.25))
            .collect();
        let mut reversed = rows.clone();
        reversed.reverse();
        let mut interleaved: Vec<TimedAmount> = rows.iter().step_by(2).copied().collect();
        interleaved.extend(rows.iter().skip(1).step_by(2).copied());

        let expected = aggregate_daily(&rows).unwrap();
        assert_eq!(aggregate_daily(&reversed).unwrap(), expected);
        assert_eq!(aggregate_daily(&interleaved).unwrap(), expected);
    }

    #[test]
    fn test_sum_preserved() {
        let rows: Vec<TimedAmount> = (0..25)
            .map(|i| tx(i as f64 * 3_600.0 * 7.0, 0.5 * i as f64))
            .collect();

        let total_in: f64 = rows.iter().map(|r| r.amount).sum();
        let total_out: f64 = aggregate_daily(&rows).unwrap().iter().map(|p| p.amount).sum();
        assert_eq!(total_in, total_out);
    }

    #[test]
    fn test_no_gap_filling() {
        let points = aggregate_daily(&[tx(0.0, 1.0), tx(DAY * 9.0, 1.0)]).unwrap();
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn test_ensure_history() {
        let points: Vec<DailyPoint> = aggregate_daily(
            &(0..9).map(|i| tx(i as f64 * DAY, 1.0)).collect::<Vec<_>>(),
        )
        .unwrap();

        match ensure_history(&points, 10) {
            Err(Error::InsufficientHistory { days, required }) => {
                assert_eq!(days, 9);
                assert_eq!(required, 10);
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(ensure_history(&points, 9).is_ok());
    }
}
