//! Linear trend + weekly seasonality forecaster
//!
//! Fits `y = a + b·t` by least squares over the day offset `t` from the first
//! observed day, then adds the mean residual of each weekday. The interval is
//! `yhat ± z·σ` where σ is the standard deviation of what remains and `z` the
//! normal quantile for the configured interval width.

use chrono::{Datelike, NaiveDate};

use crate::error::{Error, Result};
use crate::models::{DailyPoint, ForecastRow};

use super::{future_days, Forecaster};

#[derive(Debug, Clone, Copy)]
pub struct TrendForecaster {
    interval_width: f64,
}

/// Fitted parameters
#[derive(Debug, Clone, Copy)]
struct Fit {
    origin: NaiveDate,
    intercept: f64,
    slope: f64,
    weekday: [f64; 7],
    half_width: f64,
}

impl Fit {
    fn predict(&self, day: NaiveDate) -> ForecastRow {
        let t = (day - self.origin).num_days() as f64;
        let seasonal = self.weekday[day.weekday().num_days_from_monday() as usize];
        let predicted = self.intercept + self.slope * t + seasonal;
        ForecastRow {
            day,
            predicted,
            lower: predicted - self.half_width,
            upper: predicted + self.half_width,
        }
    }
}

impl TrendForecaster {
    pub fn new(interval_width: f64) -> Self {
        Self { interval_width }
    }

    fn fit(&self, history: &[DailyPoint]) -> Result<Fit> {
        let first = history
            .first()
            .ok_or_else(|| Error::Forecast("Cannot forecast from an empty history".into()))?;
        let origin = first.day;

        let n = history.len() as f64;
        let ts: Vec<f64> = history
            .iter()
            .map(|p| (p.day - origin).num_days() as f64)
            .collect();
        let mean_t = ts.iter().sum::<f64>() / n;
        let mean_y = history.iter().map(|p| p.amount).sum::<f64>() / n;

        let (cov, var) = ts
            .iter()
            .zip(history)
            .fold((0.0, 0.0), |(cov, var), (t, p)| {
                (
                    cov + (t - mean_t) * (p.amount - mean_y),
                    var + (t - mean_t).powi(2),
                )
            });
        let slope = if var > 0.0 { cov / var } else { 0.0 };
        let intercept = mean_y - slope * mean_t;

        let residuals: Vec<f64> = ts
            .iter()
            .zip(history)
            .map(|(t, p)| p.amount - (intercept + slope * t))
            .collect();

        let mut sums = [0.0; 7];
        let mut counts = [0usize; 7];
        for (p, r) in history.iter().zip(&residuals) {
            let wd = p.day.weekday().num_days_from_monday() as usize;
            sums[wd] += r;
            counts[wd] += 1;
        }
        let weekday: [f64; 7] = std::array::from_fn(|wd| {
            if counts[wd] > 0 {
                sums[wd] / counts[wd] as f64
            } else {
                0.0
            }
        });

        let remaining: f64 = history
            .iter()
            .zip(&residuals)
            .map(|(p, r)| (r - weekday[p.day.weekday().num_days_from_monday() as usize]).powi(2))
            .sum();
        let dof = if history.len() > 1 { n - 1.0 } else { 1.0 };
        let sigma = (remaining / dof).sqrt();

        let z = normal_quantile(0.5 + self.interval_width / 2.0);

        Ok(Fit {
            origin,
            intercept,
            slope,
            weekday,
            half_width: z * sigma,
        })
    }
}

impl Default for TrendForecaster {
    fn default() -> Self {
        Self::new(0.80)
    }
}

impl Forecaster for TrendForecaster {
    fn forecast(&self, history: &[DailyPoint], horizon_days: u32) -> Result<Vec<ForecastRow>> {
        let fit = self.fit(history)?;
        let last = history
            .last()
            .map(|p| p.day)
            .ok_or_else(|| Error::Forecast("Cannot forecast from an empty history".into()))?;

        let future = future_days(last, horizon_days)?;

        Ok(history
            .iter()
            .map(|p| p.day)
            .chain(future)
            .map(|day| fit.predict(day))
            .collect())
    }
}

/// Inverse of the standard normal CDF (Acklam's rational approximation)
fn normal_quantile(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969683028665376e1,
        2.209460984245205e2,
        -2.759285104469687e2,
        1.383577518672690e2,
        -3.066479806614716e1,
        2.506628277459239,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e1,
        1.615858368580409e2,
        -1.556989798598866e2,
        6.680131188771972e1,
        -1.328068155288572e1,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-3,
        -3.223964580411365e-1,
        -2.400758277161838,
        -2.549732539343734,
        4.374664141464968,
        2.938163982698783,
    ];
    const D: [f64; 4] = [
        7.784695709041462e-3,
        3.224671290700398e-1,
        2.445134137142996,
        3.754408661907416,
    ];
    const P_LOW: f64 = 0.02425;

    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }

    if p < P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    }
}
