//! Column helpers over `Series` (one optional value per candle).
//!
//! Windowed helpers only produce a value once the whole window is defined.

use super::Series;

/// Statistic applied over a rolling window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollingStat {
    Mean,
    /// Sample standard deviation (n - 1).
    Std,
}

impl RollingStat {
    pub fn label(&self) -> &'static str {
        match self {
            RollingStat::Mean => "mean",
            RollingStat::Std => "std",
        }
    }

    pub fn apply(&self, series: &Series, window: usize) -> Series {
        match self {
            RollingStat::Mean => rolling_mean(series, window),
            RollingStat::Std => rolling_std(series, window),
        }
    }
}

/// Wrap raw values as a fully defined series.
pub fn defined(values: impl IntoIterator<Item = f64>) -> Series {
    values.into_iter().map(Some).collect()
}

/// Apply `f` to every full window ending at each row.
pub fn rolling<F>(series: &Series, window: usize, f: F) -> Series
where
    F: Fn(&[f64]) -> f64,
{
    let mut out = vec![None; series.len()];
    if window == 0 || series.len() < window {
        return out;
    }

    let mut buf = Vec::with_capacity(window);
    for end in (window - 1)..series.len() {
        buf.clear();
        buf.extend(series[end + 1 - window..=end].iter().map_while(|v| *v));
        if buf.len() == window {
            out[end] = Some(f(&buf));
        }
    }
    out
}

pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation; undefined (NaN) for fewer than two values.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

/// Population standard deviation.
pub fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    (values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64).sqrt()
}

pub fn rolling_mean(series: &Series, window: usize) -> Series {
    rolling(series, window, mean)
}

pub fn rolling_std(series: &Series, window: usize) -> Series {
    let out = rolling(series, window, sample_std);
    out.into_iter().map(|v| v.filter(|x| !x.is_nan())).collect()
}

/// Recursive EMA seeded with the first defined value:
/// `y[t] = (1 - a) * y[t-1] + a * x[t]`, `a = 2 / (span + 1)`.
pub fn ewm(series: &Series, span: usize) -> Series {
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut state: Option<f64> = None;
    series
        .iter()
        .map(|value| {
            if let Some(x) = value {
                state = Some(match state {
                    Some(prev) => (1.0 - alpha) * prev + alpha * x,
                    None => *x,
                });
                state
            } else {
                None
            }
        })
        .collect()
}

/// Period-over-period fractional change; the first row is undefined.
pub fn pct_change(series: &Series) -> Series {
    let mut out = vec![None; series.len()];
    for i in 1..series.len() {
        if let (Some(prev), Some(cur)) = (series[i - 1], series[i]) {
            out[i] = Some(cur / prev - 1.0);
        }
    }
    out
}

/// Shift values forward by `n` rows, leaving the first `n` undefined.
pub fn shift(series: &Series, n: usize) -> Series {
    let mut out = vec![None; series.len()];
    for i in n..series.len() {
        out[i] = series[i - n];
    }
    out
}

/// Element-wise combination of two aligned series.
pub fn zip_with<F>(a: &Series, b: &Series, f: F) -> Series
where
    F: Fn(f64, f64) -> f64,
{
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => Some(f(*x, *y)),
            _ => None,
        })
        .collect()
}

pub fn divide(a: &Series, b: &Series) -> Series {
    zip_with(a, b, |x, y| x / y)
}
