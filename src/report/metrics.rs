// src/report/metrics.rs

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::IndicatorRecord;

/// Number of year-over-year differences averaged to call a trend.
const TREND_WINDOW: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Rising,
    Falling,
}

/// Headline numbers for one series, computed over a year-sorted slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyMetrics {
    pub latest: Option<IndicatorRecord>,
    /// Latest value minus the one before it.
    pub change: Option<f64>,
    /// Mean of the last `recent_window` observations.
    pub recent_mean: Option<f64>,
    pub recent_window: usize,
    pub overall_mean: Option<f64>,
    pub peak: Option<IndicatorRecord>,
    pub trend: Option<Trend>,
}

pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Last `n` observations (all of them if there are fewer).
pub fn tail(series: &[IndicatorRecord], n: usize) -> &[IndicatorRecord] {
    &series[series.len().saturating_sub(n)..]
}

/// Sign of the mean of the last few year-over-year differences.
pub fn trend(series: &[IndicatorRecord]) -> Option<Trend> {
    let diffs: Vec<f64> = series.windows(2).map(|w| w[1].value - w[0].value).collect();
    let m = mean(diffs[diffs.len().saturating_sub(TREND_WINDOW)..].iter().copied())?;
    Some(if m > 0.0 { Trend::Rising } else { Trend::Falling })
}

pub fn key_metrics(series: &[IndicatorRecord], recent_window: usize) -> KeyMetrics {
    let latest = series.last().copied();
    let change = match series {
        [.., prev, last] => Some(last.value - prev.value),
        _ => None,
    };
    let peak = series
        .iter()
        .copied()
        .reduce(|best, r| if r.value > best.value { r } else { best });

    KeyMetrics {
        latest,
        change,
        recent_mean: mean(tail(series, recent_window).iter().map(|r| r.value)),
        recent_window,
        overall_mean: mean(series.iter().map(|r| r.value)),
        peak,
        trend: trend(series),
    }
}

/// Inner join of two series on year: `(year, left, right)`, ascending.
pub fn join_on_year(left: &[IndicatorRecord], right: &[IndicatorRecord]) -> Vec<(i32, f64, f64)> {
    let right: BTreeMap<i32, f64> = right.iter().map(|r| (r.year, r.value)).collect();
    let mut joined: Vec<(i32, f64, f64)> = left
        .iter()
        .filter_map(|l| right.get(&l.year).map(|&r| (l.year, l.value, r)))
        .collect();
    joined.sort_by_key(|&(y, _, _)| y);
    joined
}
