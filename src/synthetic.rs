//! Placeholder series shown while no real data is loaded. Shapes look like
//! prices but the values are random walks with no statistical meaning.

use crate::chart::{SeriesData, DOWN_COLOR, UP_COLOR};
use crate::models::{round_two, ChartType, PriceBar, ValuePoint};
use crate::timescale::TimeScale;
use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use rand::Rng;

const START_PRICE: f64 = 100.0;
const START_VALUE: f64 = 50.0;

/// `count` strictly increasing timestamps ending at (or, for month scales,
/// in the month of) `now`.
pub fn timestamps(scale: TimeScale, count: usize, now: DateTime<Utc>) -> Vec<i64> {
    let step = scale.step_seconds();
    let end = now.timestamp();
    let month_start = NaiveDate::from_ymd_opt(now.year(), now.month(), 1);

    (0..count)
        .rev()
        .map(|back| {
            let fixed = end - back as i64 * step;
            match (scale.calendar_months(), month_start) {
                (Some(months), Some(first)) => u32::try_from(back)
                    .ok()
                    .and_then(|back| back.checked_mul(months))
                    .and_then(|total| first.checked_sub_months(Months::new(total)))
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
                    .map(|dt| dt.and_utc().timestamp())
                    .unwrap_or(fixed),
                _ => fixed,
            }
        })
        .collect()
}

pub fn candlesticks<R: Rng>(
    scale: TimeScale,
    count: usize,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<PriceBar> {
    let mut price = START_PRICE;

    timestamps(scale, count, now)
        .into_iter()
        .map(|time| {
            let change = (rng.random::<f64>() - 0.5) * 10.0;
            let open = price;
            let close = open + change;
            let high = open.max(close) + rng.random::<f64>() * 5.0;
            let low = open.min(close) - rng.random::<f64>() * 5.0;
            price = close;

            PriceBar {
                time,
                open: round_two(open),
                high: round_two(high),
                low: round_two(low),
                close: round_two(close),
                volume: 0,
            }
        })
        .collect()
}

/// Bar charts draw the same OHLC shape as candlesticks.
pub fn bars<R: Rng>(
    scale: TimeScale,
    count: usize,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<PriceBar> {
    candlesticks(scale, count, now, rng)
}

pub fn values<R: Rng>(
    scale: TimeScale,
    count: usize,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<ValuePoint> {
    let mut value = START_VALUE;

    timestamps(scale, count, now)
        .into_iter()
        .map(|time| {
            let change = (rng.random::<f64>() - 0.5) * 5.0;
            value = (value + change).max(0.0);
            ValuePoint {
                time,
                value: round_two(value),
                color: None,
            }
        })
        .collect()
}

pub fn histogram<R: Rng>(
    scale: TimeScale,
    count: usize,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<ValuePoint> {
    timestamps(scale, count, now)
        .into_iter()
        .map(|time| {
            let value = (rng.random::<f64>() - 0.5) * 100.0;
            let color = if value >= 0.0 { UP_COLOR } else { DOWN_COLOR };
            ValuePoint {
                time,
                value: round_two(value.abs()),
                color: Some(color.to_string()),
            }
        })
        .collect()
}

/// Picks the placeholder shape that fits `chart_type`.
pub fn generate_for<R: Rng>(
    chart_type: ChartType,
    scale: TimeScale,
    count: usize,
    now: DateTime<Utc>,
    rng: &mut R,
) -> SeriesData {
    match chart_type {
        ChartType::Candlestick => SeriesData::Ohlc(candlesticks(scale, count, now, rng)),
        ChartType::Bar => SeriesData::Ohlc(bars(scale, count, now, rng)),
        ChartType::Area | ChartType::Baseline | ChartType::Line => {
            SeriesData::Values(values(scale, count, now, rng))
        }
        ChartType::Histogram => SeriesData::Values(histogram(scale, count, now, rng)),
    }
}
