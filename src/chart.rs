use crate::models::{ChartType, PriceBar, ValuePoint};
use crate::synthetic;
use crate::timescale::{AxisOptions, TimeScale};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use serde_json::{json, Value};

pub const UP_COLOR: &str = "#10B981";
pub const DOWN_COLOR: &str = "#EF4444";
pub const LINE_COLOR: &str = "#10B981";

/// Baseline reference price used when there is no real close to anchor on.
const PLACEHOLDER_BASE_VALUE: f64 = 50.0;

/// Points fed to one widget series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SeriesData {
    Ohlc(Vec<PriceBar>),
    Values(Vec<ValuePoint>),
}

impl SeriesData {
    pub fn len(&self) -> usize {
        match self {
            SeriesData::Ohlc(bars) => bars.len(),
            SeriesData::Values(points) => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    pub(crate) fn times(&self) -> Vec<i64> {
        match self {
            SeriesData::Ohlc(bars) => bars.iter().map(|b| b.time).collect(),
            SeriesData::Values(points) => points.iter().map(|p| p.time).collect(),
        }
    }
}

/// Everything the page needs to (re)build the single active series.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesSpec {
    pub kind: ChartType,
    pub options: Value,
    pub axis: AxisOptions,
    pub data: SeriesData,
    pub has_real_data: bool,
}

impl SeriesSpec {
    /// Series built from fetched bars. Scalar kinds are derived from closes.
    pub fn from_bars(kind: ChartType, scale: TimeScale, bars: &[PriceBar]) -> Self {
        let data = match kind {
            ChartType::Candlestick | ChartType::Bar => SeriesData::Ohlc(bars.to_vec()),
            ChartType::Area | ChartType::Baseline | ChartType::Line => {
                SeriesData::Values(closes(bars))
            }
            ChartType::Histogram => SeriesData::Values(close_changes(bars)),
        };
        let base_value = bars.first().map(|b| b.close).unwrap_or(PLACEHOLDER_BASE_VALUE);

        Self {
            kind,
            options: series_options(kind, base_value),
            axis: scale.axis(),
            data,
            has_real_data: !bars.is_empty(),
        }
    }

    /// Randomized stand-in shown before real data arrives.
    pub fn placeholder<R: Rng>(
        kind: ChartType,
        scale: TimeScale,
        count: usize,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Self {
        Self {
            kind,
            options: series_options(kind, PLACEHOLDER_BASE_VALUE),
            axis: scale.axis(),
            data: synthetic::generate_for(kind, scale, count, now, rng),
            has_real_data: false,
        }
    }

    /// Cleared chart: the series exists but holds no points.
    pub fn empty(kind: ChartType, scale: TimeScale) -> Self {
        Self::from_bars(kind, scale, &[])
    }
}

/// Close price per bar, for line-like series.
pub fn closes(bars: &[PriceBar]) -> Vec<ValuePoint> {
    bars.iter()
        .map(|b| ValuePoint {
            time: b.time,
            value: b.close,
            color: None,
        })
        .collect()
}

/// Magnitude of the close-to-close move, colored by direction. The first bar
/// has nothing to compare with and is drawn flat.
pub fn close_changes(bars: &[PriceBar]) -> Vec<ValuePoint> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            if i == 0 {
                return ValuePoint {
                    time: bar.time,
                    value: 0.0,
                    color: Some(LINE_COLOR.to_string()),
                };
            }
            let change = bar.close - bars[i - 1].close;
            let color = if change >= 0.0 { UP_COLOR } else { DOWN_COLOR };
            ValuePoint {
                time: bar.time,
                value: crate::models::round_two(change.abs()),
                color: Some(color.to_string()),
            }
        })
        .collect()
}

pub fn series_options(kind: ChartType, base_value: f64) -> Value {
    match kind {
        ChartType::Area => json!({
            "lineColor": LINE_COLOR,
            "topColor": LINE_COLOR,
            "bottomColor": "rgba(16, 185, 129, 0.1)",
            "lineWidth": 2,
        }),
        ChartType::Bar => json!({
            "upColor": UP_COLOR,
            "downColor": DOWN_COLOR,
            "thinBars": false,
        }),
        ChartType::Baseline => json!({
            "baseValue": { "type": "price", "price": base_value },
            "topLineColor": UP_COLOR,
            "topFillColor1": "rgba(16, 185, 129, 0.2)",
            "topFillColor2": "rgba(16, 185, 129, 0.05)",
            "bottomLineColor": DOWN_COLOR,
            "bottomFillColor1": "rgba(239, 68, 68, 0.05)",
            "bottomFillColor2": "rgba(239, 68, 68, 0.2)",
            "lineWidth": 2,
        }),
        ChartType::Candlestick => json!({
            "upColor": UP_COLOR,
            "downColor": DOWN_COLOR,
            "borderVisible": false,
            "wickUpColor": UP_COLOR,
            "wickDownColor": DOWN_COLOR,
        }),
        ChartType::Histogram => json!({
            "color": LINE_COLOR,
            "base": 0,
        }),
        ChartType::Line => json!({
            "color": LINE_COLOR,
            "lineWidth": 2,
            "priceLineVisible": false,
            "lastValueVisible": true,
        }),
    }
}

/// Dark theme for the chart widget.
pub fn theme() -> Value {
    json!({
        "layout": {
            "textColor": "#9CA3AF",
            "background": { "color": "#000000" },
            "fontSize": 12,
            "fontFamily": "-apple-system, BlinkMacSystemFont, \"Segoe UI\", Roboto, sans-serif",
        },
        "grid": {
            "vertLines": { "color": "#1A1A1A", "style": 1, "visible": true },
            "horzLines": { "color": "#1A1A1A", "style": 1, "visible": true },
        },
        "crosshair": {
            "mode": 0,
            "vertLine": { "color": "#4B5563", "width": 1, "style": 3, "labelBackgroundColor": "#1F1F1F" },
            "horzLine": { "color": "#4B5563", "width": 1, "style": 3, "labelBackgroundColor": "#1F1F1F" },
        },
        "rightPriceScale": {
            "borderColor": "#1A1A1A",
            "textColor": "#6B7280",
        },
        "timeScale": {
            "borderColor": "#1A1A1A",
            "timeVisible": true,
            "secondsVisible": false,
            "rightOffset": 10,
            "barSpacing": 6,
            "fixLeftEdge": false,
            "fixRightEdge": false,
            "lockVisibleTimeRangeOnResize": false,
            "rightBarStaysOnScroll": true,
            "allowBoldLabels": false,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn bar(time: i64, close: f64) -> PriceBar {
        PriceBar {
            time,
            open: close - 1.0,
            high: close + 1.0,
            low: close - 2.0,
            close,
            volume: 10,
        }
    }

    fn sample() -> Vec<PriceBar> {
        vec![bar(100, 10.0), bar(200, 12.5), bar(300, 11.0)]
    }

    #[test]
    fn ohlc_kinds_keep_bars() {
        for kind in [ChartType::Candlestick, ChartType::Bar] {
            let spec = SeriesSpec::from_bars(kind, TimeScale::OneDay, &sample());
            assert_eq!(spec.data, SeriesData::Ohlc(sample()));
            assert!(spec.has_real_data);
        }
    }

    #[test]
    fn line_like_kinds_use_closes() {
        for kind in [ChartType::Area, ChartType::Line, ChartType::Baseline] {
            let spec = SeriesSpec::from_bars(kind, TimeScale::OneDay, &sample());
            match &spec.data {
                SeriesData::Values(points) => {
                    let values: Vec<f64> = points.iter().map(|p| p.value).collect();
                    assert_eq!(values, vec![10.0, 12.5, 11.0]);
                }
                other => panic!("{kind}: unexpected data {other:?}"),
            }
        }
    }

    #[test]
    fn histogram_uses_close_change_magnitude() {
        let points = close_changes(&sample());
        assert_eq!(points[0].value, 0.0);
        assert_eq!(points[0].color.as_deref(), Some(LINE_COLOR));
        assert_eq!(points[1].value, 2.5);
        assert_eq!(points[1].color.as_deref(), Some(UP_COLOR));
        assert_eq!(points[2].value, 1.5);
        assert_eq!(points[2].color.as_deref(), Some(DOWN_COLOR));
    }

    #[test]
    fn baseline_anchors_on_first_close() {
        let spec = SeriesSpec::from_bars(ChartType::Baseline, TimeScale::OneDay, &sample());
        assert_eq!(spec.options["baseValue"]["price"], 10.0);

        let empty = SeriesSpec::empty(ChartType::Baseline, TimeScale::OneDay);
        assert_eq!(empty.options["baseValue"]["price"], 50.0);
        assert!(empty.data.is_empty());
        assert!(!empty.has_real_data);
    }

    #[test]
    fn placeholder_is_marked_synthetic() {
        let now = Utc.with_ymd_and_hms(2024, 6, 14, 0, 0, 0).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let spec = SeriesSpec::placeholder(ChartType::Line, TimeScale::FifteenMinutes, 100, now, &mut rng);
        assert_eq!(spec.data.len(), 100);
        assert!(!spec.has_real_data);
        assert_eq!(spec.axis, TimeScale::FifteenMinutes.axis());
    }

    #[test]
    fn spec_serializes_for_the_widget() {
        let spec = SeriesSpec::from_bars(ChartType::Line, TimeScale::OneMinute, &sample());
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["kind"], "line");
        assert_eq!(json["hasRealData"], true);
        assert_eq!(json["axis"]["secondsVisible"], true);
        assert_eq!(json["data"][1], serde_json::json!({"time": 200, "value": 12.5}));
        assert_eq!(json["options"]["color"], LINE_COLOR);
    }

    #[test]
    fn every_kind_has_options() {
        for kind in ChartType::ALL {
            assert!(series_options(kind, 1.0).as_object().is_some_and(|o| !o.is_empty()));
        }
        assert_eq!(theme()["layout"]["background"]["color"], "#000000");
    }
}
