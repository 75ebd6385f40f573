use crate::error::ChartServiceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rendering style of the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Candlestick,
    Area,
    Bar,
    Baseline,
    Histogram,
    Line,
}

impl ChartType {
    pub const ALL: [ChartType; 6] = [
        ChartType::Candlestick,
        ChartType::Area,
        ChartType::Bar,
        ChartType::Baseline,
        ChartType::Histogram,
        ChartType::Line,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Candlestick => "candlestick",
            ChartType::Area => "area",
            ChartType::Bar => "bar",
            ChartType::Baseline => "baseline",
            ChartType::Histogram => "histogram",
            ChartType::Line => "line",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChartType::Candlestick => "Candlestick",
            ChartType::Area => "Area",
            ChartType::Bar => "Bar",
            ChartType::Baseline => "Baseline",
            ChartType::Histogram => "Histogram",
            ChartType::Line => "Line",
        }
    }

    /// Whether the series is drawn from full OHLC bars rather than scalars.
    pub fn is_ohlc(&self) -> bool {
        matches!(self, ChartType::Candlestick | ChartType::Bar)
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartType {
    type Err = ChartServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChartType::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ChartServiceError::Validation("Invalid chart type".to_string()))
    }
}

/// One historical OHLC bar. `time` is Unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: u64,
}

/// A scalar point for line-like and histogram series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuePoint {
    pub time: i64,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// A bar as the provider hands it over; any field may be missing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawBar {
    pub time: i64,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolMeta {
    pub symbol: String,
    pub shortname: String,
    pub longname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoricalResponse {
    pub data: Vec<PriceBar>,
    pub symbol: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SymbolMeta>,
}

pub fn round_two(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_type_round_trips_through_its_name() {
        for kind in ChartType::ALL {
            assert_eq!(kind.as_str().parse::<ChartType>().unwrap(), kind);
        }
        assert!("Candlestick".parse::<ChartType>().is_err());
        assert_eq!(ChartType::default(), ChartType::Candlestick);
        assert!(ChartType::Bar.is_ohlc());
        assert!(!ChartType::Baseline.is_ohlc());
    }

    #[test]
    fn symbol_meta_uses_camel_case_quote_type() {
        let meta = SymbolMeta {
            symbol: "AAPL".into(),
            shortname: "Apple Inc.".into(),
            longname: "Apple Inc.".into(),
            exchange: Some("NMS".into()),
            quote_type: Some("EQUITY".into()),
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["quoteType"], "EQUITY");
        assert_eq!(json["exchange"], "NMS");
    }

    #[test]
    fn value_point_omits_missing_color() {
        let point = ValuePoint { time: 1, value: 2.5, color: None };
        let json = serde_json::to_string(&point).unwrap();
        assert_eq!(json, r#"{"time":1,"value":2.5}"#);
    }

    #[test]
    fn rounds_to_cents() {
        assert_eq!(round_two(187.456), 187.46);
        assert_eq!(round_two(187.454), 187.45);
        assert_eq!(round_two(-3.333), -3.33);
    }
}
