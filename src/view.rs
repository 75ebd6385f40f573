use crate::chart::{self, SeriesSpec};
use crate::config::Config;
use crate::error::Result;
use crate::market::MarketService;
use crate::models::ChartType;
use crate::timescale::TimeScale;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

pub const DEFAULT_TIME_SCALE: TimeScale = TimeScale::FiveMinutes;

/// What the user has picked: an optional symbol, a chart type and a time scale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub symbol: Option<String>,
    pub chart_type: ChartType,
    pub time_scale: TimeScale,
}

impl Selection {
    /// Missing chart type and time scale fall back to the page defaults; values
    /// that are present must be valid.
    pub fn parse(
        symbol: Option<&str>,
        time_scale: Option<&str>,
        chart_type: Option<&str>,
    ) -> Result<Self> {
        let time_scale = match time_scale {
            Some(raw) => raw.parse()?,
            None => DEFAULT_TIME_SCALE,
        };
        let chart_type = match chart_type {
            Some(raw) => raw.parse()?,
            None => ChartType::default(),
        };
        let symbol = symbol
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(Self {
            symbol,
            chart_type,
            time_scale,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPayload {
    pub symbol: Option<String>,
    pub chart_type: ChartType,
    pub time_scale: TimeScale,
    pub series: SeriesSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Resolves a selection into the series the page should draw. Never fails:
/// no symbol clears the chart, and a failed fetch degrades to placeholder data
/// with the error attached.
pub async fn compose(
    market: &MarketService,
    selection: Selection,
    placeholder_points: usize,
    now: DateTime<Utc>,
) -> ChartPayload {
    let Selection {
        symbol,
        chart_type,
        time_scale,
    } = selection;

    let Some(ticker) = symbol.as_deref() else {
        debug!("No symbol selected, clearing {} chart", chart_type);
        return ChartPayload {
            symbol: None,
            chart_type,
            time_scale,
            series: SeriesSpec::empty(chart_type, time_scale),
            error: None,
        };
    };

    let (series, error) = match market.historical(ticker, time_scale, now).await {
        Ok(bars) => (SeriesSpec::from_bars(chart_type, time_scale, &bars), None),
        Err(e) => {
            warn!("Falling back to placeholder data for {}: {}", ticker, e);
            let mut rng = rand::rng();
            let series =
                SeriesSpec::placeholder(chart_type, time_scale, placeholder_points, now, &mut rng);
            (series, Some(e.user_message()))
        }
    };

    ChartPayload {
        symbol,
        chart_type,
        time_scale,
        series,
        error,
    }
}

/// Settings the page boots with.
pub fn page_config(config: &Config) -> Value {
    let chart_types: Vec<Value> = ChartType::ALL
        .iter()
        .map(|kind| json!({ "value": kind.as_str(), "label": kind.label() }))
        .collect();
    let time_scales: Vec<&str> = TimeScale::SELECTABLE.iter().map(|s| s.as_str()).collect();

    json!({
        "defaultSymbol": config.default_symbol,
        "defaultChartType": ChartType::default(),
        "defaultTimeScale": DEFAULT_TIME_SCALE,
        "debounceMs": config.search_debounce_ms,
        "chartTypes": chart_types,
        "timeScales": time_scales,
        "theme": chart::theme(),
    })
}
