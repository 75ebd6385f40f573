use crate::api::MarketDataProvider;
use crate::error::{ChartServiceError, Result};
use crate::models::{round_two, PriceBar, RawBar, SymbolMeta};
use crate::timescale::{QueryWindow, TimeScale};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

pub const HISTORICAL_FAILED: &str = "Failed to fetch historical data";
pub const SEARCH_FAILED: &str = "Failed to search symbols";
pub const NO_DATA: &str = "No data found for symbol";

/// Proxy between the HTTP layer and the market-data provider: validates
/// requests and reshapes what comes back.
#[derive(Clone)]
pub struct MarketService {
    provider: Arc<dyn MarketDataProvider>,
    quotes_count: u32,
}

impl MarketService {
    pub fn new(provider: Arc<dyn MarketDataProvider>, quotes_count: u32) -> Self {
        Self {
            provider,
            quotes_count,
        }
    }

    pub async fn historical(
        &self,
        symbol: &str,
        scale: TimeScale,
        now: DateTime<Utc>,
    ) -> Result<Vec<PriceBar>> {
        let window = QueryWindow::ending_at(scale, now);

        let raw = self
            .provider
            .chart(symbol, &window)
            .await
            .map_err(|e| {
                warn!("Historical fetch for {} ({}) failed: {}", symbol, scale, e);
                ChartServiceError::upstream(HISTORICAL_FAILED, e)
            })?;

        let raw_len = raw.len();
        let bars = clean_bars(raw);
        if bars.is_empty() {
            return Err(ChartServiceError::NotFound(NO_DATA.to_string()));
        }

        info!(
            "Loaded {} bars for {} ({}), dropped {} incomplete",
            bars.len(),
            symbol,
            scale,
            raw_len - bars.len()
        );
        Ok(bars)
    }

    /// Blank queries short-circuit to no results without touching the provider.
    pub async fn search(&self, query: &str) -> Result<Vec<SymbolMeta>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        self.provider
            .search(query, self.quotes_count)
            .await
            .map_err(|e| {
                warn!("Symbol search for {:?} failed: {}", query, e);
                ChartServiceError::upstream(SEARCH_FAILED, e)
            })
    }
}

/// Checks the historical query parameters, symbol first.
pub fn validate_historical(
    symbol: Option<&str>,
    time_scale: Option<&str>,
) -> Result<(String, TimeScale)> {
    let symbol = symbol
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ChartServiceError::Validation("Symbol is required".to_string()))?;

    let scale = time_scale
        .ok_or_else(|| ChartServiceError::Validation("Invalid time scale".to_string()))?
        .parse::<TimeScale>()?;

    Ok((symbol.to_string(), scale))
}

/// Drops incomplete bars, rounds prices to cents and orders by time.
pub fn clean_bars(raw: Vec<RawBar>) -> Vec<PriceBar> {
    let mut bars: Vec<PriceBar> = raw
        .into_iter()
        .filter_map(|bar| {
            let (Some(open), Some(high), Some(low), Some(close)) =
                (bar.open, bar.high, bar.low, bar.close)
            else {
                return None;
            };
            Some(PriceBar {
                time: bar.time,
                open: round_two(open),
                high: round_two(high),
                low: round_two(low),
                close: round_two(close),
                volume: bar.volume.unwrap_or(0),
            })
        })
        .collect();

    bars.sort_by_key(|b| b.time);
    bars
}
