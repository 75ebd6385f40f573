use crate::api::MarketDataProvider;
use crate::config::Config;
use crate::error::{ChartServiceError, Result};
use crate::models::{RawBar, SymbolMeta};
use crate::timescale::QueryWindow;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Option<ChartBody>,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Option<Vec<Quote>>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<f64>>>,
}

impl Quote {
    fn value_at(series: &Option<Vec<Option<f64>>>, idx: usize) -> Option<f64> {
        series.as_ref().and_then(|v| v.get(idx)).and_then(|v| *v)
    }

    fn bar_at(&self, idx: usize, time: i64) -> RawBar {
        RawBar {
            time,
            open: Self::value_at(&self.open, idx),
            high: Self::value_at(&self.high, idx),
            low: Self::value_at(&self.low, idx),
            close: Self::value_at(&self.close, idx),
            volume: Self::value_at(&self.volume, idx).map(|v| v.max(0.0).round() as u64),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    quotes: Option<Vec<SearchQuote>>,
}

#[derive(Debug, Deserialize)]
struct SearchQuote {
    symbol: Option<String>,
    shortname: Option<String>,
    longname: Option<String>,
    exchange: Option<String>,
    #[serde(rename = "quoteType")]
    quote_type: Option<String>,
}

/// Client for the public Yahoo Finance chart and search endpoints.
#[derive(Clone)]
pub struct YahooClient {
    client: Client,
    chart_url: String,
    search_url: String,
}

impl YahooClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            chart_url: config.yahoo_chart_url.trim_end_matches('/').to_string(),
            search_url: config.yahoo_search_url.clone(),
        })
    }

    fn chart_request_url(&self, symbol: &str, window: &QueryWindow) -> String {
        format!(
            "{}/{}?period1={}&period2={}&interval={}",
            self.chart_url,
            urlencoding::encode(symbol),
            window.start.timestamp(),
            window.end.timestamp(),
            window.interval
        )
    }

    fn search_request_url(&self, query: &str, limit: u32) -> String {
        format!(
            "{}?q={}&quotesCount={}&newsCount=0",
            self.search_url,
            urlencoding::encode(query),
            limit
        )
    }
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    async fn chart(&self, symbol: &str, window: &QueryWindow) -> Result<Vec<RawBar>> {
        let url = self.chart_request_url(symbol, window);
        debug!("Fetching chart from Yahoo: {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = chart_error_message(&text)
                .unwrap_or_else(|| format!("Yahoo chart API returned status: {}", status));
            error!("[YAHOO] chart {} failed: {}", symbol, message);
            return Err(ChartServiceError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let bars = parse_chart(&text)?;
        info!("[YAHOO] {} {}: {} raw bars", symbol, window.interval, bars.len());
        Ok(bars)
    }

    async fn search(&self, query: &str, limit: u32) -> Result<Vec<SymbolMeta>> {
        let url = self.search_request_url(query, limit);
        debug!("Searching symbols on Yahoo: {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ChartServiceError::Provider {
                status: response.status().as_u16(),
                message: format!("Yahoo search API returned status: {}", response.status()),
            });
        }

        let text = response.text().await?;
        let results = parse_search(&text)?;
        info!("[YAHOO] search {:?}: {} results", query, results.len());
        Ok(results)
    }
}

/// Flattens a chart payload into one `RawBar` per timestamp.
fn parse_chart(text: &str) -> Result<Vec<RawBar>> {
    let envelope: ChartEnvelope = serde_json::from_str(text)?;

    let Some(result) = envelope
        .chart
        .and_then(|c| c.result)
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
    else {
        return Ok(Vec::new());
    };

    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result
        .indicators
        .and_then(|i| i.quote)
        .and_then(|mut q| q.pop())
        .unwrap_or_default();

    Ok(timestamps
        .iter()
        .enumerate()
        .map(|(idx, ts)| quote.bar_at(idx, *ts))
        .collect())
}

/// Pulls the provider's own explanation out of an error payload, if any.
fn chart_error_message(text: &str) -> Option<String> {
    let envelope: ChartEnvelope = serde_json::from_str(text).ok()?;
    let error = envelope.chart?.error?;
    error.description.or(error.code)
}

fn parse_search(text: &str) -> Result<Vec<SymbolMeta>> {
    let envelope: SearchEnvelope = serde_json::from_str(text)?;

    Ok(envelope
        .quotes
        .unwrap_or_default()
        .into_iter()
        .filter_map(|q| {
            let symbol = q.symbol?;
            let shortname = q
                .shortname
                .clone()
                .or_else(|| q.longname.clone())
                .unwrap_or_else(|| symbol.clone());
            let longname = q
                .longname
                .or(q.shortname)
                .unwrap_or_else(|| symbol.clone());
            Some(SymbolMeta {
                symbol,
                shortname,
                longname,
                exchange: q.exchange,
                quote_type: q.quote_type,
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timescale::TimeScale;
    use chrono::{TimeZone, Utc};

    const CHART_FIXTURE: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"symbol": "AAPL", "currency": "USD"},
                "timestamp": [1718460000, 1718460300, 1718460600],
                "indicators": {
                    "quote": [{
                        "open":   [189.1234, null, 190.0],
                        "high":   [190.5,    191.0, 190.9],
                        "low":    [188.9,    189.7, 189.5],
                        "close":  [190.1,    190.4, 190.2],
                        "volume": [120500,   null,  98000]
                    }]
                }
            }],
            "error": null
        }
    }"#;

    fn client() -> YahooClient {
        let config = Config::from_lookup(|key| match key {
            "YAHOO_CHART_URL" => Some("http://localhost:9000/chart/".to_string()),
            "YAHOO_SEARCH_URL" => Some("http://localhost:9000/search".to_string()),
            _ => None,
        })
        .unwrap();
        YahooClient::new(&config).unwrap()
    }

    #[test]
    fn chart_payload_becomes_raw_bars() {
        let bars = parse_chart(CHART_FIXTURE).unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].time, 1718460000);
        assert_eq!(bars[0].open, Some(189.1234));
        assert_eq!(bars[0].volume, Some(120500));
        assert_eq!(bars[1].open, None);
        assert_eq!(bars[1].volume, None);
        assert_eq!(bars[2].close, Some(190.2));
    }

    #[test]
    fn missing_result_is_empty_not_an_error() {
        let bars = parse_chart(r#"{"chart":{"result":null,"error":null}}"#).unwrap();
        assert!(bars.is_empty());
        let bars = parse_chart(r#"{"chart":{"result":[{"meta":{}}]}}"#).unwrap();
        assert!(bars.is_empty());
    }

    #[test]
    fn garbage_chart_payload_is_a_json_error() {
        let err = parse_chart("<html>rate limited</html>").unwrap_err();
        assert!(matches!(err, ChartServiceError::Json(_)));
    }

    #[test]
    fn error_description_is_extracted() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        assert_eq!(
            chart_error_message(body).as_deref(),
            Some("No data found, symbol may be delisted")
        );
        assert_eq!(chart_error_message("not json"), None);
    }

    #[test]
    fn search_names_fall_back() {
        let body = r#"{
            "quotes": [
                {"symbol": "AAPL", "shortname": "Apple Inc.", "longname": "Apple Inc.", "exchange": "NMS", "quoteType": "EQUITY"},
                {"symbol": "APLE", "longname": "Apple Hospitality REIT, Inc.", "exchange": "NYQ"},
                {"symbol": "AAPL.MX"},
                {"shortname": "News item without a symbol"}
            ],
            "news": []
        }"#;
        let results = parse_search(body).unwrap();
        assert_eq!(results.len(), 3);

        assert_eq!(results[0].quote_type.as_deref(), Some("EQUITY"));
        assert_eq!(results[1].shortname, "Apple Hospitality REIT, Inc.");
        assert_eq!(results[1].longname, "Apple Hospitality REIT, Inc.");
        assert_eq!(results[1].quote_type, None);
        assert_eq!(results[2].shortname, "AAPL.MX");
        assert_eq!(results[2].longname, "AAPL.MX");
    }

    #[test]
    fn request_urls_encode_symbols() {
        let client = client();
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap();
        let window = QueryWindow::ending_at(TimeScale::OneDay, now);
        let url = client.chart_request_url("BRK B", &window);
        assert_eq!(
            url,
            format!(
                "http://localhost:9000/chart/BRK%20B?period1={}&period2={}&interval=1d",
                window.start.timestamp(),
                now.timestamp()
            )
        );

        let url = client.search_request_url("s&p", 10);
        assert_eq!(url, "http://localhost:9000/search?q=s%26p&quotesCount=10&newsCount=0");
    }
}
