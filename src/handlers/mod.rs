use crate::api::MarketDataProvider;
use crate::chart::SeriesSpec;
use crate::config::{Config, MAX_SYNTHETIC_POINTS};
use crate::error::{ChartServiceError, Result};
use crate::market::{validate_historical, MarketService};
use crate::models::{HistoricalResponse, SearchResponse};
use crate::view::{self, ChartPayload, Selection};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::{Html, Json},
    routing::get,
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

const INDEX_HTML: &str = include_str!("../../static/index.html");
const PAGE_CONFIG_MARKER: &str = "__PAGE_CONFIG__";

pub struct AppState {
    pub config: Config,
    pub market: MarketService,
    page: String,
}

impl AppState {
    pub fn new(config: Config, provider: Arc<dyn MarketDataProvider>) -> Self {
        let market = MarketService::new(provider, config.search_quotes_count);
        let page = render_page(&config);
        Self {
            config,
            market,
            page,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalQuery {
    pub symbol: Option<String>,
    pub time_scale: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyntheticQuery {
    pub time_scale: Option<String>,
    pub chart_type: Option<String>,
    pub count: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartQuery {
    pub symbol: Option<String>,
    pub time_scale: Option<String>,
    pub chart_type: Option<String>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/api/historical", get(get_historical))
        .route("/api/search", get(search_symbols))
        .route("/api/synthetic", get(get_synthetic))
        .route("/api/chart", get(get_chart))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Inlines the boot settings into the page. `</` is escaped so the JSON can't
/// terminate the surrounding script tag.
pub fn render_page(config: &Config) -> String {
    let page_config = view::page_config(config).to_string().replace("</", "<\\/");
    INDEX_HTML.replace(PAGE_CONFIG_MARKER, &page_config)
}

async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(state.page.clone())
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn get_historical(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<HistoricalQuery>, QueryRejection>,
) -> Result<Json<HistoricalResponse>> {
    let Query(query) = query?;
    let (symbol, scale) =
        validate_historical(query.symbol.as_deref(), query.time_scale.as_deref())?;

    let data = state.market.historical(&symbol, scale, Utc::now()).await?;
    Ok(Json(HistoricalResponse { data, symbol }))
}

pub async fn search_symbols(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<SearchResponse>> {
    let Query(query) = query?;
    let results = state
        .market
        .search(query.q.as_deref().unwrap_or_default())
        .await?;
    Ok(Json(SearchResponse { results }))
}

pub async fn get_synthetic(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<SyntheticQuery>, QueryRejection>,
) -> Result<Json<SeriesSpec>> {
    let Query(query) = query?;
    let selection = Selection::parse(
        None,
        query.time_scale.as_deref(),
        query.chart_type.as_deref(),
    )?;

    let count = match query.count.as_deref() {
        None => state.config.synthetic_points,
        Some(raw) => raw
            .parse::<usize>()
            .ok()
            .filter(|n| (1..=MAX_SYNTHETIC_POINTS).contains(n))
            .ok_or_else(|| {
                ChartServiceError::Validation(format!(
                    "count must be between 1 and {}",
                    MAX_SYNTHETIC_POINTS
                ))
            })?,
    };

    let spec = SeriesSpec::placeholder(
        selection.chart_type,
        selection.time_scale,
        count,
        Utc::now(),
        &mut rand::rng(),
    );
    Ok(Json(spec))
}

pub async fn get_chart(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<ChartQuery>, QueryRejection>,
) -> Result<Json<ChartPayload>> {
    let Query(query) = query?;
    let selection = Selection::parse(
        query.symbol.as_deref(),
        query.time_scale.as_deref(),
        query.chart_type.as_deref(),
    )?;

    let payload = view::compose(
        &state.market,
        selection,
        state.config.synthetic_points,
        Utc::now(),
    )
    .await;

    info!(
        "Chart {:?} {} {}: {} points (real: {})",
        payload.symbol,
        payload.chart_type,
        payload.time_scale,
        payload.series.data.len(),
        payload.series.has_real_data
    );
    Ok(Json(payload))
}
