use anyhow::Result;
use dotenv::dotenv;
use std::sync::Arc;
use ticker_chart::api::YahooClient;
use ticker_chart::config::Config;
use ticker_chart::handlers::{router, AppState};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv().ok();

    let config = Config::from_env()?;
    let provider = Arc::new(YahooClient::new(&config)?);

    info!("Chart API: {}", config.yahoo_chart_url);
    info!("Search API: {}", config.yahoo_search_url);

    let addr = config.bind_addr();
    let state = Arc::new(AppState::new(config, provider));
    let app = router(state);

    info!("Starting ticker chart on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
