pub mod yahoo;

pub use yahoo::YahooClient;

use crate::error::Result;
use crate::models::{RawBar, SymbolMeta};
use crate::timescale::QueryWindow;
use async_trait::async_trait;

/// Upstream source of historical bars and symbol lookups.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Bars for `symbol` inside `window`, in whatever order the provider
    /// returns them.
    async fn chart(&self, symbol: &str, window: &QueryWindow) -> Result<Vec<RawBar>>;

    async fn search(&self, query: &str, limit: u32) -> Result<Vec<SymbolMeta>>;
}
