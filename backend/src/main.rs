use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use tokio::net::TcpListener;

use goalfolio_backend::app;
use goalfolio_backend::config::{AppConfig, ProviderKind, StoreBackend};
use goalfolio_backend::external::alphavantage::AlphaVantageProvider;
use goalfolio_backend::external::multi_provider::MultiProvider;
use goalfolio_backend::external::price_provider::PriceProvider;
use goalfolio_backend::external::yahoofinance::YahooFinanceProvider;
use goalfolio_backend::logging::{init_logging, LoggingConfig};
use goalfolio_backend::state::AppState;
use goalfolio_backend::store::memory::MemoryStore;
use goalfolio_backend::store::postgres::PgStore;
use goalfolio_backend::store::Store;

fn build_provider(config: &AppConfig) -> anyhow::Result<Arc<dyn PriceProvider>> {
    let kind = config.provider_kind().map_err(|e| anyhow!(e))?;
    let alphavantage = || {
        config
            .alphavantage_api_key
            .clone()
            .map(AlphaVantageProvider::new)
            .context("ALPHAVANTAGE_API_KEY is not set")
    };

    let provider: Arc<dyn PriceProvider> = match kind {
        ProviderKind::Yahoo => {
            tracing::info!("📊 Using price provider: Yahoo Finance");
            Arc::new(YahooFinanceProvider::new())
        }
        ProviderKind::AlphaVantage => {
            tracing::info!("📊 Using price provider: Alpha Vantage only");
            Arc::new(alphavantage()?)
        }
        ProviderKind::Multi => {
            tracing::info!("📊 Using price provider: Multi-provider (Yahoo Finance + Alpha Vantage fallback)");
            Arc::new(MultiProvider::new(
                Box::new(YahooFinanceProvider::new()),
                Box::new(alphavantage()?),
            ))
        }
    };
    Ok(provider)
}

async fn build_store(config: &AppConfig) -> anyhow::Result<Arc<dyn Store>> {
    let backend = config.store_backend().map_err(|e| anyhow!(e))?;
    let store: Arc<dyn Store> = match backend {
        StoreBackend::Postgres => {
            let url = config.database_url.as_deref().context("DATABASE_URL is not set")?;
            Arc::new(PgStore::connect(url, config.database_max_connections).await?)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };
    Ok(store)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    init_logging(LoggingConfig::from_env())?;

    let config = AppConfig::from_env();
    config.validate().map_err(|e| anyhow!(e))?;

    let store = build_store(&config).await?;
    let provider = build_provider(&config)?;

    let state = AppState::new(&config, store, provider, None);
    let app = app::create_app(state);

    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Goalfolio backend running at http://{}/ (base currency {})", addr, config.base_currency);
    axum::serve(listener, app).await?;

    Ok(())
}
