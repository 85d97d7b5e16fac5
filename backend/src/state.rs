use std::sync::Arc;

use crate::auth::JwtAuth;
use crate::config::AppConfig;
use crate::external::fx_provider::{ChartFxProvider, FxProvider};
use crate::external::price_provider::PriceProvider;
use crate::services::currency_service::CurrencyNormalizer;
use crate::services::goal_service::GoalProjector;
use crate::services::history_service::HistorySnapshotter;
use crate::services::market_price_gateway::MarketPriceGateway;
use crate::services::quote_cache::QuoteCache;
use crate::services::valuation_service::PortfolioValuator;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub gateway: MarketPriceGateway,
    pub valuator: PortfolioValuator,
    pub projector: GoalProjector,
    pub snapshotter: HistorySnapshotter,
    pub auth: JwtAuth,
    pub base_currency: String,
    pub risk_free_rate: f64,
}

impl AppState {
    /// Wires every component around one store and one price provider.
    /// FX rates come from the same provider unless `fx` is given.
    pub fn new(
        config: &AppConfig,
        store: Arc<dyn Store>,
        prices: Arc<dyn PriceProvider>,
        fx: Option<Arc<dyn FxProvider>>,
    ) -> Self {
        let timeout = config.provider_timeout();
        let fx: Arc<dyn FxProvider> = match fx {
            Some(fx) => fx,
            None => Arc::new(ChartFxProvider::new(prices.clone())),
        };

        let gateway = MarketPriceGateway::new(prices, QuoteCache::new(config.quote_cache_ttl_secs), timeout);
        let normalizer = CurrencyNormalizer::new(fx, config.base_currency.clone(), timeout);

        Self {
            valuator: PortfolioValuator::new(gateway.clone(), normalizer),
            projector: GoalProjector::new(store.clone(), gateway.clone(), config.reference_index.clone()),
            snapshotter: HistorySnapshotter::new(store.clone()),
            auth: JwtAuth::new(&config.jwt_secret),
            base_currency: config.base_currency.clone(),
            risk_free_rate: config.risk_free_rate,
            gateway,
            store,
        }
    }
}
