use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("Invalid STORE_BACKEND: {}. Must be 'postgres' or 'memory'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Yahoo,
    AlphaVantage,
    Multi,
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yahoo" => Ok(ProviderKind::Yahoo),
            "alphavantage" => Ok(ProviderKind::AlphaVantage),
            "multi" => Ok(ProviderKind::Multi),
            other => Err(format!(
                "Invalid PRICE_PROVIDER: {}. Must be 'yahoo', 'alphavantage', or 'multi'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub store_backend: String,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub price_provider: String,
    pub alphavantage_api_key: Option<String>,
    pub jwt_secret: String,
    pub base_currency: String,
    pub reference_index: String,
    pub provider_timeout_secs: u64,
    pub quote_cache_ttl_secs: u64,
    pub risk_free_rate: f64,
    /// Numeric settings that were set but could not be parsed.
    pub invalid_settings: Vec<String>,
}

/// Reads settings through `lookup`, remembering keys whose values don't parse.
struct Settings<F> {
    lookup: F,
    invalid: Vec<String>,
}

impl<F: Fn(&str) -> Option<String>> Settings<F> {
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn parse<T: FromStr>(&mut self, key: &str, default: T) -> T {
        let Some(raw) = self.get(key) else {
            return default;
        };
        match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("{}={:?} is not a valid value", key, raw);
                self.invalid.push(key.to_string());
                default
            }
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut env = Settings { lookup, invalid: Vec::new() };

        let database_max_connections = env.parse("DATABASE_MAX_CONNECTIONS", 10);
        let provider_timeout_secs = env.parse("PROVIDER_TIMEOUT_SECS", 10);
        let quote_cache_ttl_secs = env.parse("QUOTE_CACHE_TTL_SECS", 60);
        let risk_free_rate = env.parse("RISK_FREE_RATE", 0.02);

        Self {
            bind_addr: env.or("BIND_ADDR", "0.0.0.0:3000"),
            store_backend: env.or("STORE_BACKEND", "postgres"),
            database_url: env.get("DATABASE_URL"),
            database_max_connections,
            price_provider: env.or("PRICE_PROVIDER", "yahoo"),
            alphavantage_api_key: env.get("ALPHAVANTAGE_API_KEY"),
            jwt_secret: env.or("JWT_SECRET", ""),
            base_currency: env.or("BASE_CURRENCY", "INR").to_uppercase(),
            reference_index: env.or("REFERENCE_INDEX", "^NSEI"),
            provider_timeout_secs,
            quote_cache_ttl_secs,
            risk_free_rate,
            invalid_settings: env.invalid,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.invalid_settings.is_empty() {
            return Err(format!("Malformed settings: {}", self.invalid_settings.join(", ")));
        }
        self.bind_addr
            .parse::<SocketAddr>()
            .map_err(|e| format!("Invalid BIND_ADDR {}: {}", self.bind_addr, e))?;

        if self.store_backend()? == StoreBackend::Postgres && self.database_url.is_none() {
            return Err("STORE_BACKEND is postgres but DATABASE_URL is not set".to_string());
        }
        if self.provider_kind()? != ProviderKind::Yahoo && self.alphavantage_api_key.is_none() {
            return Err(format!("PRICE_PROVIDER {} needs ALPHAVANTAGE_API_KEY", self.price_provider));
        }
        if self.jwt_secret.trim().is_empty() {
            return Err("JWT_SECRET must be set".to_string());
        }
        if self.provider_timeout_secs == 0 {
            return Err("PROVIDER_TIMEOUT_SECS must be at least 1".to_string());
        }
        Ok(())
    }

    pub fn store_backend(&self) -> Result<StoreBackend, String> {
        self.store_backend.parse()
    }

    pub fn provider_kind(&self) -> Result<ProviderKind, String> {
        self.price_provider.parse()
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    /// Settings for tests and local runs: in-memory store, no database.
    pub fn for_memory(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            store_backend: "memory".to_string(),
            database_url: None,
            database_max_connections: 1,
            price_provider: "yahoo".to_string(),
            alphavantage_api_key: None,
            jwt_secret: jwt_secret.into(),
            base_currency: "INR".to_string(),
            reference_index: "^NSEI".to_string(),
            provider_timeout_secs: 10,
            quote_cache_ttl_secs: 0,
            risk_free_rate: 0.02,
            invalid_settings: Vec::new(),
        }
    }
}
