use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use crate::pricing::{CostPerUnitTable, CostTableParseError, PricingPolicy};

const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org/";
const DEFAULT_AIR_QUALITY_URL: &str = "https://api.openweathermap.org/data/2.5/";
const DEFAULT_USER_AGENT: &str = "air_quality_app";
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub upstream: UpstreamConfig,
    pub pricing: PricingPolicy,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(&var_or("APP_ENV", "development"));

        let host = var_or("APP_HOST", "127.0.0.1");
        let port = var_or("APP_PORT", "3000")
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let telemetry = TelemetryConfig {
            log_level: var_or("APP_LOG_LEVEL", "info"),
            format: var_or("APP_LOG_FORMAT", "compact").parse()?,
        };

        let upstream = UpstreamConfig {
            geocoder_url: var_or("APP_GEOCODER_URL", DEFAULT_GEOCODER_URL),
            air_quality_url: var_or("APP_AIR_QUALITY_URL", DEFAULT_AIR_QUALITY_URL),
            openweather_api_key: env::var("APP_OPENWEATHER_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            user_agent: var_or("APP_USER_AGENT", DEFAULT_USER_AGENT),
            timeout: Duration::from_secs(parse_var(
                "APP_UPSTREAM_TIMEOUT_SECS",
                DEFAULT_UPSTREAM_TIMEOUT_SECS,
            )?),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry,
            upstream,
            pricing: load_pricing()?,
        })
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
            variable: name,
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}

fn load_pricing() -> Result<PricingPolicy, ConfigError> {
    let mut policy = PricingPolicy::standard();

    policy.market.supply = parse_var("APP_MARKET_SUPPLY", policy.market.supply)?;
    policy.market.demand = parse_var("APP_MARKET_DEMAND", policy.market.demand)?;
    policy.market.adjustment_factor =
        parse_var("APP_MARKET_ADJUSTMENT", policy.market.adjustment_factor)?;
    policy.rate_per_unit_area = parse_var("APP_AREA_RATE", policy.rate_per_unit_area)?;

    for (variable, value) in [
        ("APP_MARKET_SUPPLY", policy.market.supply),
        ("APP_MARKET_DEMAND", policy.market.demand),
        ("APP_MARKET_ADJUSTMENT", policy.market.adjustment_factor),
        ("APP_AREA_RATE", policy.rate_per_unit_area),
    ] {
        if !value.is_finite() || value <= 0.0 {
            return Err(ConfigError::NonPositive { variable });
        }
    }

    if let Ok(raw) = env::var("APP_COST_PER_UNIT") {
        let overrides: CostPerUnitTable = raw.parse()?;
        for (pollutant, cost) in overrides.iter() {
            policy.cost_per_unit.insert(pollutant, cost);
        }
    }

    Ok(policy)
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" | "text" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::InvalidLogFormat(other.to_string())),
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
}

/// Endpoints and credentials of the geocoding and air quality services.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub geocoder_url: String,
    pub air_quality_url: String,
    pub openweather_api_key: Option<String>,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            geocoder_url: DEFAULT_GEOCODER_URL.to_string(),
            air_quality_url: DEFAULT_AIR_QUALITY_URL.to_string(),
            openweather_api_key: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("APP_PORT must be a valid u16")]
    InvalidPort,
    #[error("APP_HOST must parse to an IPv4 or IPv6 address")]
    InvalidHost { source: std::net::AddrParseError },
    #[error("APP_LOG_FORMAT must be 'compact' or 'json' (found '{0}')")]
    InvalidLogFormat(String),
    #[error("{variable} must be a number (found '{value}')")]
    InvalidNumber {
        variable: &'static str,
        value: String,
    },
    #[error("{variable} must be a finite number greater than zero")]
    NonPositive { variable: &'static str },
    #[error("APP_COST_PER_UNIT is invalid: {0}")]
    CostTable(#[from] CostTableParseError),
}
