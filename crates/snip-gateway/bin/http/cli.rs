use clap::{Parser, ValueEnum};
use snip_telemetry::{LogFormat, TelemetryConfig};
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::time::Duration;

pub const LISTEN_ADDR_ENV: &str = "SNIP_LISTEN_ADDR";
pub const BASE_URL_ENV: &str = "SNIP_BASE_URL";
pub const STORAGE_BACKEND_ENV: &str = "SNIP_STORAGE_BACKEND";
pub const MYSQL_DSN_ENV: &str = "SNIP_MYSQL_DSN";
pub const CACHE_BACKEND_ENV: &str = "SNIP_CACHE_BACKEND";
pub const REDIS_URL_ENV: &str = "SNIP_REDIS_URL";
pub const CACHE_TTL_ENV: &str = "SNIP_CACHE_TTL_SECS";
pub const CACHE_CAPACITY_ENV: &str = "SNIP_CACHE_CAPACITY";
pub const CODE_LENGTH_ENV: &str = "SNIP_CODE_LENGTH";
pub const GENERATOR_MAX_ATTEMPTS_ENV: &str = "SNIP_GENERATOR_MAX_ATTEMPTS";
pub const INSERT_MAX_ATTEMPTS_ENV: &str = "SNIP_INSERT_MAX_ATTEMPTS";
pub const STORE_TIMEOUT_ENV: &str = "SNIP_STORE_TIMEOUT_MS";
pub const CACHE_TIMEOUT_ENV: &str = "SNIP_CACHE_TIMEOUT_MS";
pub const LOG_FORMAT_ENV: &str = "SNIP_LOG_FORMAT";
pub const OTLP_ENDPOINT_ENV: &str = "SNIP_OTLP_ENDPOINT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "mysql")]
    Mysql,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Mysql => write!(f, "mysql"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CacheBackendArg {
    #[value(name = "none")]
    None,
    #[value(name = "memory")]
    Memory,
    #[value(name = "redis")]
    Redis,
}

impl Display for CacheBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheBackendArg::None => write!(f, "none"),
            CacheBackendArg::Memory => write!(f, "memory"),
            CacheBackendArg::Redis => write!(f, "redis"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "snip-gateway")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Public prefix of every short URL handed out.
    #[arg(long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = MYSQL_DSN_ENV, required_if_eq("storage", "mysql"))]
    pub mysql_dsn: Option<String>,

    #[arg(
        long,
        env = CACHE_BACKEND_ENV,
        value_enum,
        default_value_t = CacheBackendArg::Memory
    )]
    pub cache: CacheBackendArg,

    #[arg(long, env = REDIS_URL_ENV, required_if_eq("cache", "redis"))]
    pub redis_url: Option<String>,

    #[arg(long, env = CACHE_TTL_ENV, default_value_t = 3600)]
    pub cache_ttl_secs: u64,

    /// Entry limit of the in-process cache.
    #[arg(long, env = CACHE_CAPACITY_ENV, default_value_t = 10_000)]
    pub cache_capacity: u64,

    #[arg(long, env = CODE_LENGTH_ENV, default_value_t = 6)]
    pub code_length: usize,

    #[arg(long, env = GENERATOR_MAX_ATTEMPTS_ENV, default_value_t = 8)]
    pub generator_max_attempts: u32,

    #[arg(long, env = INSERT_MAX_ATTEMPTS_ENV, default_value_t = 4)]
    pub insert_max_attempts: u32,

    #[arg(long, env = STORE_TIMEOUT_ENV, default_value_t = 2000)]
    pub store_timeout_ms: u64,

    #[arg(long, env = CACHE_TIMEOUT_ENV, default_value_t = 250)]
    pub cache_timeout_ms: u64,

    #[arg(
        long,
        env = LOG_FORMAT_ENV,
        value_enum,
        default_value_t = LogFormat::Text
    )]
    pub log_format: LogFormat,

    #[arg(long, env = OTLP_ENDPOINT_ENV)]
    pub otlp_endpoint: Option<String>,
}

impl CLI {
    pub fn telemetry(&self) -> TelemetryConfig {
        let config = TelemetryConfig::builder()
            .service_name("snip-gateway")
            .log_format(self.log_format);
        match &self.otlp_endpoint {
            Some(endpoint) => config.otlp_endpoint(endpoint.clone()).build(),
            None => config.build(),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn cache_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_timeout_ms)
    }
}
