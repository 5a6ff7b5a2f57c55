use std::{net::SocketAddr, time::Duration};

use stockview_core::constants::{
    DEFAULT_FETCH_TIMEOUT, DEFAULT_FETCH_USER_AGENT, PRICE_HISTORY_CACHE_TTL,
};

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub db_connect_timeout: Duration,
    /// Fixed feed location. When unset, each run downloads the bhavcopy
    /// for the current UTC date.
    pub bhavcopy_url: Option<String>,
    pub fetch_timeout: Duration,
    pub fetch_user_agent: String,
    pub price_history_ttl: Duration,
    pub ingest_on_startup: bool,
    pub ingest_interval: Option<Duration>,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_u64(key: &str, default: u64) -> u64 {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid {}={:?}, using {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}

fn env_bool(key: &str) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = env_or("SV_LISTEN_ADDR", "0.0.0.0:4000")
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid SV_LISTEN_ADDR: {}", e))?;
        let db_path = env_or("SV_DB_PATH", "./db/app.db");
        let cors_allow = env_or("SV_CORS_ALLOW_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let ingest_interval = match env_u64("SV_INGEST_INTERVAL_SECS", 0) {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(env_u64("SV_REQUEST_TIMEOUT_MS", 30_000)),
            db_connect_timeout: Duration::from_secs(env_u64("SV_DB_CONNECT_TIMEOUT_SECS", 10)),
            bhavcopy_url: std::env::var("SV_BHAVCOPY_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            fetch_timeout: Duration::from_secs(env_u64(
                "SV_FETCH_TIMEOUT_SECS",
                DEFAULT_FETCH_TIMEOUT.as_secs(),
            )),
            fetch_user_agent: env_or("SV_FETCH_USER_AGENT", DEFAULT_FETCH_USER_AGENT),
            price_history_ttl: Duration::from_secs(env_u64(
                "SV_PRICE_HISTORY_TTL_SECS",
                PRICE_HISTORY_CACHE_TTL.as_secs(),
            )),
            ingest_on_startup: env_bool("SV_INGEST_ON_STARTUP"),
            ingest_interval,
        })
    }
}
