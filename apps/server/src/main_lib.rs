use chrono::Utc;
use std::sync::Arc;

use crate::config::Config;
use stockview_core::{
    cache::TtlCache,
    ingest::{
        bhavcopy_url, ArchiveFetcher, HttpArchiveFetcher, IngestionService, IngestionServiceTrait,
        LocalArchiveFetcher, ZipCsvExtractor,
    },
    stocks::{StockService, StockServiceTrait},
};
use stockview_storage_sqlite::{
    db::{self, write_actor},
    stocks::StockRepository,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub stock_service: Arc<dyn StockServiceTrait + Send + Sync>,
    pub ingestion_service: Arc<dyn IngestionServiceTrait + Send + Sync>,
    pub bhavcopy_url: Option<String>,
}

impl AppState {
    /// Where the next ingestion run reads from.
    pub fn feed_location(&self) -> String {
        self.bhavcopy_url
            .clone()
            .unwrap_or_else(|| bhavcopy_url(Utc::now().date_naive()))
    }
}

pub fn init_tracing() {
    let log_format = std::env::var("SV_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    // A second call (e.g. from tests) keeps the first subscriber
    if log_format.eq_ignore_ascii_case("json") {
        let _ = registry
            .with(fmt::layer().json().with_current_span(false))
            .try_init();
    } else {
        let _ = registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .try_init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool_with_timeout(&db_path, config.db_connect_timeout)?;
    db::run_migrations(&pool)?;
    let writer = write_actor::spawn_writer((*pool).clone());

    let stock_repository = Arc::new(StockRepository::new(pool.clone(), writer.clone()));

    let stock_service: Arc<dyn StockServiceTrait + Send + Sync> = Arc::new(StockService::with_cache(
        stock_repository.clone(),
        Arc::new(TtlCache::new()),
        config.price_history_ttl,
    ));

    // A feed location without an http(s) scheme is read from disk
    let is_remote = config
        .bhavcopy_url
        .as_deref()
        .map_or(true, |url| url.starts_with("http://") || url.starts_with("https://"));
    let fetcher: Arc<dyn ArchiveFetcher> = if is_remote {
        Arc::new(HttpArchiveFetcher::new(
            config.fetch_timeout,
            &config.fetch_user_agent,
        )?)
    } else {
        Arc::new(LocalArchiveFetcher::new())
    };
    let ingestion_service: Arc<dyn IngestionServiceTrait + Send + Sync> = Arc::new(
        IngestionService::new(fetcher, Arc::new(ZipCsvExtractor), stock_repository),
    );

    Ok(Arc::new(AppState {
        stock_service,
        ingestion_service,
        bhavcopy_url: config.bhavcopy_url.clone(),
    }))
}
