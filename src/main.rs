use actix_cors::Cors;
use actix_web::{web, App, HttpServer, middleware};
use ion_locator::config::{LoggingSettings, Settings};
use ion_locator::core::{ChannelLocator, SearchPolicy};
use ion_locator::routes::{self, AppState, handle_query_payload_error};
use ion_locator::services::{CacheManager, CachedGeocodeStore, PostgresClient};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_logging(logging: &LoggingSettings) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    init_logging(&settings.logging);

    info!("Starting ION locator service...");

    let postgres = match PostgresClient::from_settings(&settings.database).await {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Failed to connect to PostgreSQL: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
        }
    };

    info!("PostgreSQL client initialized");

    // Redis is optional; without it the L1 cache still serves this instance
    let cache_ttl = settings.cache.ttl_secs.unwrap_or(3600);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(1000);

    let cache = match settings.cache.redis_url.as_deref() {
        Some(redis_url) => match CacheManager::new(redis_url, l1_cache_size, cache_ttl).await {
            Ok(c) => c,
            Err(e) => {
                warn!("Failed to connect to Redis ({}), using in-process cache only", e);
                CacheManager::in_memory(l1_cache_size, cache_ttl)
            }
        },
        None => CacheManager::in_memory(l1_cache_size, cache_ttl),
    };
    let cache = Arc::new(cache);

    info!(
        "Cache manager initialized (L1: {} entries, TTL: {}s, Redis: {})",
        l1_cache_size,
        cache_ttl,
        cache.has_redis()
    );

    let policy = SearchPolicy::from(&settings.search);
    info!(
        "Search policy: default radius {}mi, bounds {}..={}mi, {} overrides",
        policy.default_radius_miles,
        policy.min_radius_miles,
        policy.max_radius_miles,
        policy.overrides.len()
    );

    let locator = ChannelLocator::new(
        CachedGeocodeStore::new(Arc::clone(&postgres), Arc::clone(&cache)),
        Arc::clone(&postgres),
        policy,
    );

    let app_state = AppState {
        locator: Arc::new(locator),
        cache,
        pagination: settings.pagination.clone(),
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes::<
                CachedGeocodeStore<Arc<PostgresClient>>,
                Arc<PostgresClient>,
            >)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
