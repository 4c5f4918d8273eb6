//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, store selection, the expiry sweeper, and the
//! Axum server lifecycle.

use crate::config::Config;
use crate::domain::clock::Clock;
use crate::domain::expiry_sweeper::run_expiry_sweeper;
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::cache::{CacheService, MemoryCache, RedisCache};
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::counter::{CounterStore, MemoryCounterStore, RedisCounterStore};
use crate::infrastructure::persistence::{PgLinkRepository, PgTokenRepository};
use crate::infrastructure::redis;
use crate::routes::app_router;
use crate::state::{AppState, Backends, ServiceSettings};

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Redis counter store and cache (or in-process fallbacks)
/// - Expiry sweeper
/// - Axum HTTP server
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_database(&config).await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
    let (counter_store, cache) = connect_stores(&config, clock.clone()).await;

    let pool = Arc::new(pool);
    let link_repository: Arc<dyn LinkRepository> = Arc::new(PgLinkRepository::new(pool.clone()));
    let token_repository = Arc::new(PgTokenRepository::new(pool));

    if let Some(interval) = config.purge_interval() {
        tokio::spawn(run_expiry_sweeper(
            link_repository.clone(),
            clock.clone(),
            interval,
        ));
        tracing::info!(interval_secs = interval.as_secs(), "Expiry sweeper started");
    } else {
        tracing::info!("Expiry sweeper disabled");
    }

    let state = AppState::new(
        Backends {
            link_repository,
            token_repository,
            counter_store,
            cache,
            clock,
        },
        ServiceSettings::from(&config),
    );

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid LISTEN address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn connect_database(config: &Config) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")
}

/// Picks the counter store and cache.
///
/// Both share one Redis connection manager when Redis is configured and
/// reachable. Otherwise both fall back to in-process maps, which limits and
/// caches per instance only.
async fn connect_stores(
    config: &Config,
    clock: Arc<dyn Clock>,
) -> (Arc<dyn CounterStore>, Arc<dyn CacheService>) {
    if let Some(redis_url) = &config.redis_url {
        match redis::connect(redis_url).await {
            Ok(conn) => {
                tracing::info!("Counter store and cache enabled (Redis)");
                return (
                    Arc::new(RedisCounterStore::new(conn.clone())),
                    Arc::new(RedisCache::new(conn)),
                );
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to connect to Redis: {}. Using in-process counters and cache.",
                    e
                );
            }
        }
    } else {
        tracing::info!("Redis not configured, using in-process counters and cache");
    }

    let counters = Arc::new(MemoryCounterStore::new(clock.clone()));
    let cache = Arc::new(MemoryCache::new(clock));
    tokio::spawn(run_memory_eviction(
        counters.clone(),
        cache.clone(),
        Duration::from_secs(config.rate_limit_window_seconds),
    ));

    (counters, cache)
}

/// Drops expired in-process counters and cache entries once per rate-limit
/// window.
async fn run_memory_eviction(
    counters: Arc<MemoryCounterStore>,
    cache: Arc<MemoryCache>,
    every: Duration,
) {
    let mut ticker = tokio::time::interval(every);
    loop {
        ticker.tick().await;
        let counters_evicted = counters.evict_expired().await;
        let cache_evicted = cache.evict_expired().await;
        if counters_evicted + cache_evicted > 0 {
            tracing::debug!(
                counters_evicted,
                cache_evicted,
                "Evicted expired in-process entries"
            );
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
