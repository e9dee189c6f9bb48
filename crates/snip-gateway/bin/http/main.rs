mod cli;

use crate::cli::{CacheBackendArg, StorageBackendArg, CLI};
use anyhow::Context;
use clap::Parser;
use snip_cache::{BestEffortCache, CachePolicy, MokaUrlCache, NullCache, RedisUrlCache, UrlCache};
use snip_gateway::{App, AppState};
use snip_generator::RandomGenerator;
use snip_redirector::RedirectorService;
use snip_shortener::{ShortenerConfig, ShortenerService};
use snip_storage::{InMemoryRepository, MySqlRepository, Repository, TimeoutRepository};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::try_parse()?;
    let _telemetry = snip_telemetry::init(&config.telemetry())?;

    info!(
        listen_addr = %config.listen_addr,
        base_url = %config.base_url,
        storage_backend = %config.storage,
        cache_backend = %config.cache,
        "starting snip gateway"
    );

    let cache = build_cache(&config).await;

    match config.storage {
        StorageBackendArg::InMemory => serve(&config, InMemoryRepository::new(), cache).await,
        StorageBackendArg::Mysql => {
            let mysql_dsn = config
                .mysql_dsn
                .as_deref()
                .context("mysql dsn is required when storage backend is mysql")?;
            let repository = MySqlRepository::connect(mysql_dsn).await?;
            repository.ensure_schema().await?;
            info!("mysql schema ready");
            serve(&config, repository, cache).await
        }
    }
}

/// Picks the lookup cache. An unreachable Redis degrades to no caching
/// instead of aborting startup.
async fn build_cache(config: &CLI) -> Arc<dyn UrlCache> {
    match (config.cache, config.redis_url.as_deref()) {
        (CacheBackendArg::None, _) => Arc::new(NullCache::new()),
        (CacheBackendArg::Memory, _) => Arc::new(MokaUrlCache::with_capacity(config.cache_capacity)),
        (CacheBackendArg::Redis, Some(redis_url)) => match RedisUrlCache::connect(redis_url).await {
            Ok(cache) => {
                info!("connected to redis cache");
                Arc::new(cache)
            }
            Err(e) => {
                warn!(error = %e, "redis unreachable, running without a cache");
                Arc::new(NullCache::new())
            }
        },
        (CacheBackendArg::Redis, None) => {
            warn!("no redis url given, running without a cache");
            Arc::new(NullCache::new())
        }
    }
}

async fn serve<R>(config: &CLI, repository: R, cache: Arc<dyn UrlCache>) -> anyhow::Result<()>
where
    R: Repository + Clone,
{
    let repository = TimeoutRepository::new(repository, config.store_timeout());
    let policy = CachePolicy::builder()
        .ttl(config.cache_ttl())
        .timeout(config.cache_timeout())
        .build();
    let generator = RandomGenerator::new(config.code_length)?;
    let shortener_config = ShortenerConfig::builder()
        .max_generation_attempts(config.generator_max_attempts)
        .max_insert_attempts(config.insert_max_attempts)
        .build();

    let shortener = ShortenerService::new(
        repository.clone(),
        generator,
        BestEffortCache::new(cache.clone(), policy),
        shortener_config,
    );
    let redirector = RedirectorService::new(repository, BestEffortCache::new(cache, policy));
    let state = AppState::new(
        Arc::new(shortener),
        Arc::new(redirector),
        config.base_url.clone(),
    );

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!(listen_addr = %listener.local_addr()?, "gateway listening");

    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
