// src/main.rs

use std::net::SocketAddr;
use std::sync::Arc;

use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod auth;
mod auth_models;
mod cache;
mod cloudinary;
mod config;
mod dashboard_service;
mod errors;
mod extractor;
mod filters;
mod handlers;
mod middleware;
mod models;
mod order_service;
mod pagination;
mod product_service;
mod review_service;
mod routes;
mod state;
mod store;
#[cfg(test)]
mod testing;

use crate::cache::{CacheStore, MemoryCache, RedisCache};
use crate::cloudinary::CloudinaryClient;
use crate::config::AppConfig;
use crate::state::AppState;
use crate::store::PgStore;

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting server...");

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let pool = match PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            tracing::info!("Connected to the database");
            pool
        }
        Err(err) => {
            tracing::error!("Could not connect to the database: {:?}", err);
            std::process::exit(1);
        }
    };

    if let Err(e) = sqlx::migrate!().run(&pool).await {
        tracing::error!("Database migration failed: {:?}", e);
        std::process::exit(1);
    }

    let cache: Arc<dyn CacheStore> = match &config.redis_url {
        Some(url) => match RedisCache::connect(url).await {
            Ok(redis) => {
                tracing::info!("Using Redis cache store");
                Arc::new(redis)
            }
            Err(e) => {
                tracing::error!("Could not connect to Redis: {:?}", e);
                std::process::exit(1);
            }
        },
        None => {
            tracing::info!(
                "REDIS_URL not set, using in-process cache (capacity {})",
                config.cache_capacity
            );
            Arc::new(MemoryCache::new(config.cache_capacity))
        }
    };

    let store = Arc::new(PgStore::new(pool));
    let app_state = AppState {
        cache,
        products: store.clone(),
        orders: store.clone(),
        reviews: store,
        media: Arc::new(CloudinaryClient::new(config.cloudinary.clone())),
        jwt_secret: config.jwt_secret.clone(),
        products_per_page: config.products_per_page,
    };

    let app = routes::create_router(app_state)
        .layer(routes::cors_layer(config.frontend_url.as_deref()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Could not bind {}: {}", addr, e);
            return;
        }
    };

    if let Err(e) = axum::serve(listener, app.into_make_service()).await {
        tracing::error!("Server error: {}", e);
    }
}
