// src/state.rs

use std::sync::Arc;

use crate::cache::CacheStore;
use crate::cloudinary::MediaHost;
use crate::store::{OrderStore, ProductStore, ReviewStore};

/// Handles every request works with. Cloning is cheap; all backends are
/// shared behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<dyn CacheStore>,
    pub products: Arc<dyn ProductStore>,
    pub orders: Arc<dyn OrderStore>,
    pub reviews: Arc<dyn ReviewStore>,
    pub media: Arc<dyn MediaHost>,
    pub jwt_secret: String,
    pub products_per_page: i64,
}

#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}
