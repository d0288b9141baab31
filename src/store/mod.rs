// src/store/mod.rs

#[cfg(test)]
pub mod memory;
mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::filters::{CatalogQuery, ProductFilter};
use crate::models::{Order, Product, Review};

pub use postgres::PgStore;

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn insert(&self, product: &Product) -> Result<(), AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, AppError>;

    /// Overwrites the stored product with the same id.
    async fn save(&self, product: &Product) -> Result<(), AppError>;

    async fn delete(&self, id: Uuid) -> Result<(), AppError>;

    /// Newest products first.
    async fn latest(&self, limit: i64) -> Result<Vec<Product>, AppError>;

    async fn categories(&self) -> Result<Vec<String>, AppError>;

    async fn all(&self) -> Result<Vec<Product>, AppError>;

    async fn search(&self, query: &CatalogQuery) -> Result<Vec<Product>, AppError>;

    async fn count(&self, filter: &ProductFilter) -> Result<i64, AppError>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, order: &Order) -> Result<(), AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, AppError>;

    async fn save(&self, order: &Order) -> Result<(), AppError>;

    async fn delete(&self, id: Uuid) -> Result<(), AppError>;

    async fn by_user(&self, user_id: Uuid) -> Result<Vec<Order>, AppError>;

    async fn all(&self) -> Result<Vec<Order>, AppError>;
}

#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Review>, AppError>;

    async fn find_by_user_and_product(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<Review>, AppError>;

    async fn insert(&self, review: &Review) -> Result<(), AppError>;

    async fn save(&self, review: &Review) -> Result<(), AppError>;

    async fn delete(&self, id: Uuid) -> Result<(), AppError>;

    async fn by_product(&self, product_id: Uuid) -> Result<Vec<Review>, AppError>;
}
