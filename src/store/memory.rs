// src/store/memory.rs
//
// In-memory stores for tests. Products keep insertion order, which stands in
// for the database's default ordering.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{OrderStore, ProductStore, ReviewStore};
use crate::errors::AppError;
use crate::filters::{CatalogQuery, PriceSort, ProductFilter};
use crate::models::{Order, Product, Review};

#[derive(Default)]
pub struct MemoryStore {
    products: RwLock<Vec<Product>>,
    orders: RwLock<Vec<Order>>,
    reviews: RwLock<Vec<Review>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn insert(&self, product: &Product) -> Result<(), AppError> {
        self.products.write().await.push(product.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, AppError> {
        Ok(self
            .products
            .read()
            .await
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn save(&self, product: &Product) -> Result<(), AppError> {
        let mut products = self.products.write().await;
        let slot = products
            .iter_mut()
            .find(|p| p.id == product.id)
            .ok_or_else(AppError::product_not_found)?;
        *slot = product.clone();
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.products.write().await.retain(|p| p.id != id);
        Ok(())
    }

    async fn latest(&self, limit: i64) -> Result<Vec<Product>, AppError> {
        let mut products = self.products.read().await.clone();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        products.truncate(limit.max(0) as usize);
        Ok(products)
    }

    async fn categories(&self) -> Result<Vec<String>, AppError> {
        let mut categories: Vec<String> = self
            .products
            .read()
            .await
            .iter()
            .map(|p| p.category.clone())
            .collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    async fn all(&self) -> Result<Vec<Product>, AppError> {
        Ok(self.products.read().await.clone())
    }

    async fn search(&self, query: &CatalogQuery) -> Result<Vec<Product>, AppError> {
        let mut matching: Vec<Product> = self
            .products
            .read()
            .await
            .iter()
            .filter(|p| query.filter.matches(p))
            .cloned()
            .collect();

        match query.sort {
            Some(PriceSort::Ascending) => matching.sort_by_key(|p| p.price),
            Some(PriceSort::Descending) => matching.sort_by(|a, b| b.price.cmp(&a.price)),
            None => {}
        }

        Ok(matching
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit as usize)
            .collect())
    }

    async fn count(&self, filter: &ProductFilter) -> Result<i64, AppError> {
        Ok(self
            .products
            .read()
            .await
            .iter()
            .filter(|p| filter.matches(p))
            .count() as i64)
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert(&self, order: &Order) -> Result<(), AppError> {
        self.orders.write().await.push(order.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, AppError> {
        Ok(self
            .orders
            .read()
            .await
            .iter()
            .find(|o| o.id == id)
            .cloned())
    }

    async fn save(&self, order: &Order) -> Result<(), AppError> {
        let mut orders = self.orders.write().await;
        let slot = orders
            .iter_mut()
            .find(|o| o.id == order.id)
            .ok_or_else(AppError::order_not_found)?;
        *slot = order.clone();
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.orders.write().await.retain(|o| o.id != id);
        Ok(())
    }

    async fn by_user(&self, user_id: Uuid) -> Result<Vec<Order>, AppError> {
        Ok(self
            .orders
            .read()
            .await
            .iter()
            .filter(|o| o.user == user_id)
            .cloned()
            .collect())
    }

    async fn all(&self) -> Result<Vec<Order>, AppError> {
        Ok(self.orders.read().await.clone())
    }
}

#[async_trait]
impl ReviewStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Review>, AppError> {
        Ok(self
            .reviews
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn find_by_user_and_product(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<Review>, AppError> {
        Ok(self
            .reviews
            .read()
            .await
            .iter()
            .find(|r| r.user == user_id && r.product == product_id)
            .cloned())
    }

    async fn insert(&self, review: &Review) -> Result<(), AppError> {
        self.reviews.write().await.push(review.clone());
        Ok(())
    }

    async fn save(&self, review: &Review) -> Result<(), AppError> {
        let mut reviews = self.reviews.write().await;
        let slot = reviews
            .iter_mut()
            .find(|r| r.id == review.id)
            .ok_or_else(AppError::review_not_found)?;
        *slot = review.clone();
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.reviews.write().await.retain(|r| r.id != id);
        Ok(())
    }

    async fn by_product(&self, product_id: Uuid) -> Result<Vec<Review>, AppError> {
        Ok(self
            .reviews
            .read()
            .await
            .iter()
            .filter(|r| r.product == product_id)
            .cloned()
            .collect())
    }
}
