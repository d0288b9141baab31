// src/cache/invalidation.rs
use uuid::Uuid;

use super::{CacheKey, CacheStore};
use crate::errors::AppError;

/// Which cached views a mutation made stale.
///
/// Each flag carries the ids its keys need, so an order invalidation
/// without a user or order id cannot be expressed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invalidation {
    product: Option<Vec<Uuid>>,
    order: Option<(Uuid, Uuid)>,
    review: Option<Uuid>,
    admin: bool,
}

impl Invalidation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog listings only, no single-product entries.
    pub fn products(mut self) -> Self {
        self.product.get_or_insert_with(Vec::new);
        self
    }

    /// Catalog listings plus `product-<id>` for every id.
    pub fn product_ids(mut self, ids: impl IntoIterator<Item = Uuid>) -> Self {
        let product_ids = self.product.get_or_insert_with(Vec::new);
        for id in ids {
            if !product_ids.contains(&id) {
                product_ids.push(id);
            }
        }
        self
    }

    pub fn product(self, id: Uuid) -> Self {
        self.product_ids([id])
    }

    pub fn order(mut self, user_id: Uuid, order_id: Uuid) -> Self {
        self.order = Some((user_id, order_id));
        self
    }

    pub fn review(mut self, product_id: Uuid) -> Self {
        self.review = Some(product_id);
        self
    }

    pub fn admin(mut self) -> Self {
        self.admin = true;
        self
    }

    pub fn keys(&self) -> Vec<CacheKey> {
        let mut keys = Vec::new();

        if let Some(product_id) = self.review {
            keys.push(CacheKey::Reviews(product_id));
        }

        if let Some(product_ids) = &self.product {
            keys.extend(CacheKey::CATALOG);
            keys.extend(product_ids.iter().copied().map(CacheKey::Product));
        }

        if let Some((user_id, order_id)) = self.order {
            keys.push(CacheKey::AllOrders);
            keys.push(CacheKey::MyOrders(user_id));
            keys.push(CacheKey::Order(order_id));
        }

        if self.admin {
            keys.extend(CacheKey::ADMIN_DASHBOARD);
        }

        keys
    }
}

/// Deletes every key the invalidation names before returning, so the
/// caller's response is only sent once stale entries are gone.
pub async fn invalidate_cache(
    cache: &dyn CacheStore,
    invalidation: &Invalidation,
) -> Result<(), AppError> {
    let keys = invalidation.keys();
    if keys.is_empty() {
        return Ok(());
    }

    cache.delete(&keys).await?;
    tracing::debug!(
        "Invalidated cache keys: {}",
        keys.iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(())
}
