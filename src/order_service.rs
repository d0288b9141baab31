// src/order_service.rs

use chrono::Utc;
use uuid::Uuid;

use crate::auth_models::TokenClaims;
use crate::cache::{CacheKey, Invalidation, cached, invalidate_cache};
use crate::errors::AppError;
use crate::models::{NewOrderPayload, Order};
use crate::product_service::reduce_stock;
use crate::state::AppState;

/// Inserts the order, then decrements stock item by item.
///
/// The order row is written first and is not rolled back when a stock
/// decrement fails. Caches are cleared either way, since some decrements may
/// already have landed.
pub async fn new_order(
    state: &AppState,
    user: Uuid,
    payload: NewOrderPayload,
) -> Result<Order, AppError> {
    let order = payload.into_order(user)?;
    state.orders.insert(&order).await?;

    let items: Vec<(Uuid, i64)> = order
        .order_items
        .iter()
        .map(|item| (item.product_id, item.quantity))
        .collect();
    let reduced = reduce_stock(state.products.as_ref(), &items).await;

    invalidate_cache(
        state.cache.as_ref(),
        &Invalidation::new()
            .product_ids(items.iter().map(|(id, _)| *id))
            .order(user, order.id)
            .admin(),
    )
    .await?;

    if let Err(e) = reduced {
        tracing::error!("Stock update failed for order {}: {:?}", order.id, e);
        return Err(e);
    }

    tracing::info!("Placed order {} for user {}", order.id, user);
    Ok(order)
}

pub async fn my_orders(state: &AppState, user: Uuid) -> Result<Vec<Order>, AppError> {
    cached(state.cache.as_ref(), CacheKey::MyOrders(user), || async {
        state.orders.by_user(user).await
    })
    .await
}

pub async fn all_orders(state: &AppState) -> Result<Vec<Order>, AppError> {
    cached(state.cache.as_ref(), CacheKey::AllOrders, || async {
        state.orders.all().await
    })
    .await
}

/// Visible to the user who placed it and to admins.
pub async fn single_order(
    state: &AppState,
    claims: &TokenClaims,
    order_id: Uuid,
) -> Result<Order, AppError> {
    let order = cached(state.cache.as_ref(), CacheKey::Order(order_id), || async {
        state
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(AppError::order_not_found)
    })
    .await?;

    if order.user != claims.sub && !claims.is_admin() {
        tracing::warn!("User {} tried to read order {}", claims.sub, order_id);
        return Err(AppError::UnauthorizedAccess(
            "You are not allowed to access this resource".to_string(),
        ));
    }
    Ok(order)
}

pub async fn process_order(state: &AppState, order_id: Uuid) -> Result<Order, AppError> {
    let mut order = state
        .orders
        .find_by_id(order_id)
        .await?
        .ok_or_else(AppError::order_not_found)?;

    let previous = order.status;
    order.status = previous.next();
    order.updated_at = Utc::now();
    state.orders.save(&order).await?;

    invalidate_cache(
        state.cache.as_ref(),
        &Invalidation::new().order(order.user, order.id).admin(),
    )
    .await?;

    tracing::info!("Order {} moved from {} to {}", order.id, previous, order.status);
    Ok(order)
}

pub async fn delete_order(state: &AppState, order_id: Uuid) -> Result<(), AppError> {
    let order = state
        .orders
        .find_by_id(order_id)
        .await?
        .ok_or_else(AppError::order_not_found)?;

    state.orders.delete(order.id).await?;

    invalidate_cache(
        state.cache.as_ref(),
        &Invalidation::new().order(order.user, order.id).admin(),
    )
    .await?;

    tracing::info!("Deleted order {}", order.id);
    Ok(())
}
