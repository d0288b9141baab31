// src/routes.rs

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    routing::{delete, get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::*;
use crate::state::AppState;

const BODY_LIMIT_BYTES: usize = 100 * 1024 * 1024;

/// Routes under `/api/v1`. CORS is layered on by the caller.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/product/latest", get(latest_products_handler))
        .route("/api/v1/product/categories", get(categories_handler))
        .route("/api/v1/product/admin-products", get(admin_products_handler))
        .route("/api/v1/product/all", get(search_products_handler))
        .route("/api/v1/product/new", post(create_product_handler))
        .route(
            "/api/v1/product/{id}",
            get(single_product_handler)
                .put(update_product_handler)
                .delete(delete_product_handler),
        )
        .route("/api/v1/product/reviews/{id}", get(product_reviews_handler))
        .route("/api/v1/product/review/new/{id}", post(new_review_handler))
        .route("/api/v1/product/review/{id}", delete(delete_review_handler))
        .route("/api/v1/order/new", post(new_order_handler))
        .route("/api/v1/order/my", get(my_orders_handler))
        .route("/api/v1/order/all", get(all_orders_handler))
        .route(
            "/api/v1/order/{id}",
            get(single_order_handler)
                .put(process_order_handler)
                .delete(delete_order_handler),
        )
        .route("/api/v1/dashboard/stats", get(dashboard_stats_handler))
        .route("/api/v1/dashboard/pie", get(pie_charts_handler))
        .route("/api/v1/dashboard/bar", get(bar_charts_handler))
        .route("/api/v1/dashboard/line", get(line_charts_handler))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .with_state(state)
}

/// Allows only the storefront origin when one is configured, any origin
/// otherwise.
pub fn cors_layer(frontend_url: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    match frontend_url.and_then(|url| HeaderValue::from_str(url).ok()) {
        Some(origin) => layer.allow_origin(origin),
        None => {
            tracing::warn!("FRONTEND_URL not set, allowing any origin");
            layer.allow_origin(Any)
        }
    }
}
