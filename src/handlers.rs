// src/handlers.rs
use std::collections::HashMap;

use axum::{
    Json,
    extract::{Multipart, Query, State},
    http::StatusCode,
};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::auth_models::TokenClaims;
use crate::cloudinary::ImageUpload;
use crate::errors::AppError;
use crate::extractor::{AppJson, AppPath};
use crate::filters::ListingParams;
use crate::models::{NewOrderPayload, NewReviewPayload};
use crate::pagination::PaginatedProductsResponse;
use crate::review_service::ReviewOutcome;
use crate::state::AppState;
use crate::{dashboard_service, order_service, product_service, review_service};

const PHOTO_FIELD: &str = "photos";

fn message(text: &str) -> Json<Value> {
    Json(json!({ "success": true, "message": text }))
}

/// Splits a multipart body into text fields and `photos` file parts.
async fn read_product_form(
    mut multipart: Multipart,
) -> Result<(HashMap<String, String>, Vec<ImageUpload>), AppError> {
    let mut fields = HashMap::new();
    let mut images = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            tracing::warn!("Skipping multipart field without a name");
            continue;
        };

        if name == PHOTO_FIELD {
            let filename = field
                .file_name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("photo-{}.jpg", images.len()));
            let bytes = field.bytes().await?;
            if bytes.is_empty() {
                tracing::warn!("Skipping empty photo part '{}'", filename);
                continue;
            }
            tracing::debug!("Received photo '{}' ({} bytes)", filename, bytes.len());
            images.push(ImageUpload {
                filename,
                bytes: bytes.to_vec(),
            });
        } else {
            let value = field.text().await?;
            fields.insert(name, value);
        }
    }

    Ok((fields, images))
}

pub async fn latest_products_handler(
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let products = product_service::latest_products(&state).await?;
    Ok(Json(json!({ "success": true, "products": products })))
}

pub async fn categories_handler(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let categories = product_service::all_categories(&state).await?;
    Ok(Json(json!({ "success": true, "categories": categories })))
}

pub async fn admin_products_handler(
    State(state): State<AppState>,
    claims: TokenClaims,
) -> Result<Json<Value>, AppError> {
    claims.require_admin()?;
    let products = product_service::admin_products(&state).await?;
    Ok(Json(json!({ "success": true, "products": products })))
}

pub async fn search_products_handler(
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> Result<Json<PaginatedProductsResponse>, AppError> {
    tracing::info!("GET /api/v1/product/all with {:?}", params);
    let page = product_service::search_products(&state, params).await?;
    Ok(Json(PaginatedProductsResponse {
        success: true,
        products: page.products,
        total_page: page.total_page,
    }))
}

pub async fn create_product_handler(
    State(state): State<AppState>,
    claims: TokenClaims,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), AppError> {
    claims.require_admin()?;
    let (fields, images) = read_product_form(multipart).await?;
    product_service::create_product(&state, fields, images).await?;
    Ok((StatusCode::CREATED, message("Product Created Successfully")))
}

pub async fn single_product_handler(
    State(state): State<AppState>,
    AppPath(product_id): AppPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    let product = product_service::single_product(&state, product_id).await?;
    Ok(Json(json!({ "success": true, "product": product })))
}

pub async fn update_product_handler(
    State(state): State<AppState>,
    claims: TokenClaims,
    AppPath(product_id): AppPath<Uuid>,
    multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    claims.require_admin()?;
    let (fields, images) = read_product_form(multipart).await?;
    product_service::update_product(&state, product_id, fields, images).await?;
    Ok(message("Product Updated Successfully"))
}

pub async fn delete_product_handler(
    State(state): State<AppState>,
    claims: TokenClaims,
    AppPath(product_id): AppPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    claims.require_admin()?;
    product_service::delete_product(&state, product_id).await?;
    Ok(message("Product Deleted Successfully"))
}

pub async fn product_reviews_handler(
    State(state): State<AppState>,
    AppPath(product_id): AppPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    let reviews = review_service::product_reviews(&state, product_id).await?;
    Ok(Json(json!({ "success": true, "reviews": reviews })))
}

pub async fn new_review_handler(
    State(state): State<AppState>,
    claims: TokenClaims,
    AppPath(product_id): AppPath<Uuid>,
    AppJson(payload): AppJson<NewReviewPayload>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let (_, outcome) = review_service::new_review(&state, claims.sub, product_id, payload).await?;
    Ok(match outcome {
        ReviewOutcome::Added => (StatusCode::CREATED, message("Review Added")),
        ReviewOutcome::Updated => (StatusCode::OK, message("Review Updated")),
    })
}

pub async fn delete_review_handler(
    State(state): State<AppState>,
    claims: TokenClaims,
    AppPath(review_id): AppPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    review_service::delete_review(&state, claims.sub, review_id).await?;
    Ok(message("Review Deleted"))
}

pub async fn new_order_handler(
    State(state): State<AppState>,
    claims: TokenClaims,
    AppJson(payload): AppJson<NewOrderPayload>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    order_service::new_order(&state, claims.sub, payload).await?;
    Ok((StatusCode::CREATED, message("Order Placed Successfully")))
}

pub async fn my_orders_handler(
    State(state): State<AppState>,
    claims: TokenClaims,
) -> Result<Json<Value>, AppError> {
    let orders = order_service::my_orders(&state, claims.sub).await?;
    Ok(Json(json!({ "success": true, "orders": orders })))
}

pub async fn all_orders_handler(
    State(state): State<AppState>,
    claims: TokenClaims,
) -> Result<Json<Value>, AppError> {
    claims.require_admin()?;
    let orders = order_service::all_orders(&state).await?;
    Ok(Json(json!({ "success": true, "orders": orders })))
}

pub async fn single_order_handler(
    State(state): State<AppState>,
    claims: TokenClaims,
    AppPath(order_id): AppPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    let order = order_service::single_order(&state, &claims, order_id).await?;
    Ok(Json(json!({ "success": true, "order": order })))
}

pub async fn process_order_handler(
    State(state): State<AppState>,
    claims: TokenClaims,
    AppPath(order_id): AppPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    claims.require_admin()?;
    order_service::process_order(&state, order_id).await?;
    Ok(message("Order Processed Successfully"))
}

pub async fn delete_order_handler(
    State(state): State<AppState>,
    claims: TokenClaims,
    AppPath(order_id): AppPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    claims.require_admin()?;
    order_service::delete_order(&state, order_id).await?;
    Ok(message("Order Deleted Successfully"))
}

pub async fn dashboard_stats_handler(
    State(state): State<AppState>,
    claims: TokenClaims,
) -> Result<Json<Value>, AppError> {
    claims.require_admin()?;
    let stats = dashboard_service::dashboard_stats(&state).await?;
    Ok(Json(json!({ "success": true, "stats": stats })))
}

pub async fn pie_charts_handler(
    State(state): State<AppState>,
    claims: TokenClaims,
) -> Result<Json<Value>, AppError> {
    claims.require_admin()?;
    let charts = dashboard_service::pie_charts(&state).await?;
    Ok(Json(json!({ "success": true, "charts": charts })))
}

pub async fn bar_charts_handler(
    State(state): State<AppState>,
    claims: TokenClaims,
) -> Result<Json<Value>, AppError> {
    claims.require_admin()?;
    let charts = dashboard_service::bar_charts(&state).await?;
    Ok(Json(json!({ "success": true, "charts": charts })))
}

pub async fn line_charts_handler(
    State(state): State<AppState>,
    claims: TokenClaims,
) -> Result<Json<Value>, AppError> {
    claims.require_admin()?;
    let charts = dashboard_service::line_charts(&state).await?;
    Ok(Json(json!({ "success": true, "charts": charts })))
}
