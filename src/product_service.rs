// src/product_service.rs

use std::collections::HashMap;

use chrono::Utc;
use futures::future::try_join_all;
use uuid::Uuid;
use validator::Validate;

use crate::cache::{CacheKey, Invalidation, cached, invalidate_cache};
use crate::cloudinary::ImageUpload;
use crate::errors::AppError;
use crate::filters::ListingParams;
use crate::models::{MAX_PHOTOS, MIN_PHOTOS, Photo, Product, ProductChanges, ProductDraft};
use crate::pagination::total_pages;
use crate::state::AppState;
use crate::store::ProductStore;

pub const LATEST_PRODUCTS_LIMIT: i64 = 5;

pub struct CatalogPage {
    pub products: Vec<Product>,
    pub total_page: i64,
}

pub async fn latest_products(state: &AppState) -> Result<Vec<Product>, AppError> {
    cached(state.cache.as_ref(), CacheKey::LatestProducts, || async {
        state.products.latest(LATEST_PRODUCTS_LIMIT).await
    })
    .await
}

pub async fn all_categories(state: &AppState) -> Result<Vec<String>, AppError> {
    cached(state.cache.as_ref(), CacheKey::Categories, || async {
        state.products.categories().await
    })
    .await
}

pub async fn admin_products(state: &AppState) -> Result<Vec<Product>, AppError> {
    cached(state.cache.as_ref(), CacheKey::AllProducts, || async {
        state.products.all().await
    })
    .await
}

/// A missing product is reported as not found and leaves the cache alone.
pub async fn single_product(state: &AppState, product_id: Uuid) -> Result<Product, AppError> {
    cached(state.cache.as_ref(), CacheKey::Product(product_id), || async {
        state
            .products
            .find_by_id(product_id)
            .await?
            .ok_or_else(|| {
                tracing::warn!("Product not found: {}", product_id);
                AppError::product_not_found()
            })
    })
    .await
}

/// Filtered page of the catalog plus the page count for the same filter.
/// Not cached: the parameter space is open-ended.
pub async fn search_products(
    state: &AppState,
    params: ListingParams,
) -> Result<CatalogPage, AppError> {
    let query = params.into_query(state.products_per_page);

    let (products, total_items) = tokio::try_join!(
        state.products.search(&query),
        state.products.count(&query.filter),
    )?;

    Ok(CatalogPage {
        products,
        total_page: total_pages(total_items, query.limit),
    })
}

fn check_photo_count(count: usize) -> Result<(), AppError> {
    if count < MIN_PHOTOS {
        return Err(AppError::BadRequest(
            "Please add atleast one Photo".to_string(),
        ));
    }
    if count > MAX_PHOTOS {
        return Err(AppError::BadRequest(format!(
            "You can only upload {} Photos",
            MAX_PHOTOS
        )));
    }
    Ok(())
}

async fn upload_photos(
    state: &AppState,
    images: Vec<ImageUpload>,
) -> Result<Vec<Photo>, AppError> {
    let uploads = images.into_iter().map(|image| state.media.upload(image));
    try_join_all(uploads).await.map_err(|e| {
        tracing::error!("Photo upload failed: {:?}", e);
        AppError::UpstreamError("Failed to upload photos".to_string())
    })
}

async fn destroy_photos(state: &AppState, photos: &[Photo]) -> Result<(), AppError> {
    let deletions = photos
        .iter()
        .map(|photo| state.media.destroy(&photo.public_id));
    try_join_all(deletions).await?;
    Ok(())
}

/// Photo count is checked before anything else so a bad request never
/// reaches the media host or the store.
pub async fn create_product(
    state: &AppState,
    fields: HashMap<String, String>,
    images: Vec<ImageUpload>,
) -> Result<Product, AppError> {
    check_photo_count(images.len())?;

    let draft = ProductDraft::from_fields(&fields)?;
    draft.validate()?;

    let photos = upload_photos(state, images).await?;
    tracing::info!("Uploaded {} photos for new product '{}'", photos.len(), draft.name);

    let now = Utc::now();
    let product = Product {
        id: Uuid::new_v4(),
        name: draft.name,
        price: draft.price,
        stock: draft.stock,
        category: draft.category,
        description: draft.description,
        photos,
        ratings: 0,
        num_of_reviews: 0,
        created_at: now,
        updated_at: now,
    };
    state.products.insert(&product).await?;

    invalidate_cache(
        state.cache.as_ref(),
        &Invalidation::new().products().admin(),
    )
    .await?;

    tracing::info!("Created product {}", product.id);
    Ok(product)
}

/// New photos, when sent, replace the old set. They are uploaded before the
/// old ones are destroyed so a failed upload leaves the product intact.
pub async fn update_product(
    state: &AppState,
    product_id: Uuid,
    fields: HashMap<String, String>,
    images: Vec<ImageUpload>,
) -> Result<Product, AppError> {
    let mut product = state
        .products
        .find_by_id(product_id)
        .await?
        .ok_or_else(AppError::product_not_found)?;

    let changes = ProductChanges::from_fields(&fields)?;
    changes.validate()?;

    if !images.is_empty() {
        check_photo_count(images.len())?;
        let new_photos = upload_photos(state, images).await?;
        destroy_photos(state, &product.photos).await?;
        product.photos = new_photos;
    }

    changes.apply_to(&mut product);
    product.updated_at = Utc::now();
    state.products.save(&product).await?;

    invalidate_cache(
        state.cache.as_ref(),
        &Invalidation::new().product(product.id).admin(),
    )
    .await?;

    tracing::info!("Updated product {}", product.id);
    Ok(product)
}

pub async fn delete_product(state: &AppState, product_id: Uuid) -> Result<(), AppError> {
    let product = state
        .products
        .find_by_id(product_id)
        .await?
        .ok_or_else(AppError::product_not_found)?;

    destroy_photos(state, &product.photos).await?;
    state.products.delete(product.id).await?;

    // Reviews go with the product, so their cached list goes too.
    invalidate_cache(
        state.cache.as_ref(),
        &Invalidation::new()
            .product(product.id)
            .review(product.id)
            .admin(),
    )
    .await?;

    tracing::info!("Deleted product {}", product.id);
    Ok(())
}

/// Applies `(product_id, quantity)` decrements in order. There is no
/// transaction: when an item fails, the items before it stay decremented.
pub async fn reduce_stock(
    products: &dyn ProductStore,
    items: &[(Uuid, i64)],
) -> Result<(), AppError> {
    for &(product_id, quantity) in items {
        let mut product = products
            .find_by_id(product_id)
            .await?
            .ok_or_else(AppError::product_not_found)?;

        let remaining = product.stock - quantity;
        if remaining < 0 {
            tracing::warn!(
                "Insufficient stock for product {}: have {}, need {}",
                product.id,
                product.stock,
                quantity
            );
            return Err(AppError::BadRequest(format!(
                "Insufficient stock for {}",
                product.name
            )));
        }

        product.stock = remaining;
        product.updated_at = Utc::now();
        products.save(&product).await?;
    }
    Ok(())
}
