// src/review_service.rs

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::cache::{CacheKey, Invalidation, cached, invalidate_cache};
use crate::errors::AppError;
use crate::models::{NewReviewPayload, Review};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    Added,
    Updated,
}

/// `(ratings, numOfReviews)` for a product: floor of the mean, 0 when empty.
pub fn rating_summary(reviews: &[Review]) -> (i32, i32) {
    if reviews.is_empty() {
        return (0, 0);
    }
    let count = reviews.len() as i32;
    let total: i32 = reviews.iter().map(|r| r.rating).sum();
    (total / count, count)
}

async fn refresh_product_rating(state: &AppState, product_id: Uuid) -> Result<(), AppError> {
    let reviews = state.reviews.by_product(product_id).await?;
    let Some(mut product) = state.products.find_by_id(product_id).await? else {
        return Ok(());
    };

    let (ratings, num_of_reviews) = rating_summary(&reviews);
    product.ratings = ratings;
    product.num_of_reviews = num_of_reviews;
    product.updated_at = Utc::now();
    state.products.save(&product).await
}

async fn invalidate_review_views(state: &AppState, product_id: Uuid) -> Result<(), AppError> {
    invalidate_cache(
        state.cache.as_ref(),
        &Invalidation::new()
            .review(product_id)
            .product(product_id)
            .admin(),
    )
    .await
}

/// One review per (user, product): a second write replaces the first.
pub async fn new_review(
    state: &AppState,
    user: Uuid,
    product_id: Uuid,
    payload: NewReviewPayload,
) -> Result<(Review, ReviewOutcome), AppError> {
    payload.validate()?;

    if state.products.find_by_id(product_id).await?.is_none() {
        return Err(AppError::product_not_found());
    }

    let now = Utc::now();
    let (review, outcome) = match state
        .reviews
        .find_by_user_and_product(user, product_id)
        .await?
    {
        Some(mut existing) => {
            existing.comment = payload.comment;
            existing.rating = payload.rating;
            existing.updated_at = now;
            state.reviews.save(&existing).await?;
            (existing, ReviewOutcome::Updated)
        }
        None => {
            let review = Review {
                id: Uuid::new_v4(),
                comment: payload.comment,
                rating: payload.rating,
                user,
                product: product_id,
                created_at: now,
                updated_at: now,
            };
            state.reviews.insert(&review).await?;
            (review, ReviewOutcome::Added)
        }
    };

    refresh_product_rating(state, product_id).await?;
    invalidate_review_views(state, product_id).await?;

    tracing::info!("Review {} {:?} on product {}", review.id, outcome, product_id);
    Ok((review, outcome))
}

pub async fn delete_review(state: &AppState, user: Uuid, review_id: Uuid) -> Result<(), AppError> {
    let review = state
        .reviews
        .find_by_id(review_id)
        .await?
        .ok_or_else(AppError::review_not_found)?;

    if review.user != user {
        tracing::warn!("User {} tried to delete review {}", user, review_id);
        return Err(AppError::UnauthorizedAccess("Not Authorized".to_string()));
    }

    state.reviews.delete(review.id).await?;
    refresh_product_rating(state, review.product).await?;
    invalidate_review_views(state, review.product).await?;

    tracing::info!("Deleted review {}", review.id);
    Ok(())
}

pub async fn product_reviews(state: &AppState, product_id: Uuid) -> Result<Vec<Review>, AppError> {
    cached(state.cache.as_ref(), CacheKey::Reviews(product_id), || async {
        state.reviews.by_product(product_id).await
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Product;
    use crate::testing::{TestContext, product, test_context};

    fn payload(rating: i32, comment: &str) -> NewReviewPayload {
        NewReviewPayload {
            comment: comment.to_string(),
            rating,
        }
    }

    async fn seeded() -> (TestContext, Product) {
        let ctx = test_context();
        let p = product("Novel", 12, 4, "books", 0);
        ctx.state.products.insert(&p).await.unwrap();
        (ctx, p)
    }

    async fn stored(ctx: &TestContext, id: Uuid) -> Product {
        ctx.state.products.find_by_id(id).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn ratings_are_floor_of_mean() {
        let (ctx, p) = seeded().await;
        new_review(&ctx.state, Uuid::new_v4(), p.id, payload(5, "great"))
            .await
            .unwrap();
        new_review(&ctx.state, Uuid::new_v4(), p.id, payload(4, "good"))
            .await
            .unwrap();

        let product = stored(&ctx, p.id).await;
        assert_eq!(product.ratings, 4);
        assert_eq!(product.num_of_reviews, 2);
    }

    #[tokio::test]
    async fn second_review_by_same_user_replaces_first() {
        let (ctx, p) = seeded().await;
        let user = Uuid::new_v4();

        let (first, outcome) = new_review(&ctx.state, user, p.id, payload(1, "meh"))
            .await
            .unwrap();
        assert_eq!(outcome, ReviewOutcome::Added);

        let (second, outcome) = new_review(&ctx.state, user, p.id, payload(5, "grew on me"))
            .await
            .unwrap();
        assert_eq!(outcome, ReviewOutcome::Updated);
        assert_eq!(first.id, second.id);

        let reviews = product_reviews(&ctx.state, p.id).await.unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].comment, "grew on me");
        let product = stored(&ctx, p.id).await;
        assert_eq!((product.ratings, product.num_of_reviews), (5, 1));
    }

    #[tokio::test]
    async fn review_list_cache_is_cleared_on_write() {
        let (ctx, p) = seeded().await;
        assert!(product_reviews(&ctx.state, p.id).await.unwrap().is_empty());

        new_review(&ctx.state, Uuid::new_v4(), p.id, payload(3, "fine"))
            .await
            .unwrap();

        assert_eq!(product_reviews(&ctx.state, p.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn review_of_unknown_product_is_not_found() {
        let ctx = test_context();
        let err = new_review(&ctx.state, Uuid::new_v4(), Uuid::new_v4(), payload(3, "?"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(msg) if msg == "Product Not Found"));
    }

    #[tokio::test]
    async fn out_of_range_rating_is_rejected() {
        let (ctx, p) = seeded().await;
        let err = new_review(&ctx.state, Uuid::new_v4(), p.id, payload(6, "wow"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn only_author_can_delete() {
        let (ctx, p) = seeded().await;
        let author = Uuid::new_v4();
        let (review, _) = new_review(&ctx.state, author, p.id, payload(2, "hmm"))
            .await
            .unwrap();

        let err = delete_review(&ctx.state, Uuid::new_v4(), review.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnauthorizedAccess(_)));

        delete_review(&ctx.state, author, review.id).await.unwrap();
        let product = stored(&ctx, p.id).await;
        assert_eq!((product.ratings, product.num_of_reviews), (0, 0));
    }

    #[tokio::test]
    async fn deleting_missing_review_is_not_found() {
        let ctx = test_context();
        let err = delete_review(&ctx.state, Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
