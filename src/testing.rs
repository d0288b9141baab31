// src/testing.rs
//
// Fakes and fixtures shared by the unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use crate::auth_models::{Role, TokenClaims};
use crate::cache::MemoryCache;
use crate::cloudinary::{ImageUpload, MediaHost};
use crate::errors::AppError;
use crate::models::{Photo, Product};
use crate::state::AppState;
use crate::store::memory::MemoryStore;

pub const TEST_JWT_SECRET: &str = "test-secret";

#[derive(Default)]
pub struct FakeMediaHost {
    uploads: AtomicUsize,
    destroyed: Mutex<Vec<String>>,
    fail_uploads: AtomicBool,
}

impl FakeMediaHost {
    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    pub fn destroyed(&self) -> Vec<String> {
        self.destroyed.lock().unwrap().clone()
    }

    pub fn fail_uploads(&self) {
        self.fail_uploads.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl MediaHost for FakeMediaHost {
    async fn upload(&self, image: ImageUpload) -> Result<Photo, AppError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(AppError::UpstreamError(
                "Failed to upload photos".to_string(),
            ));
        }
        let n = self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(Photo {
            public_id: format!("products/{}-{}", n, image.filename),
            url: format!("https://media.test/products/{}-{}", n, image.filename),
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), AppError> {
        self.destroyed.lock().unwrap().push(public_id.to_string());
        Ok(())
    }
}

pub struct TestContext {
    pub state: AppState,
    pub cache: Arc<MemoryCache>,
    pub media: Arc<FakeMediaHost>,
}

pub fn test_context() -> TestContext {
    test_context_with_page_size(8)
}

pub fn test_context_with_page_size(products_per_page: i64) -> TestContext {
    let store = Arc::new(MemoryStore::new());
    let cache = Arc::new(MemoryCache::new(1_000));
    let media = Arc::new(FakeMediaHost::default());

    let state = AppState {
        cache: cache.clone(),
        products: store.clone(),
        orders: store.clone(),
        reviews: store,
        media: media.clone(),
        jwt_secret: TEST_JWT_SECRET.to_string(),
        products_per_page,
    };

    TestContext {
        state,
        cache,
        media,
    }
}

pub fn token_for(user: Uuid, role: Role, secret: &str) -> String {
    let now = Utc::now();
    let claims = TokenClaims {
        sub: user,
        role,
        exp: (now + Duration::hours(1)).timestamp(),
        iat: now.timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .unwrap()
}

pub fn claims(user: Uuid, role: Role) -> TokenClaims {
    let now = Utc::now();
    TokenClaims {
        sub: user,
        role,
        exp: (now + Duration::hours(1)).timestamp(),
        iat: now.timestamp(),
    }
}

/// Product created `age_minutes` ago, so tests can control ordering.
pub fn product(name: &str, price: i64, stock: i64, category: &str, age_minutes: i64) -> Product {
    let created_at = Utc::now() - Duration::minutes(age_minutes);
    Product {
        id: Uuid::new_v4(),
        name: name.to_string(),
        price,
        stock,
        category: category.to_string(),
        description: format!("{} description", name),
        photos: vec![Photo {
            public_id: format!("products/{}", name),
            url: format!("https://media.test/products/{}", name),
        }],
        ratings: 0,
        num_of_reviews: 0,
        created_at,
        updated_at: created_at,
    }
}

pub fn image(name: &str) -> ImageUpload {
    ImageUpload {
        filename: name.to_string(),
        bytes: vec![0xFF, 0xD8, 0xFF],
    }
}
