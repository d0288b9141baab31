// src/auth.rs
use crate::auth_models::TokenClaims;
use crate::errors::AppError;
use jsonwebtoken::{DecodingKey, TokenData, Validation, decode};

/// Verifies signature and expiry of a bearer token.
pub fn verify_jwt(token: &str, secret: &str) -> Result<TokenData<TokenClaims>, AppError> {
    decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map_err(AppError::from)
}
