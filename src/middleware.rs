// src/middleware.rs
use axum::{RequestPartsExt, extract::FromRequestParts, http::request::Parts};
use axum_extra::TypedHeader;
use axum_extra::headers::{Authorization, authorization::Bearer};

use crate::{auth::verify_jwt, auth_models::TokenClaims, errors::AppError, state::AppState};

impl FromRequestParts<AppState> for TokenClaims {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Bearer header first; its absence is a login prompt, not a bad token
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|e| {
                tracing::warn!("Failed to extract Bearer token header: {:?}", e);
                AppError::MissingToken("Please login first".into())
            })?;

        // Signature and expiry
        let claims = verify_jwt(bearer.token(), &state.jwt_secret).map_err(|e| {
            tracing::warn!("Rejected bearer token: {:?}", e);
            e
        })?;

        Ok(claims.claims)
    }
}
