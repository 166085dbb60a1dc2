//! Caller identity: resolves the bearer token on every `/api` request to a stored user.
//!
//! Token issuance lives with the external identity provider; this service only checks
//! session tokens that are already recorded in `user_sessions`.

use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::errors::AppError;
use crate::jobs::models::UserRow;
use crate::jobs::store::PgStore;
use crate::state::AppState;

#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// `Ok(None)` for an unknown or expired token.
    async fn resolve(&self, token: &str) -> Result<Option<UserRow>, sqlx::Error>;
}

#[async_trait]
impl IdentityResolver for PgStore {
    async fn resolve(&self, token: &str) -> Result<Option<UserRow>, sqlx::Error> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.* FROM users u
            JOIN user_sessions s ON s.user_id = u.id
            WHERE s.token = $1 AND s.expires_at > now()
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
    }
}

/// The authenticated caller, inserted into request extensions by [`require_user`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserRow);

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

pub async fn require_user(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .map(str::to_owned);

    let Some(token) = token else {
        warn!("Missing bearer token, request denied");
        return Err(AppError::Unauthorized);
    };

    let Some(user) = state.identity.resolve(&token).await? else {
        warn!("Invalid or expired token, request denied");
        return Err(AppError::Unauthorized);
    };

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}
