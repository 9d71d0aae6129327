use std::convert::Infallible;

use axum::{
    extract::{FromRef, OptionalFromRequestParts},
    http::{header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::{
    config::{AppConfig, Env},
    repository::RepositoryState,
};

/// Claims
///
/// Payload of the session JWT issued by the external auth provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the `users.id` of the requester.
    pub sub: i64,
    /// Expiration Time (exp). Always validated.
    pub exp: usize,
    /// Issued At (iat)
    pub iat: usize,
}

/// AuthUser
///
/// The resolved identity of an authenticated request.
///
/// Handlers take it as `Option<AuthUser>`: resolution never rejects a request.
/// A missing, malformed, expired or orphaned credential just means the requester is
/// anonymous, and the Visibility Policy decides what that requester gets.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
}

impl AuthUser {
    /// resolve
    ///
    /// 1. Local bypass: in `Env::Local`, an `x-user-id` header naming an existing user.
    /// 2. `Authorization: Bearer <jwt>` signed with the configured secret.
    /// 3. The subject must still exist in the store.
    pub async fn resolve(parts: &Parts, repo: &RepositoryState, config: &AppConfig) -> Option<Self> {
        if config.env == Env::Local {
            if let Some(user) = Self::from_bypass_header(parts, repo).await {
                return Some(user);
            }
        }
        // Production, or the bypass did not match: standard JWT flow.

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))?;

        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
        let mut validation = Validation::default();
        validation.validate_exp = true;

        let claims = match decode::<Claims>(token, &decoding_key, &validation) {
            Ok(data) => data.claims,
            Err(e) => {
                tracing::debug!("rejected bearer token: {:?}", e.kind());
                return None;
            }
        };

        Self::lookup(repo, claims.sub).await
    }

    async fn from_bypass_header(parts: &Parts, repo: &RepositoryState) -> Option<Self> {
        let user_id = parts
            .headers
            .get("x-user-id")?
            .to_str()
            .ok()?
            .parse::<i64>()
            .ok()?;
        Self::lookup(repo, user_id).await
    }

    async fn lookup(repo: &RepositoryState, user_id: i64) -> Option<Self> {
        match repo.get_user(user_id).await {
            Ok(user) => user.map(|u| AuthUser {
                id: u.id,
                username: u.username,
            }),
            Err(e) => {
                tracing::error!("get_user error: {:?}", e);
                None
            }
        }
    }
}

impl<S> OptionalFromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Option<Self>, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);
        Ok(AuthUser::resolve(parts, &repo, &config).await)
    }
}
