use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rently_core::user::Role;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// JWT Claims
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    /// "access" or "refresh"; only access tokens pass protected routes.
    pub token_type: String,
    pub exp: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Authenticated caller, injected into request extensions by the auth
/// middleware.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

pub fn issue_tokens(state: &AppState, user_id: Uuid) -> Result<TokenPair, AppError> {
    let now = Utc::now().timestamp() as usize;
    let key = EncodingKey::from_secret(state.auth.secret.as_bytes());

    let access = encode(
        &Header::default(),
        &Claims {
            sub: user_id.to_string(),
            token_type: "access".to_string(),
            exp: now + state.auth.access_expiration as usize,
        },
        &key,
    )?;
    let refresh = encode(
        &Header::default(),
        &Claims {
            sub: user_id.to_string(),
            token_type: "refresh".to_string(),
            exp: now + state.auth.refresh_expiration as usize,
        },
        &key,
    )?;

    Ok(TokenPair { access_token: access, refresh_token: refresh })
}

fn verify_access_token(state: &AppState, headers: &HeaderMap) -> Result<Uuid, AppError> {
    let auth_header = headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::AuthenticationError("Access token required".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::AuthenticationError("Access token required".to_string()))?;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::AuthenticationError("Invalid or expired token".to_string()))?;

    if token_data.claims.token_type != "access" {
        return Err(AppError::AuthenticationError("Invalid token type".to_string()));
    }

    Uuid::parse_str(&token_data.claims.sub)
        .map_err(|_| AppError::AuthenticationError("Invalid token subject".to_string()))
}

// ============================================================================
// Authentication Middleware
// ============================================================================

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = verify_access_token(&state, req.headers())?;
    req.extensions_mut().insert(AuthUser(user_id));
    Ok(next.run(req).await)
}

// ============================================================================
// Admin Middleware
// ============================================================================

/// Token auth plus a role check against the stored user record.
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = verify_access_token(&state, req.headers())?;

    let user = state
        .store
        .user_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::AuthenticationError("Unknown user".to_string()))?;

    if user.role != Role::Admin {
        return Err(AppError::AuthorizationError("Admin access required".to_string()));
    }

    req.extensions_mut().insert(AuthUser(user_id));
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::rate_limit::RateLimiter;
    use crate::state::AuthConfig;
    use rently_store::MemoryStore;
    use std::sync::Arc;

    fn state() -> AppState {
        AppState {
            store: Arc::new(MemoryStore::new()),
            auth: AuthConfig {
                secret: "unit-secret".to_string(),
                access_expiration: 3600,
                refresh_expiration: 7200,
            },
            rate_limiter: Arc::new(RateLimiter::new(100, 60)),
        }
    }

    // Signs and decodes both tokens end to end, so a broken signing
    // backend fails here rather than on the first live request.
    #[test]
    fn test_issued_pair_signs_and_decodes() {
        let state = state();
        let user_id = Uuid::new_v4();
        let pair = issue_tokens(&state, user_id).unwrap();

        let key = DecodingKey::from_secret(state.auth.secret.as_bytes());
        let access = decode::<Claims>(&pair.access_token, &key, &Validation::default()).unwrap();
        assert_eq!(access.claims.token_type, "access");
        assert_eq!(access.claims.sub, user_id.to_string());

        let refresh = decode::<Claims>(&pair.refresh_token, &key, &Validation::default()).unwrap();
        assert_eq!(refresh.claims.token_type, "refresh");
    }
}
