use std::sync::Arc;

use rently_core::Store;

use crate::middleware::rate_limit::RateLimiter;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub access_expiration: u64,
    pub refresh_expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub auth: AuthConfig,
    pub rate_limiter: Arc<RateLimiter>,
}
