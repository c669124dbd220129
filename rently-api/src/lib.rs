use axum::{http::Method, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod admin;
pub mod auth;
pub mod bookings;
pub mod error;
pub mod items;
pub mod middleware;
pub mod state;

pub use state::AppState;

use crate::middleware::auth::{admin_auth_middleware, auth_middleware};
use crate::middleware::rate_limit::rate_limit_middleware;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let protected = Router::new()
        .merge(auth::protected_routes())
        .merge(items::protected_routes())
        .merge(bookings::routes())
        .layer(axum::middleware::from_fn_with_state(state.clone(), auth_middleware));

    let admin = admin::routes().layer(axum::middleware::from_fn_with_state(
        state.clone(),
        admin_auth_middleware,
    ));

    Router::new()
        .merge(auth::routes())
        .merge(items::routes())
        .merge(protected)
        .nest("/api/admin", admin)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn_with_state(state.clone(), rate_limit_middleware))
        .with_state(state)
}
