use std::net::SocketAddr;
use std::sync::Arc;

use rently_api::middleware::rate_limit::RateLimiter;
use rently_api::state::{AppState, AuthConfig};
use rently_api::app;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rently_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = rently_store::Config::load().expect("Failed to load config");
    tracing::info!("Starting Rently API on port {}", config.server.port);

    let store = rently_store::build_store(&config)
        .await
        .expect("Failed to initialize store");

    let app_state = AppState {
        store,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            access_expiration: config.auth.access_expiration_seconds,
            refresh_expiration: config.auth.refresh_expiration_seconds,
        },
        rate_limiter: Arc::new(RateLimiter::new(
            config.rate_limit.max_requests,
            config.rate_limit.window_seconds,
        )),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}
