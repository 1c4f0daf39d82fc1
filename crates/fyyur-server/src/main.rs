use axum::{http::HeaderValue, routing::get, Json, Router};
use fyyur_db::AppState;
use sea_orm_migration::MigratorTrait;
use serde::Serialize;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod api;

#[derive(Serialize)]
struct ApiStatus {
    status: &'static str,
    version: &'static str,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Database connection
    let db_config = fyyur_db::DatabaseConfig::from_env();
    tracing::info!("connecting to database...");
    let db = fyyur_db::connect(&db_config)
        .await
        .expect("failed to connect to database");

    // Run migrations
    tracing::info!("running database migrations...");
    fyyur_migration::Migrator::up(&db, None)
        .await
        .expect("failed to run migrations");
    tracing::info!("migrations complete");

    let state = Arc::new(AppState { db });

    // CORS: the presentation layer may live on another origin
    let cors = {
        let allowed_origins_str = std::env::var("CORS_ORIGINS").unwrap_or_default();
        let origins: Vec<HeaderValue> = allowed_origins_str
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .filter_map(|s| HeaderValue::from_str(s.trim()).ok())
            .collect();
        if origins.is_empty() {
            tracing::warn!("CORS_ORIGINS not set, cross-origin requests will be refused");
        } else {
            tracing::info!("CORS allowed origins: {:?}", origins);
        }
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers(tower_http::cors::Any)
    };

    let app = Router::new()
        .route("/healthz", get(healthz))
        .merge(api::router(state))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            axum::http::header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ));

    let addr = bind_addr();
    tracing::info!(%addr, "server started");

    axum::serve(
        tokio::net::TcpListener::bind(addr)
            .await
            .expect("failed to bind listener"),
        app,
    )
    .await
    .expect("server error");
}

/// `FYYUR_HOST` (default 0.0.0.0) and `PORT` (default 5000).
fn bind_addr() -> SocketAddr {
    let host: IpAddr = std::env::var("FYYUR_HOST")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(IpAddr::from([0, 0, 0, 0]));
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(5000);
    SocketAddr::new(host, port)
}

async fn healthz() -> Json<ApiStatus> {
    Json(ApiStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
