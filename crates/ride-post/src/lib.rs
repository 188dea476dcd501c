pub mod composer;
pub mod config;
pub mod errors;
pub mod geo_utils;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod route_source;
pub mod service;
pub mod settings;
pub mod sunset;

use std::sync::Arc;

use axum::{
    Extension, Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
};

use crate::{
    config::Config,
    handlers::{create_announcement, get_form_options, health_check},
    route_source::HttpRouteSource,
    service::AnnouncementService,
    sunset::SunriseSunsetClient,
};

pub fn create_router(service: AnnouncementService) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
        .allow_origin(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/options", get(get_form_options))
        .route("/announcements", post(create_announcement))
        .layer(Extension(service))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
}

/// Wires the HTTP adapters from `config` into a service.
pub fn build_service(config: &Config) -> AnnouncementService {
    AnnouncementService::new(
        Arc::new(HttpRouteSource::new(
            config.route_api_url.clone(),
            config.http_timeout,
        )),
        Arc::new(SunriseSunsetClient::new(
            config.sunset_api_url.clone(),
            config.http_timeout,
        )),
        Arc::new(config.settings.clone()),
    )
}

pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let app = create_router(build_service(&config));

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    tracing::info!("Server running on http://0.0.0.0:{}", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
