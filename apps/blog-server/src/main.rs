//! # Blogicum Server
//!
//! The main entry point for the Actix-web HTTP server.

use std::sync::Arc;

use actix_web::{App, HttpServer};
use tracing_actix_web::TracingLogger;

use blog_server::Services;
use blog_server::config::AppConfig;
use blog_server::observability::RequestIdMiddleware;
use blog_server::state::AppState;
use blog_server::telemetry::{TelemetryConfig, init_telemetry};
use blogicum_infra::{Argon2PasswordService, JwtTokenService};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let telemetry = TelemetryConfig::from_env();
    init_telemetry(&telemetry);

    let config = AppConfig::from_env();

    tracing::info!(
        service = %telemetry.service_name,
        "Starting Blogicum server on {}:{}",
        config.host,
        config.port
    );

    let services = Services {
        state: AppState::new(&config).await,
        tokens: Arc::new(JwtTokenService::from_env()),
        passwords: Arc::new(Argon2PasswordService::default()),
    };

    HttpServer::new(move || {
        App::new()
            .wrap(RequestIdMiddleware)
            .wrap(TracingLogger::default())
            .configure(|cfg| services.configure(cfg))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
