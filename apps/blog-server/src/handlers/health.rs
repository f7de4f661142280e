//! Health check endpoint.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::state::{AppState, StoreKind};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
    pub store: &'static str,
}

/// Health check endpoint - returns server status.
///
/// GET /health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let store = match state.store {
        StoreKind::Postgres => "postgres",
        StoreKind::InMemory => "memory",
    };

    #[cfg(feature = "postgres")]
    if let Some(db) = &state.db {
        if !db.ping().await {
            tracing::error!("Database ping failed");
            return HttpResponse::ServiceUnavailable().json(HealthResponse {
                status: "degraded",
                version: env!("CARGO_PKG_VERSION"),
                timestamp: chrono::Utc::now().to_rfc3339(),
                store,
            });
        }
    }

    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
        store,
    })
}
