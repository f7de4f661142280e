//! # Blogicum server
//!
//! HTTP surface over the blog visibility and authorization engine.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod state;
pub mod telemetry;

use std::sync::Arc;

use actix_web::web;
use blogicum_core::ports::{PasswordService, TokenService};

use state::AppState;

/// Everything a worker needs to serve requests.
#[derive(Clone)]
pub struct Services {
    pub state: AppState,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
}

impl Services {
    /// Register shared data and routes on an app.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.state.clone()))
            .app_data(web::Data::new(self.tokens.clone()))
            .app_data(web::Data::new(self.passwords.clone()))
            .configure(handlers::configure_routes);
    }
}
