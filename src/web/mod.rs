use actix_web::web::{get, post, resource, ServiceConfig};

use crate::app::WeatherIngestManager;

pub mod action;
pub mod error;

/// Per-worker state handed to every action.
pub struct AppState {
    pub manager: WeatherIngestManager,
}

impl AppState {
    pub fn new(manager: WeatherIngestManager) -> Self {
        AppState { manager }
    }
}

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        resource("/")
            .route(post().to(action::ingest::handle))
            .route(get().to(action::listing::handle)),
    );
}
