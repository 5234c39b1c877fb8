use std::io;
use std::sync::Arc;

use actix_web::{middleware, web::Data, App, HttpServer};
use env_logger::Env;
use log::{error, info};

use weather_ingest::app::provider::visual_crossing::VisualCrossingProvider;
use weather_ingest::app::store::firestore::{FirestoreConfig, FirestoreStore};
use weather_ingest::app::store::memory::MemoryStore;
use weather_ingest::app::store::RecordStore;
use weather_ingest::app::WeatherIngestManager;
use weather_ingest::config::{Settings, StoreBackend};
use weather_ingest::web::{self, AppState};

/// Store handle resolved once; each worker builds its client from it.
#[derive(Clone)]
enum StoreTarget {
    Firestore(Arc<FirestoreConfig>),
    Memory(MemoryStore),
}

impl StoreTarget {
    fn build(&self) -> Box<dyn RecordStore> {
        match self {
            StoreTarget::Firestore(config) => Box::new(FirestoreStore::new(config.clone())),
            StoreTarget::Memory(store) => Box::new(store.clone()),
        }
    }
}

fn startup_error(e: impl std::fmt::Display) -> io::Error {
    error!("{}", e);
    io::Error::other(e.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("weather_ingest=info,actix_web=info")).init();

    let settings = Settings::load().map_err(startup_error)?;

    let store = match settings.store.backend {
        StoreBackend::Firestore => {
            StoreTarget::Firestore(Arc::new(FirestoreConfig::load(&settings.store).map_err(startup_error)?))
        }
        StoreBackend::Memory => {
            info!("Using in-memory record store, records are lost on exit");
            StoreTarget::Memory(MemoryStore::new())
        }
    };

    let provider_settings = settings.provider.clone();

    info!("Starting server on {}", settings.server.bind);

    HttpServer::new(move || {
        let manager = WeatherIngestManager::new(
            Box::new(VisualCrossingProvider::new(provider_settings.clone())),
            store.build(),
        );

        App::new()
            .app_data(Data::new(AppState::new(manager)))
            .wrap(middleware::Logger::default())
            .configure(web::configure)
    })
    .bind(&settings.server.bind)?
    .run()
    .await
}
