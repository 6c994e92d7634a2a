use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};

use tripsplit::config::{Settings, StorageBackend};
use tripsplit::repository::{MemoryStore, MongoStore};
use tripsplit::service::TripService;
use tripsplit::{api, telemetry};

async fn build_service(storage: &StorageBackend) -> io::Result<TripService> {
    match storage {
        StorageBackend::Mongo { uri, database } => {
            let store = MongoStore::connect(uri, database)
                .await
                .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
            tracing::info!(database = %database, "MongoDB client ready");
            Ok(TripService::with_store(Arc::new(store)))
        }
        StorageBackend::Memory => {
            tracing::warn!("using in-memory storage, data is lost on exit");
            Ok(TripService::with_store(Arc::new(MemoryStore::new())))
        }
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    telemetry::init();

    let settings = Settings::from_env()
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
    let service = web::Data::new(build_service(&settings.storage).await?);

    tracing::info!(host = %settings.host, port = settings.port, "starting server");
    HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .wrap(Cors::permissive())
            .wrap(middleware::Logger::default())
            .configure(api::configure)
    })
    .bind((settings.host.as_str(), settings.port))?
    .run()
    .await
}
