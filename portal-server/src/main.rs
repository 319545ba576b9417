mod config;
mod db;
mod http;
mod logging;

use crate::config::PortalServerConfig;
use crate::db::data_service::{open_data_service_db, SqliteDataService};
use crate::db::local_storage::{open_local_storage_db, SqliteLocalStorage};
use crate::http::client::ClientKeys;
use crate::http::{create_portal_router, PortalState};
use crate::logging::initialize_log;
use goldportal::portal::PortalSettings;
use log::{info, warn};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
    initialize_log();

    let config = match PortalServerConfig::load() {
        Err(err) => panic!("Failed to load config: {err}"),
        Ok(config) => config,
    };

    if config.owner().is_none() {
        warn!("No owner credential configured, nobody can sign in as owner");
    }

    let client_keys = match config.cookie_secret() {
        Some(secret) => ClientKeys::new(secret.as_bytes()),
        None => {
            warn!("No cookie secret configured, clients are forgotten on restart");
            ClientKeys::new(&rand::random::<[u8; 32]>())
        }
    };

    let local_storage_db = open_local_storage_db(config.db_dir());
    let state = Arc::new(PortalState {
        data_service: Arc::new(SqliteDataService::new(open_data_service_db(
            config.db_dir(),
        ))),
        shared_storage: Arc::new(SqliteLocalStorage::shared(local_storage_db.clone())),
        local_storage_db,
        settings: PortalSettings {
            owner_credential: config.owner().cloned(),
            guard_policy: config.guard_policy(),
        },
        client_keys,
    });

    let port = config.port();
    let listener = match TcpListener::bind(("0.0.0.0", port)).await {
        Err(err) => panic!("Failed to open socket for portal server on port {port}: {err}"),
        Ok(listener) => listener,
    };

    info!("Portal server listening on http://{}:{port}", config.hostname());

    if let Err(err) = axum::serve(listener, create_portal_router(state)).await {
        panic!("Portal server stopped: {err}");
    }
}
