mod clock;
mod config;
mod error;
mod job_controller;
mod reconcile;
mod services;
mod store;

use crate::clock::SystemClock;
use crate::config::Config;
use crate::job_controller::state::JobsState;
use crate::services::auth::require_token;
use crate::services::AppContext;
use crate::store::files::LocalFileStore;
use crate::store::SqliteStore;
use actix_web::middleware::{from_fn, Logger};
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::{info, warn};
use std::io;
use std::sync::{Arc, Mutex};

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let config = Config::from_env().map_err(io::Error::other)?;

    let store = Arc::new(SqliteStore::open(&config.database_path).map_err(io::Error::other)?);
    if config.api_token.is_none() {
        warn!("STAFFDOCS_API_TOKEN is not set; the API is open to anyone who can reach it");
    }

    // Initialize job controller state
    let (jobs_state, rx) = JobsState::new(100);
    let updater_state = jobs_state.clone();
    tokio::spawn(async move {
        job_controller::state::start_job_updater(updater_state, rx).await;
    });

    let host = config.host.clone();
    let port = config.port;
    let ctx = web::Data::new(AppContext {
        files: Arc::new(LocalFileStore::new(&config.upload_dir)),
        config,
        store: store.clone(),
        state: store,
        clock: Arc::new(SystemClock),
        uploads: Mutex::new(()),
    });

    info!("Server running at http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .wrap(from_fn(require_token))
            .wrap(Logger::default())
            .app_data(web::JsonConfig::default().limit(10 * 1024 * 1024)) // 10 MB
            .app_data(ctx.clone())
            .app_data(web::Data::new(jobs_state.clone()))
            .service(services::categories::configure_routes())
            .service(services::document_types::configure_routes())
            .service(services::employees::configure_routes())
            .service(services::documents::configure_routes())
            .service(services::matrix::configure_routes())
            .service(services::reports::configure_routes())
            .service(services::files::configure_routes())
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
