//! HTTP services. Each sub-module owns one `/api/...` scope and exposes a
//! `configure_routes()` returning it, registered in `main.rs`.

pub mod categories;
pub mod document_types;
pub mod documents;
pub mod employees;
pub mod files;
pub mod matrix;
pub mod reports;

pub mod auth;
mod loader;
mod validate;

use crate::clock::Clock;
use crate::config::Config;
use crate::store::files::LocalFileStore;
use crate::store::{EntityStore, StateStore};
use std::sync::{Arc, Mutex};

/// Shared handles injected into every handler as `web::Data<AppContext>`.
pub struct AppContext {
    pub config: Config,
    pub store: Arc<dyn EntityStore>,
    /// Bookkeeping state; backed by the same database as `store` in production.
    pub state: Arc<dyn StateStore>,
    pub files: Arc<LocalFileStore>,
    pub clock: Arc<dyn Clock>,
    /// Serializes the find-or-create step of document uploads.
    pub uploads: Mutex<()>,
}
