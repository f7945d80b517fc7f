//! # Document Type Reconciliation
//!
//! Employee documents point at document types by id, but the catalogs they point
//! into are edited freely: types get duplicated under slightly different spellings,
//! deleted and recreated, or were created in the client catalog by mistake. This
//! module turns a raw snapshot of both catalogs and all documents into a
//! consistent view.
//!
//! Leaf first:
//! - [`normalize`]: the join key for type names.
//! - [`group_types`]: merges catalog entries sharing a normalized name into one
//!   [`MergedType`] with a deterministic primary.
//! - [`OrphanIndex`]: documents whose type id is unknown, with the name recorded
//!   for that id in the secondary catalog.
//! - [`resolve`]: finds the document for an (employee, type) cell, direct links
//!   first, name-matched orphans second.
//! - [`completion_percentage`]: share of types an employee has satisfied.
//! - [`ReconciliationSnapshot`]: all of the above built once per load.
//! - [`repair`]: makes orphan rescues durable by rewriting type ids.

mod grouper;
mod normalize;
mod orphan;
pub mod repair;
mod resolver;
mod scorer;
mod snapshot;

pub use grouper::{group_types, MergedType};
pub use normalize::normalize;
pub use orphan::OrphanIndex;
pub use resolver::{resolve, Resolution};
pub use scorer::completion_percentage;
pub use snapshot::ReconciliationSnapshot;

/// Name of the synthetic bucket holding unrecoverable documents.
pub const LEGACY_TYPE_NAME: &str = "Legacy";
