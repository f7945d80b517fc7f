//! Data models shared between the backend and any client of its HTTP API.

pub mod jobs;
pub mod model;
pub mod requests;
