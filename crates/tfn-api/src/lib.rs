//! tfn-api
//!
//! HTTP client for the ordering backend: endpoint table, response-envelope
//! decoding, and the single 401-refresh-retry. The [`OrderBackend`] trait is
//! the seam the dispatcher (and every test double) programs against;
//! [`RestBackend`] is the reqwest implementation.
//!
//! All requests ride one cookie jar; the backend authenticates via
//! HttpOnly session cookies, so there is no token plumbing here.

mod backend;
mod client;
mod config;
pub mod endpoints;
mod error;

pub use backend::{OrderBackend, RestBackend};
pub use client::ApiClient;
pub use config::ApiConfig;
pub use error::ApiError;
