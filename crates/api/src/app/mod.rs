//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection and the single `LedgerService` instance
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request DTOs and id parsing
//! - `errors.rs`: consistent error responses

use axum::{Extension, Router, routing::get};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::SharedLedger;

/// Build the full HTTP router around an already-wired ledger service.
pub fn build_app(ledger: SharedLedger) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(Extension(ledger))
}
