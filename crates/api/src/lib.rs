//! HTTP API: configuration, service wiring, routing and error mapping.

pub mod app;
pub mod config;
