// Infrastructure
pub mod auth;
pub mod config;
pub mod error;
pub mod metrics;
pub mod postgres;
pub mod telemetry;

// Domain
pub mod service;
pub mod store;
pub mod template;

// Application layer
pub mod api;
pub mod server;
