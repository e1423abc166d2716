pub mod classify;
pub mod config;
pub mod districts;
pub mod error;
pub mod filter;
pub mod logging;
pub mod markers;
pub mod metrics;

// Layered boundaries for application and infrastructure
pub mod app;
pub mod infra;

// Domain data shapes shared across layers
pub mod domain;
