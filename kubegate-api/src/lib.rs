//! kubegate API library
//!
//! Exposes the workload gateway and its HTTP adapter for the binary, tests
//! and external integrations.

// Core modules
pub mod config;
pub mod error;
pub mod logging;

// Application state
pub mod state;
pub use state::AppState;

// Authentication
pub mod middleware;

// Kubernetes gateway
pub mod kubernetes;

// HTTP surface
pub mod routes;

// Graceful shutdown handling
pub mod shutdown;
