//! Application State
//!
//! Shared state for the kubegate API server

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::kubernetes::Gateway;

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub gateway: Arc<Gateway>,
}

impl AppState {
    pub fn new(config: GatewayConfig, gateway: Gateway) -> Self {
        Self {
            config: Arc::new(config),
            gateway: Arc::new(gateway),
        }
    }
}
