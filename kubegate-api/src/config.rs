//! Configuration management for the kubegate API
//!
//! Settings are loaded from:
//! 1. Environment variables (highest priority)
//! 2. Configuration file (TOML format)
//! 3. Default values (lowest priority)

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::kubernetes::describe::KubectlDescriber;
use crate::kubernetes::types::{ClusterContext, DEFAULT_CONTEXT};
use crate::kubernetes::GatewayOptions;
use crate::logging::LoggingConfig;

/// One day
const MAX_REQUEST_TIMEOUT_SECS: u64 = 86_400;

const DEFAULT_JWT_SECRET: &str = "kubegate-default-jwt-secret-change-me";

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub server: ServerConfig,
    pub kubernetes: KubernetesConfig,
    pub misc: MiscConfig,
    pub describe: DescribeConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Deadline for each workload request, in seconds
    pub request_timeout_secs: u64,
}

/// Cluster connection configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KubernetesConfig {
    /// Use the pod's service account for the default context
    pub run_in_cluster: bool,
    /// Kubeconfig for the default context; falls back to $KUBECONFIG, then ~/.kube/config
    pub kubeconfig: Option<PathBuf>,
    /// Context inside the kubeconfig; its current-context when unset
    pub kubeconfig_context: Option<String>,
    /// Additional named contexts
    pub contexts: Vec<ClusterContext>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MiscConfig {
    /// Namespaces hidden from every list result
    pub ignore_namespaces: Vec<String>,
}

/// External describe tool
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DescribeConfig {
    pub program: String,
    /// Arguments placed before the describe subcommand
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 secret for bearer tokens
    pub jwt_secret: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 30,
        }
    }
}

impl Default for MiscConfig {
    fn default() -> Self {
        Self {
            ignore_namespaces: vec![
                "kube-system".to_string(),
                "kube-public".to_string(),
                "kube-node-lease".to_string(),
            ],
        }
    }
}

impl Default for DescribeConfig {
    fn default() -> Self {
        Self {
            program: "kubectl".to_string(),
            args: Vec::new(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
        }
    }
}

impl AuthConfig {
    pub fn is_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

impl GatewayConfig {
    /// Load from the first config file found, then apply environment overrides and validate
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::find_config_file() {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::default(),
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file path
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_path_buf(), e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let paths = [
            std::env::var("KUBEGATE_CONFIG").ok().map(PathBuf::from),
            Some(PathBuf::from("/etc/kubegate/config.toml")),
            Some(PathBuf::from("./kubegate.toml")),
        ];

        paths.into_iter().flatten().find(|p| p.exists())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply `KUBEGATE_*` overrides from any key lookup
    pub fn apply_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server
        if let Some(host) = var("KUBEGATE_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("KUBEGATE_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Some(secs) = var("KUBEGATE_REQUEST_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            self.server.request_timeout_secs = secs;
        }

        // Kubernetes
        if let Some(in_cluster) = var("KUBEGATE_RUN_IN_CLUSTER") {
            self.kubernetes.run_in_cluster = in_cluster.parse().unwrap_or(false);
        }
        if let Some(path) = var("KUBEGATE_KUBECONFIG") {
            self.kubernetes.kubeconfig = Some(PathBuf::from(path));
        }
        if let Some(context) = var("KUBEGATE_KUBECONFIG_CONTEXT") {
            self.kubernetes.kubeconfig_context = Some(context);
        }

        // Misc
        if let Some(namespaces) = var("KUBEGATE_IGNORE_NAMESPACES") {
            self.misc.ignore_namespaces = namespaces
                .split(',')
                .map(str::trim)
                .filter(|ns| !ns.is_empty())
                .map(String::from)
                .collect();
        }

        // Describe
        if let Some(program) = var("KUBEGATE_DESCRIBE_PROGRAM") {
            self.describe.program = program;
        }

        // Auth
        if let Some(secret) = var("KUBEGATE_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }

        // Logging
        if let Some(level) = var("KUBEGATE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(dir) = var("KUBEGATE_LOG_DIR") {
            self.logging.file_dir = Some(PathBuf::from(dir));
        }
        if let Some(json) = var("KUBEGATE_LOG_JSON") {
            self.logging.json_format = json.parse().unwrap_or(false);
        }
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("Port cannot be 0".to_string()));
        }

        if !(1..=MAX_REQUEST_TIMEOUT_SECS).contains(&self.server.request_timeout_secs) {
            return Err(ConfigError::Validation(format!(
                "Request timeout must be between 1 and {} seconds",
                MAX_REQUEST_TIMEOUT_SECS
            )));
        }

        if self.describe.program.trim().is_empty() {
            return Err(ConfigError::Validation(
                "Describe program cannot be empty".to_string(),
            ));
        }

        if self.auth.jwt_secret.is_empty() {
            return Err(ConfigError::Validation("JWT secret cannot be empty".to_string()));
        }

        let mut seen = HashSet::new();
        for context in &self.kubernetes.contexts {
            if context.id.trim().is_empty() {
                return Err(ConfigError::Validation("Context id cannot be empty".to_string()));
            }
            if context.id == DEFAULT_CONTEXT {
                return Err(ConfigError::Validation(format!(
                    "Context id '{}' is reserved for the default context",
                    DEFAULT_CONTEXT
                )));
            }
            if !seen.insert(context.id.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "Context '{}' is declared more than once",
                    context.id
                )));
            }
        }

        Ok(())
    }

    /// Default context as selected by `run_in_cluster`
    pub fn default_context(&self) -> ClusterContext {
        if self.kubernetes.run_in_cluster {
            ClusterContext::in_cluster(DEFAULT_CONTEXT)
        } else {
            ClusterContext::kubeconfig(
                DEFAULT_CONTEXT,
                self.kubeconfig_path(),
                self.kubernetes.kubeconfig_context.clone(),
            )
        }
    }

    fn kubeconfig_path(&self) -> PathBuf {
        self.kubernetes
            .kubeconfig
            .clone()
            .or_else(|| {
                std::env::var("KUBECONFIG")
                    .ok()
                    .and_then(|v| v.split(':').next().filter(|p| !p.is_empty()).map(PathBuf::from))
            })
            .or_else(|| {
                std::env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".kube").join("config"))
            })
            .unwrap_or_else(|| PathBuf::from(".kube/config"))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    pub fn gateway_options(&self) -> GatewayOptions {
        let options = self
            .kubernetes
            .contexts
            .iter()
            .cloned()
            .fold(GatewayOptions::new(self.default_context()), GatewayOptions::with_context);

        options
            .ignoring(self.misc.ignore_namespaces.iter().cloned())
            .with_request_timeout(self.request_timeout())
    }

    pub fn describer(&self) -> KubectlDescriber {
        KubectlDescriber::new(self.describe.program.clone(), self.describe.args.clone())
    }
}

/// Configuration errors
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0:?}: {1}")]
    FileRead(PathBuf, String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Config validation failed: {0}")]
    Validation(String),
}
