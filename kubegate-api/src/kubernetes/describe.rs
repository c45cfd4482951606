//! Describe delegate
//!
//! Produces the human-readable description of one object by running an
//! external tool (kubectl by default) and capturing its output.

use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

use super::descriptors::ResourceDescriptor;
use super::error::{GatewayError, GatewayResult};
use super::types::ClusterContext;

/// The object a describe call is about
#[derive(Debug, Clone, Copy)]
pub struct DescribeTarget<'a> {
    pub descriptor: &'a ResourceDescriptor,
    pub context: &'a ClusterContext,
    pub namespace: Option<&'a str>,
    pub name: &'a str,
}

#[async_trait]
pub trait DescribeTool: Send + Sync {
    async fn describe(&self, target: &DescribeTarget<'_>) -> GatewayResult<String>;
}

/// Runs `<program> [args..] describe [-n ns] [context flags] -- <resource> <name>`
#[derive(Debug, Clone)]
pub struct KubectlDescriber {
    program: String,
    args: Vec<String>,
}

impl Default for KubectlDescriber {
    fn default() -> Self {
        Self::new("kubectl", Vec::new())
    }
}

impl KubectlDescriber {
    /// `args` are placed before the describe subcommand
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Full argument list for a target
    ///
    /// Flags come first; the resource and name follow `--` so neither can be
    /// read as a flag.
    pub fn command_args(&self, target: &DescribeTarget<'_>) -> Vec<String> {
        let mut args = self.args.clone();
        args.push("describe".to_string());

        if target.descriptor.is_namespaced() {
            if let Some(namespace) = target.namespace {
                args.push("-n".to_string());
                args.push(namespace.to_string());
            }
        }

        args.extend(target.context.cli_args());
        args.push("--".to_string());
        args.push(target.descriptor.cli_resource());
        args.push(target.name.to_string());
        args
    }
}

#[async_trait]
impl DescribeTool for KubectlDescriber {
    async fn describe(&self, target: &DescribeTarget<'_>) -> GatewayResult<String> {
        let args = self.command_args(target);
        tracing::debug!(program = %self.program, ?args, "Running describe");

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| GatewayError::ExternalToolFailure {
                message: format!("Failed to run {}: {}", self.program, e),
                output: String::new(),
            })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            return Err(GatewayError::ExternalToolFailure {
                message: format!(
                    "{} describe {} {} failed ({})",
                    self.program,
                    target.descriptor.kind,
                    target.name,
                    output.status
                ),
                output: combined,
            });
        }

        Ok(combined)
    }
}
