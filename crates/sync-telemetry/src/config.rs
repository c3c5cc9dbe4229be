//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging and metrics.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error) or a full
    /// `EnvFilter` directive such as `order_sync=debug,info`
    pub log_level: String,

    /// Whether to enable console output
    pub console_output: bool,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,

    /// Deployment environment (dev, staging, prod)
    pub environment: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "order-sync".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            environment: "dev".to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OTEL_SERVICE_NAME`: Service name (default: order-sync)
    /// - `ORDER_SYNC_LOG_LEVEL` or `RUST_LOG`: Log filter (default: info)
    /// - `ORDER_SYNC_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `ORDER_SYNC_JSON_LOGS`: Enable JSON logs (default: false in dev, true in containers)
    /// - `ORDER_SYNC_ENVIRONMENT`: Environment name (default: dev)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: env::var("OTEL_SERVICE_NAME")
                .unwrap_or_else(|_| "order-sync".to_string()),

            log_level: env::var("ORDER_SYNC_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            console_output: env::var("ORDER_SYNC_CONSOLE_OUTPUT")
                .map(|v| parse_flag(&v, true))
                .unwrap_or(true),

            json_logs: env::var("ORDER_SYNC_JSON_LOGS")
                .map(|v| parse_flag(&v, false))
                .unwrap_or(is_container),

            environment: env::var("ORDER_SYNC_ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()),
        }
    }

    /// Service name qualified with the environment, e.g. `order-sync-prod`.
    pub fn full_service_name(&self) -> String {
        if self.environment == "dev" {
            self.service_name.clone()
        } else {
            format!("{}-{}", self.service_name, self.environment)
        }
    }
}

/// Parses a boolean-ish environment value. Unrecognized values yield `default`.
pub(crate) fn parse_flag(value: &str, default: bool) -> bool {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}
