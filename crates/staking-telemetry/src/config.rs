//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging and metrics.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error) or full directive
    pub log_level: String,

    /// Whether to enable console output
    pub console_output: bool,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,

    /// Network the process serves (polkadot, kusama, westend)
    pub network: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "staking-exposure".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            network: "polkadot".to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SE_SERVICE_NAME`: Service name (default: staking-exposure)
    /// - `SE_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `SE_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `SE_JSON_LOGS`: Enable JSON logs (default: false in dev, true in containers)
    /// - `SE_NETWORK`: Network name (default: polkadot)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: env::var("SE_SERVICE_NAME")
                .unwrap_or_else(|_| "staking-exposure".to_string()),

            log_level: env::var("SE_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            console_output: env::var("SE_CONSOLE_OUTPUT")
                .map(|v| parse_flag(&v, true))
                .unwrap_or(true),

            json_logs: env::var("SE_JSON_LOGS")
                .map(|v| parse_flag(&v, false))
                .unwrap_or(is_container),

            network: env::var("SE_NETWORK").unwrap_or_else(|_| "polkadot".to_string()),
        }
    }

    /// Configuration for one component of the engine.
    pub fn for_component(component: &str) -> Self {
        let mut config = Self::from_env();
        config.service_name = format!("{}-{}", config.service_name, component);
        config
    }
}

/// `true`/`1` and `false`/`0` (any case); anything else yields `default`.
fn parse_flag(value: &str, default: bool) -> bool {
    match value.to_lowercase().as_str() {
        "true" | "1" => true,
        "false" | "0" => false,
        _ => default,
    }
}
