//! Structured logging setup.
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and either a
//! JSON layer (containers, log shippers) or a pretty console layer
//! (development). Log lines carry consistent fields that downstream log
//! aggregation can parse:
//! - `timestamp`, `level`, `target`
//! - `component`: pipeline component (queue, orchestrator, scheduler, ...)
//! - `source_order_id` / `sync_id` / `job_id` where relevant

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{TelemetryConfig, TelemetryError};

/// Initialize the global tracing subscriber.
///
/// Fails if a global subscriber is already installed or the filter directive
/// cannot be parsed.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;

    if !config.console_output {
        tracing_subscriber::registry()
            .with(env_filter)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    } else if config.json_logs {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_ansi(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    }

    tracing::info!(
        service = %config.full_service_name(),
        json_logs = config.json_logs,
        "Structured logging initialized"
    );

    Ok(())
}

/// Log an order-related event with standard fields.
#[macro_export]
macro_rules! log_order_event {
    ($level:ident, $component:expr, $msg:expr, $source_order_id:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = $component,
            source_order_id = %$source_order_id,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a job-related event with standard fields.
#[macro_export]
macro_rules! log_job_event {
    ($level:ident, $msg:expr, $job_id:expr, $kind:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = "queue",
            job_id = %$job_id,
            kind = $kind,
            $($($field)*,)?
            $msg
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_macros_expand() {
        let sync_id = "s-1";
        log_order_event!(info, "orchestrator", "Order acknowledged", "ORD-1", sync_id = %sync_id);
        log_order_event!(warn, "orchestrator", "Submission failed", "ORD-2");
        log_job_event!(debug, "Job finished", "job-1", "SYNC_ORDER", outcome = "ok");
    }

    #[test]
    fn test_bad_filter_is_rejected() {
        std::env::remove_var("RUST_LOG");
        let config = TelemetryConfig {
            log_level: "order_sync=loud".to_string(),
            ..TelemetryConfig::default()
        };
        assert!(matches!(
            init_logging(&config),
            Err(TelemetryError::LoggingInit(_))
        ));
    }
}
