//! Trace propagation and global tracing setup for the notifications
//! service.
//!
//! A [`TraceContext`] travels with each request (and each reconcile run)
//! through tokio task-local storage, so error responses and log lines can
//! carry the correlation ID without threading it through every signature.

use std::any::type_name_of_val;
use std::sync::atomic::{AtomicBool, Ordering};

use log::LevelFilter;
use thiserror::Error;
use tokio::task_local;
use tracing_log::LogTracer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::AppConfig;

/// Correlation metadata for a single request or background run.
#[derive(Debug, Clone)]
pub struct TraceContext {
    pub trace_id: String,
}

impl TraceContext {
    pub fn new(trace_id: impl Into<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
        }
    }
}

task_local! {
    static CURRENT_TRACE: TraceContext;
}

/// Failure to install the global tracing pipeline.
#[derive(Debug, Error)]
pub enum TelemetryInitError {
    #[error("a conflicting global logger is already installed: {0}")]
    LoggerConflict(#[from] log::SetLoggerError),
}

static INIT_DONE: AtomicBool = AtomicBool::new(false);

/// Install the tracing subscriber and the `log` bridge.
///
/// Idempotent: only the first call in the process has any effect. A
/// subscriber set earlier (test harnesses do this) is tolerated and left
/// in place; a foreign `log` logger is a genuine conflict and reported.
pub fn init_tracing(config: &AppConfig) -> Result<(), TelemetryInitError> {
    if INIT_DONE
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        return Ok(());
    }

    // From here on, `log::` macros emit tracing events.
    if let Err(err) = LogTracer::builder()
        .with_max_level(LevelFilter::Trace)
        .init()
    {
        let installed = type_name_of_val(log::logger());
        if !installed.contains("LogTracer") {
            INIT_DONE.store(false, Ordering::SeqCst);
            return Err(TelemetryInitError::LoggerConflict(err));
        }
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let output = if config.log_format == "pretty" {
        fmt::layer().pretty().boxed()
    } else {
        fmt::layer().json().boxed()
    };

    if let Err(err) = tracing_subscriber::registry()
        .with(filter)
        .with(output)
        .try_init()
    {
        INIT_DONE.store(false, Ordering::SeqCst);
        eprintln!("tracing subscriber already set, keeping the existing one: {err}");
    }

    Ok(())
}

/// Run `future` with `context` as the active trace context.
pub async fn with_trace_context<Fut, R>(context: TraceContext, future: Fut) -> R
where
    Fut: std::future::Future<Output = R>,
{
    CURRENT_TRACE.scope(context, future).await
}

/// Trace ID of the current task, if one was established.
pub fn current_trace_id() -> Option<String> {
    CURRENT_TRACE.try_with(|ctx| ctx.trace_id.clone()).ok()
}
