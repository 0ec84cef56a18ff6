/*!
 * Tracing
 * Subscriber setup and dispatch spans using the tracing crate
 */

use crate::core::limits::{ENV_TRACE_JSON, SLOW_CALLBACK_MS};
use crate::core::types::SignalNumber;
use crate::signals::SignalTable;
use std::time::Instant;
use tracing::{debug, info, span, warn, Level};
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - SIGNAL_THREAD_TRACE_JSON: Enable JSON output (default: false)
///
/// Returns false if a global subscriber was already installed.
pub fn init_tracing() -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var(ENV_TRACE_JSON)
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init()
            .is_ok()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()
            .is_ok()
    };

    if installed {
        info!(json = use_json, "Tracing initialized");
    }
    installed
}

/// Span around one callback dispatch; warns when the callback is slow
pub struct DispatchSpan {
    span: tracing::Span,
    start: Instant,
    signal: SignalNumber,
}

impl DispatchSpan {
    pub fn new(signal: SignalNumber, pid: i32) -> Self {
        let span = span!(
            Level::DEBUG,
            "dispatch",
            signal = %SignalTable::describe(signal),
            sender = pid,
            duration_us = tracing::field::Empty,
            result = tracing::field::Empty,
        );
        Self {
            span,
            start: Instant::now(),
            signal,
        }
    }

    pub fn record_result(&self, success: bool) {
        self.span.record("result", if success { "success" } else { "raised" });
    }

    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }
}

impl Drop for DispatchSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        self.span.record("duration_us", duration.as_micros() as u64);
        let _entered = self.span.enter();

        if duration.as_millis() > SLOW_CALLBACK_MS {
            warn!(
                signal = %SignalTable::describe(self.signal),
                duration_ms = duration.as_millis() as u64,
                "slow signal callback"
            );
        } else {
            debug!(duration_us = duration.as_micros() as u64, "callback completed");
        }
    }
}
