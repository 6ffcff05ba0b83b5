//! Diagnostic events and sinks for outgoing pull request requests.
//!
//! The pull request layer reports selected requests just before they are
//! dispatched. Sinks only observe: they cannot fail the call or change what
//! is sent.

use std::io;

use serde::{Deserialize, Serialize};

/// A structured telemetry event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TelemetryEvent {
    /// A request has been shaped and is about to be handed to the executor.
    RequestPrepared {
        /// Logical operation name (e.g. `create`, `merge`).
        operation: String,
        /// HTTP verb.
        method: String,
        /// Absolute request URL.
        url: String,
        /// Serialised JSON body, when one is sent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        body: Option<String>,
    },
}

/// A sink that can record telemetry events.
pub trait TelemetrySink: Send + Sync {
    /// Records a telemetry event.
    fn record(&self, event: TelemetryEvent);
}

/// Telemetry sink that drops all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetrySink;

impl TelemetrySink for NoopTelemetrySink {
    fn record(&self, _event: TelemetryEvent) {}
}

/// Forwards events to the `tracing` subscriber at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTelemetrySink;

impl TelemetrySink for TracingTelemetrySink {
    fn record(&self, event: TelemetryEvent) {
        match event {
            TelemetryEvent::RequestPrepared {
                operation,
                method,
                url,
                body,
            } => {
                tracing::debug!(
                    "{operation} request prepared: {method} {url} body={}",
                    body.as_deref().unwrap_or("<none>")
                );
            }
        }
    }
}

/// Records telemetry events to stderr as JSON lines (JSONL).
///
/// This is intended for local debugging and is not transmitted anywhere.
#[derive(Debug, Default)]
pub struct StderrJsonlTelemetrySink;

impl TelemetrySink for StderrJsonlTelemetrySink {
    fn record(&self, event: TelemetryEvent) {
        let Ok(serialised) = serde_json::to_string(&event) else {
            return;
        };

        let _ignored = writeln_stderr(&serialised);
    }
}

fn writeln_stderr(message: &str) -> io::Result<()> {
    use io::Write;

    let mut stderr = io::stderr().lock();
    writeln!(stderr, "{message}")
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Recording sink shared by unit tests.

    use std::sync::Mutex;

    use super::{TelemetryEvent, TelemetrySink};

    #[derive(Debug, Default)]
    pub(crate) struct RecordingSink {
        events: Mutex<Vec<TelemetryEvent>>,
    }

    impl RecordingSink {
        pub(crate) fn take(&self) -> Vec<TelemetryEvent> {
            self.events
                .lock()
                .expect("events mutex should be available")
                .drain(..)
                .collect()
        }
    }

    impl TelemetrySink for RecordingSink {
        fn record(&self, event: TelemetryEvent) {
            self.events
                .lock()
                .expect("events mutex should be available")
                .push(event);
        }
    }
}
