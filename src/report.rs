use crate::error::BraviaError;

/// Sink for failures that should be surfaced to an operator
///
/// The client hands every reportable failure to its reporter together with
/// the request path it belongs to. Failures that are expected states, such as
/// a TV in standby refusing a query, are filtered out before they reach the
/// reporter.
pub trait ErrorReporter: Send + Sync {
    /// Record a failed request against `path`
    fn report(&self, path: &str, error: &BraviaError);
}

/// Default reporter forwarding failures to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, path: &str, error: &BraviaError) {
        match error {
            BraviaError::Api { code, message } => {
                tracing::error!(path, code, message = %message, "Invalid response from TV");
            }
            BraviaError::Transport { kind, detail } => {
                tracing::error!(path, kind = %kind, detail = %detail, "Request to TV failed");
            }
            other => {
                tracing::error!(path, error = %other, "Request to TV failed");
            }
        }
    }
}

/// Whether a request reports its failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reporting {
    Report,
    Suppress,
}

impl Reporting {
    pub(crate) fn enabled(self) -> bool {
        self == Reporting::Report
    }
}
