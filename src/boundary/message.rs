//! Wire messages exchanged across the trust boundary.

use crate::request::domain::{NormalizedError, RequestFailure, RequestOutcome, SessionContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Pre-encoded reply sent when a reply cannot be encoded.
///
/// Decodes to a rejection carrying [`NormalizedError::transport_failure`].
pub const FALLBACK_REPLY: &[u8] = br#"{"status":"rejected","error":{"code":"transport-failure","message":"the outcome could not be transported across the boundary"}}"#;

/// A request arriving from outside the trust boundary.
///
/// Every routing field is kept as the raw string received, so that invalid
/// routes can be reported rather than failing to decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchMessage {
    /// Identifier of the target backend.
    pub backend_id: String,
    /// Request group name, such as `login`.
    pub group: String,
    /// Method name within the group, such as `getRecordMetadata`.
    pub method: String,
    /// Session identity of the caller.
    pub request_context: SessionContext,
    /// Positional arguments following the request context.
    #[serde(default)]
    pub request_args: Vec<Value>,
}

impl DispatchMessage {
    /// Creates a message with no arguments.
    #[must_use]
    pub fn new(
        backend_id: impl Into<String>,
        group: impl Into<String>,
        method: impl Into<String>,
        request_context: SessionContext,
    ) -> Self {
        Self {
            backend_id: backend_id.into(),
            group: group.into(),
            method: method.into(),
            request_context,
            request_args: Vec::new(),
        }
    }

    /// Sets the positional arguments.
    #[must_use]
    pub fn with_args(mut self, args: impl IntoIterator<Item = Value>) -> Self {
        self.request_args = args.into_iter().collect();
        self
    }
}

/// Reply returned across the trust boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DispatchReply {
    /// The backend resolved the request.
    Resolved {
        /// Resolved value.
        value: Value,
    },
    /// The request was rejected.
    Rejected {
        /// Boundary-safe error.
        error: NormalizedError,
    },
}

impl DispatchReply {
    /// Creates a rejection reply.
    #[must_use]
    pub const fn rejected(error: NormalizedError) -> Self {
        Self::Rejected { error }
    }

    /// Converts a request outcome into a reply.
    ///
    /// Opaque backend errors have no transport representation: they are
    /// logged and replaced by [`NormalizedError::transport_failure`].
    #[must_use]
    pub fn from_outcome(outcome: RequestOutcome) -> Self {
        match outcome {
            Ok(value) => Self::Resolved { value },
            Err(RequestFailure::Normalized(error)) => Self::Rejected { error },
            Err(RequestFailure::Backend(cause)) => {
                warn!(error = %cause, "backend error cannot cross the boundary");
                Self::Rejected {
                    error: NormalizedError::transport_failure(),
                }
            }
        }
    }

    /// Returns whether the request was resolved.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }
}
