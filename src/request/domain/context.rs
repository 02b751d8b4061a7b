//! Per-request context handed to backends.

use super::{RequestId, ResponseContract};
use serde::{Deserialize, Serialize};

/// Document and session identity of the caller that issued a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    document_url: Option<String>,
}

impl SessionContext {
    /// Creates a session context without a document URL.
    #[must_use]
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            document_url: None,
        }
    }

    /// Sets the URL of the document the request originated from.
    #[must_use]
    pub fn with_document_url(mut self, document_url: impl Into<String>) -> Self {
        self.document_url = Some(document_url.into());
        self
    }

    /// Returns the session identifier.
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Returns the originating document URL, if known.
    #[must_use]
    pub fn document_url(&self) -> Option<&str> {
        self.document_url.as_deref()
    }
}

/// Context of one in-flight request.
///
/// Only the public façade creates contexts, so a backend always receives a
/// context whose response contract is wired to a real caller through the
/// full pipeline.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: RequestId,
    session: SessionContext,
    response: ResponseContract,
}

impl RequestContext {
    pub(crate) const fn new(
        request_id: RequestId,
        session: SessionContext,
        response: ResponseContract,
    ) -> Self {
        Self {
            request_id,
            session,
            response,
        }
    }

    /// Returns the request identifier.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the caller's session identity.
    #[must_use]
    pub const fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Returns the single-use contract completing this request.
    #[must_use]
    pub const fn response(&self) -> &ResponseContract {
        &self.response
    }

    /// Returns a context for the next inner layer with a replaced contract.
    pub(crate) fn with_response(&self, response: ResponseContract) -> Self {
        Self {
            request_id: self.request_id,
            session: self.session.clone(),
            response,
        }
    }
}
