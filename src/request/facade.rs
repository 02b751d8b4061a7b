//! Public façade: the only entry point for issuing requests to a backend.

use super::domain::{
    NormalizedError, RequestContext, RequestFailure, RequestGroup, RequestId, RequestMethod,
    RequestOutcome, ResponseContract, SessionContext,
};
use super::pipeline::{HandlerPipeline, Invocation};
use crate::manager::domain::BackendId;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument::WithSubscriber;
use tracing::{Instrument, debug, info_span, warn};

/// Cloneable handle issuing requests to one registered backend.
///
/// Each call creates a fresh request context wired to a new response
/// contract and runs the backend's pipeline on its own task. Dropping the
/// returned future stops waiting for the outcome but does not cancel the
/// request: the backend stays busy until it completes.
///
/// # Examples
///
/// ```no_run
/// # use std::sync::Arc;
/// # use credential_liaison::config::LiaisonConfig;
/// # use credential_liaison::manager::{adapters::memory::InMemoryCredentialBackend, services::Liaison};
/// # use credential_liaison::request::domain::{ManagerMethod, RequestMethod, SessionContext};
/// # use serde_json::json;
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let builtin = InMemoryCredentialBackend::new().with_signing_key("https://a.example", "k1");
/// let liaison = Liaison::new(Arc::new(builtin), LiaisonConfig::default())?;
/// let facade = liaison.get_request_handler("builtin")?;
/// let key: String = facade
///     .invoke_as(
///         SessionContext::new("s1"),
///         RequestMethod::Manager(ManagerMethod::GetSigningKey),
///         vec![json!("https://a.example")],
///     )
///     .await?;
/// assert_eq!(key, "k1");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PublicFacade {
    pipeline: Arc<HandlerPipeline>,
}

impl PublicFacade {
    pub(crate) const fn new(pipeline: Arc<HandlerPipeline>) -> Self {
        Self { pipeline }
    }

    /// Returns the identifier of the backend this façade targets.
    #[must_use]
    pub fn backend_id(&self) -> &BackendId {
        self.pipeline.backend_id()
    }

    /// Returns whether the backend provides `group`.
    #[must_use]
    pub fn supports(&self, group: RequestGroup) -> bool {
        self.pipeline.supports(group)
    }

    /// Returns whether a request to the backend is currently in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.pipeline.is_busy()
    }

    /// Issues a request and waits for its outcome.
    ///
    /// The outcome is whatever the pipeline completed the request with:
    /// a resolved value, a normalised rejection, or an opaque backend error.
    pub async fn invoke(
        &self,
        session: SessionContext,
        method: RequestMethod,
        args: Vec<Value>,
    ) -> RequestOutcome {
        let request_id = RequestId::new();
        let (response, outcome) = ResponseContract::channel(request_id);
        let context = RequestContext::new(request_id, session, response);
        let span = info_span!(
            "request",
            backend_id = %self.pipeline.backend_id(),
            %request_id,
            %method,
        );
        debug!(parent: &span, "dispatching request");

        let pipeline = Arc::clone(&self.pipeline);
        tokio::spawn(
            async move {
                pipeline
                    .handle(Invocation::new(method, args), context)
                    .await;
            }
            .instrument(span)
            .with_current_subscriber(),
        );

        outcome.await.unwrap_or_else(|_| {
            warn!(%request_id, "request dropped without an outcome");
            Err(NormalizedError::abandoned().into())
        })
    }

    /// Issues a request and decodes the resolved value into `T`.
    ///
    /// # Errors
    ///
    /// Returns the request's failure, or a `transport-failure` error when
    /// the resolved value does not decode into `T`.
    pub async fn invoke_as<T: DeserializeOwned>(
        &self,
        session: SessionContext,
        method: RequestMethod,
        args: Vec<Value>,
    ) -> Result<T, RequestFailure> {
        let value = self.invoke(session, method, args).await?;
        serde_json::from_value(value).map_err(|err| {
            warn!(%method, error = %err, "resolved value has an unexpected shape");
            NormalizedError::transport_failure().into()
        })
    }
}

impl std::fmt::Debug for PublicFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicFacade")
            .field("backend_id", self.pipeline.backend_id())
            .field("busy", &self.is_busy())
            .finish()
    }
}
