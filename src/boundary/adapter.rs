//! Boundary adapter: routes external messages to registered backends.

use super::message::{DispatchMessage, DispatchReply, FALLBACK_REPLY};
use crate::manager::services::Liaison;
use crate::request::{
    PublicFacade,
    domain::{NormalizedError, RequestGroup, RequestMethod},
};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinError, JoinSet};
use tracing::{Instrument, debug, error, info, warn};

/// An encoded message together with the channel its reply goes to.
#[derive(Debug)]
pub struct BoundaryEnvelope {
    /// JSON-encoded [`DispatchMessage`].
    pub payload: Vec<u8>,
    /// Receives the JSON-encoded [`DispatchReply`].
    pub reply_to: oneshot::Sender<Vec<u8>>,
}

impl BoundaryEnvelope {
    /// Creates an envelope and the receiver its reply will arrive on.
    #[must_use]
    pub fn new(payload: Vec<u8>) -> (Self, oneshot::Receiver<Vec<u8>>) {
        let (reply_to, reply) = oneshot::channel();
        (Self { payload, reply_to }, reply)
    }
}

/// Routes messages from outside the trust boundary to public façades.
///
/// Routing failures are reported with the `validation-failure` code before
/// any backend is involved. Only [`NormalizedError`]s ever leave the adapter.
#[derive(Debug, Clone)]
pub struct BoundaryAdapter {
    liaison: Arc<Liaison>,
}

impl BoundaryAdapter {
    /// Creates an adapter dispatching through `liaison`.
    #[must_use]
    pub const fn new(liaison: Arc<Liaison>) -> Self {
        Self { liaison }
    }

    /// Dispatches a decoded message and returns its reply.
    pub async fn dispatch(&self, message: DispatchMessage) -> DispatchReply {
        let DispatchMessage {
            backend_id,
            group,
            method,
            request_context,
            request_args,
        } = message;
        let (facade, target) = match self.route(&backend_id, &group, &method) {
            Ok(routed) => routed,
            Err(rejection) => {
                warn!(
                    %backend_id,
                    %group,
                    %method,
                    error = %rejection,
                    "rejecting message that cannot be routed"
                );
                return DispatchReply::rejected(rejection);
            }
        };
        DispatchReply::from_outcome(facade.invoke(request_context, target, request_args).await)
    }

    /// Decodes a JSON message, dispatches it, and encodes the reply.
    ///
    /// A payload that does not decode yields a `transport-failure` reply.
    pub async fn dispatch_encoded(&self, payload: &[u8]) -> Vec<u8> {
        let reply = match serde_json::from_slice::<DispatchMessage>(payload) {
            Ok(message) => self.dispatch(message).await,
            Err(err) => {
                warn!(error = %err, "discarding malformed dispatch message");
                DispatchReply::rejected(NormalizedError::transport_failure())
            }
        };
        encode_reply(&reply)
    }

    /// Serves envelopes from `inbox` until it closes.
    ///
    /// Each envelope is handled on its own task, so requests to different
    /// backends proceed in parallel. Once the inbox closes, the envelopes
    /// still in flight are allowed to finish before this returns.
    pub async fn serve(self: Arc<Self>, mut inbox: mpsc::Receiver<BoundaryEnvelope>) {
        let mut in_flight = JoinSet::new();
        info!("boundary adapter serving");
        while let Some(envelope) = inbox.recv().await {
            while let Some(joined) = in_flight.try_join_next() {
                report_join(joined);
            }
            let adapter = Arc::clone(&self);
            in_flight.spawn(
                async move {
                    let BoundaryEnvelope { payload, reply_to } = envelope;
                    let reply = adapter.dispatch_encoded(&payload).await;
                    if reply_to.send(reply).is_err() {
                        debug!("requester stopped waiting for the reply");
                    }
                }
                .in_current_span(),
            );
        }
        while let Some(joined) = in_flight.join_next().await {
            report_join(joined);
        }
        info!("boundary adapter inbox closed");
    }

    fn route(
        &self,
        backend_id: &str,
        group: &str,
        method: &str,
    ) -> Result<(PublicFacade, RequestMethod), NormalizedError> {
        if backend_id.is_empty() {
            return Err(NormalizedError::validation_failure(
                "the backend id must not be empty",
            ));
        }
        let facade = self
            .liaison
            .get_request_handler(backend_id)
            .map_err(|err| NormalizedError::validation_failure(err.to_string()))?;
        let request_group = RequestGroup::try_from(group)
            .map_err(|err| NormalizedError::validation_failure(err.to_string()))?;
        if !facade.supports(request_group) {
            return Err(NormalizedError::validation_failure(format!(
                "backend '{backend_id}' does not provide the '{request_group}' group"
            )));
        }
        let request_method = RequestMethod::parse(request_group, method)
            .map_err(|err| NormalizedError::validation_failure(err.to_string()))?;
        Ok((facade, request_method))
    }
}

fn encode_reply(reply: &DispatchReply) -> Vec<u8> {
    serde_json::to_vec(reply).unwrap_or_else(|err| {
        error!(error = %err, "reply could not be encoded, sending the fallback");
        FALLBACK_REPLY.to_vec()
    })
}

fn report_join(joined: Result<(), JoinError>) {
    if let Err(err) = joined {
        error!(error = %err, "boundary task failed");
    }
}
