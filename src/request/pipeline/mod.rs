//! Layered request-handler pipeline wrapping one backend.
//!
//! Layers are typed wrapper structs, each holding the next layer inward:
//!
//! ```text
//! SequencingLayer -> ValidationLayer -> IsolationLayer -> backend
//! ```
//!
//! The order is fixed by [`HandlerPipeline::new`]. Every layer completes
//! requests only through the context's response contract.

mod isolation;
mod sequencing;
mod validation;

use crate::manager::{domain::BackendId, ports::CredentialBackend};
use crate::request::{
    domain::{NormalizedError, RequestContext, RequestGroup, RequestMethod},
    ports::RequestValidator,
};
use async_trait::async_trait;
use isolation::IsolationLayer;
use sequencing::SequencingLayer;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;
use validation::ValidationLayer;

/// A call routed to a pipeline: the method plus its positional arguments.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Invocation {
    method: RequestMethod,
    args: Vec<Value>,
}

impl Invocation {
    pub(crate) const fn new(method: RequestMethod, args: Vec<Value>) -> Self {
        Self { method, args }
    }

    pub(crate) const fn method(&self) -> RequestMethod {
        self.method
    }

    pub(crate) fn args(&self) -> &[Value] {
        &self.args
    }

    pub(crate) fn into_parts(self) -> (RequestMethod, Vec<Value>) {
        (self.method, self.args)
    }
}

/// One layer of the pipeline.
///
/// A handler never reports failures through its return value; every outcome
/// travels through `context.response()`.
#[async_trait]
pub(crate) trait RequestHandler: Send + Sync {
    async fn handle(&self, invocation: Invocation, context: RequestContext);
}

/// Sequencing, validation, and isolation layers around one backend.
pub(crate) struct HandlerPipeline {
    backend_id: BackendId,
    groups: Vec<RequestGroup>,
    head: SequencingLayer<ValidationLayer<IsolationLayer>>,
}

impl HandlerPipeline {
    pub(crate) fn new(
        backend_id: BackendId,
        backend: Arc<dyn CredentialBackend>,
        validator: Arc<dyn RequestValidator>,
    ) -> Self {
        let groups = RequestGroup::ALL
            .into_iter()
            .filter(|group| provides(backend.as_ref(), *group))
            .collect();
        let isolation = IsolationLayer::new(backend_id.clone(), backend);
        let validation = ValidationLayer::new(isolation, validator);
        let head = SequencingLayer::new(backend_id.clone(), validation);
        Self {
            backend_id,
            groups,
            head,
        }
    }

    pub(crate) const fn backend_id(&self) -> &BackendId {
        &self.backend_id
    }

    pub(crate) fn supports(&self, group: RequestGroup) -> bool {
        self.groups.contains(&group)
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.head.is_busy()
    }

    pub(crate) async fn handle(&self, invocation: Invocation, context: RequestContext) {
        self.head.handle(invocation, context).await;
    }
}

fn provides(backend: &dyn CredentialBackend, group: RequestGroup) -> bool {
    match group {
        RequestGroup::Manager => backend.manager().is_some(),
        RequestGroup::Login => backend.login().is_some(),
        RequestGroup::AccountCreation => backend.account_creation().is_some(),
        RequestGroup::AccountAuthentication => backend.account_authentication().is_some(),
    }
}

/// Rejects through the context, logging when the request already completed.
fn reject(context: &RequestContext, error: NormalizedError) {
    if context.response().reject(error).is_err() {
        debug!(
            request_id = %context.request_id(),
            "pipeline rejection dropped, request already completed"
        );
    }
}
