//! Sequencing layer: at most one in-flight request per backend.
//!
//! The layer is a two-state machine over an atomic flag. `Idle -> Busy`
//! happens when a request is accepted; `Busy -> Idle` happens from a
//! completion hook on the request's contract, so it runs on every outcome,
//! including abandonment. There is no queue: a request arriving while busy
//! is rejected with a sequencing violation and never reaches the backend.

use super::{Invocation, RequestHandler, reject};
use crate::manager::domain::BackendId;
use crate::request::domain::{NormalizedError, RequestContext};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

pub(crate) struct SequencingLayer<H> {
    backend_id: BackendId,
    busy: Arc<AtomicBool>,
    inner: H,
}

impl<H> SequencingLayer<H> {
    pub(crate) fn new(backend_id: BackendId, inner: H) -> Self {
        Self {
            backend_id,
            busy: Arc::new(AtomicBool::new(false)),
            inner,
        }
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn try_acquire(&self) -> bool {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

#[async_trait]
impl<H: RequestHandler> RequestHandler for SequencingLayer<H> {
    async fn handle(&self, invocation: Invocation, context: RequestContext) {
        if !self.try_acquire() {
            warn!(
                backend_id = %self.backend_id,
                request_id = %context.request_id(),
                method = %invocation.method(),
                "rejecting request, an existing request is still pending"
            );
            reject(&context, NormalizedError::sequencing_violation());
            return;
        }

        let busy = Arc::clone(&self.busy);
        let backend_id = self.backend_id.clone();
        context.response().on_complete(move || {
            busy.store(false, Ordering::Release);
            debug!(%backend_id, "backend is idle");
        });
        self.inner.handle(invocation, context).await;
    }
}
