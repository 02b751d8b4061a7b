//! Single-use resolve/reject contract completing one request.
//!
//! A contract is a cheap, clonable handle. The first `resolve` or `reject`
//! wins; any later completion returns [`ContractError::AlreadyCompleted`] and
//! is never delivered. Completion hooks run before the outcome is delivered,
//! so state released by a hook is observable by the time the caller sees the
//! outcome. If every handle is dropped while the contract is still open, it
//! rejects itself with [`NormalizedError::abandoned`].

use super::{ContractError, NormalizedError, RequestFailure, RequestId};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Outcome delivered to the caller of a request.
pub type RequestOutcome = Result<Value, RequestFailure>;

/// Result of attempting to complete a contract.
pub type ContractResult = Result<(), ContractError>;

type OutcomeMap = Box<dyn FnOnce(RequestOutcome) -> RequestOutcome + Send>;
type CompletionHook = Box<dyn FnOnce() + Send>;

enum Sink {
    Caller(oneshot::Sender<RequestOutcome>),
    Forward {
        next: ResponseContract,
        map: OutcomeMap,
    },
}

#[derive(Default)]
struct ContractState {
    sink: Option<Sink>,
    hooks: Vec<CompletionHook>,
}

struct ContractInner {
    request_id: RequestId,
    state: Mutex<ContractState>,
}

impl ContractInner {
    fn lock(&self) -> MutexGuard<'_, ContractState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for ContractInner {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(sink) = state.sink.take() {
            warn!(
                request_id = %self.request_id,
                "request released without a response, rejecting it"
            );
            let hooks = mem::take(&mut state.hooks);
            deliver(
                self.request_id,
                sink,
                hooks,
                Err(NormalizedError::abandoned().into()),
            );
        }
    }
}

/// Single-use completion handle for one request.
#[derive(Clone)]
pub struct ResponseContract {
    inner: Arc<ContractInner>,
}

impl ResponseContract {
    fn with_sink(request_id: RequestId, sink: Sink) -> Self {
        Self {
            inner: Arc::new(ContractInner {
                request_id,
                state: Mutex::new(ContractState {
                    sink: Some(sink),
                    hooks: Vec::new(),
                }),
            }),
        }
    }

    /// Creates a contract whose outcome is delivered on the returned channel.
    pub(crate) fn channel(request_id: RequestId) -> (Self, oneshot::Receiver<RequestOutcome>) {
        let (sender, receiver) = oneshot::channel();
        (Self::with_sink(request_id, Sink::Caller(sender)), receiver)
    }

    /// Creates a contract that completes `self` with the mapped outcome.
    ///
    /// Pipeline layers use this to interpose on outcomes leaving inner layers.
    pub(crate) fn forwarding(
        &self,
        map: impl FnOnce(RequestOutcome) -> RequestOutcome + Send + 'static,
    ) -> Self {
        Self::with_sink(
            self.inner.request_id,
            Sink::Forward {
                next: self.clone(),
                map: Box::new(map),
            },
        )
    }

    /// Registers a hook run exactly once when the contract completes.
    ///
    /// Hooks run whatever the outcome, including abandonment. A hook
    /// registered on an already completed contract runs immediately.
    pub(crate) fn on_complete(&self, hook: impl FnOnce() + Send + 'static) {
        let mut state = self.inner.lock();
        if state.sink.is_some() {
            state.hooks.push(Box::new(hook));
        } else {
            drop(state);
            hook();
        }
    }

    /// Returns the identifier of the request this contract completes.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.inner.request_id
    }

    /// Returns whether the contract has already been resolved or rejected.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.inner.lock().sink.is_none()
    }

    /// Resolves the request with a transport value.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::AlreadyCompleted`] when the request was
    /// already completed; the value is discarded.
    pub fn resolve(&self, value: Value) -> ContractResult {
        self.complete(Ok(value))
    }

    /// Resolves the request with any serialisable value.
    ///
    /// A value that cannot be converted into the transport format rejects
    /// the request with a `transport-failure` error instead.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::AlreadyCompleted`] when the request was
    /// already completed.
    pub fn resolve_with<T: Serialize + ?Sized>(&self, value: &T) -> ContractResult {
        match serde_json::to_value(value) {
            Ok(converted) => self.resolve(converted),
            Err(err) => {
                warn!(
                    request_id = %self.request_id(),
                    error = %err,
                    "resolved value has no transport representation"
                );
                self.reject(NormalizedError::transport_failure())
            }
        }
    }

    /// Rejects the request with a boundary-safe error.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::AlreadyCompleted`] when the request was
    /// already completed; the error is discarded.
    pub fn reject(&self, error: NormalizedError) -> ContractResult {
        self.complete(Err(error.into()))
    }

    /// Rejects the request with an arbitrary backend error.
    ///
    /// In-process callers receive the error as is. It is replaced by a
    /// `transport-failure` error if it reaches the boundary adapter.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::AlreadyCompleted`] when the request was
    /// already completed.
    pub fn reject_with(
        &self,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> ContractResult {
        self.complete(Err(RequestFailure::backend(error)))
    }

    pub(crate) fn complete(&self, outcome: RequestOutcome) -> ContractResult {
        let (sink, hooks) = {
            let mut state = self.inner.lock();
            let Some(sink) = state.sink.take() else {
                warn!(
                    request_id = %self.request_id(),
                    "ignoring completion of an already completed request"
                );
                return Err(ContractError::AlreadyCompleted(self.request_id()));
            };
            (sink, mem::take(&mut state.hooks))
        };
        deliver(self.request_id(), sink, hooks, outcome);
        Ok(())
    }
}

impl fmt::Debug for ResponseContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseContract")
            .field("request_id", &self.request_id())
            .field("completed", &self.is_completed())
            .finish()
    }
}

fn deliver(
    request_id: RequestId,
    sink: Sink,
    hooks: Vec<CompletionHook>,
    outcome: RequestOutcome,
) {
    for hook in hooks {
        hook();
    }
    match sink {
        Sink::Caller(sender) => {
            if sender.send(outcome).is_err() {
                debug!(%request_id, "caller stopped waiting before the request completed");
            }
        }
        Sink::Forward { next, map } => {
            if next.complete(map(outcome)).is_err() {
                debug!(%request_id, "outer contract was completed before the inner one");
            }
        }
    }
}
