//! Service layer for the credential manager registry.
//!
//! Provides [`Liaison`], which owns every registered backend together with
//! its request pipeline and hands out [`PublicFacade`]s for dispatch.

use crate::config::LiaisonConfig;
use crate::manager::{
    domain::{BackendId, BackendKind, BackendLabel, ManagerDomainError, ManagerSummary},
    ports::CredentialBackend,
};
use crate::request::{
    PublicFacade,
    pipeline::HandlerPipeline,
    ports::RequestValidator,
    validation::SchemaValidator,
};
use mockable::{Clock, DefaultClock};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use tracing::{info, warn};

/// Request payload for registering a credential manager.
///
/// Fields are validated by [`Liaison::register_manager`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterManagerRequest {
    id: String,
    label: String,
    kind: String,
}

impl RegisterManagerRequest {
    /// Creates a request from raw field values.
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind: kind.into(),
        }
    }

    /// Creates a request for a backend shipped with the application.
    #[must_use]
    pub fn native(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label, BackendKind::Native.as_str())
    }

    /// Creates a request for a third-party backend.
    #[must_use]
    pub fn external(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label, BackendKind::External.as_str())
    }
}

/// Errors returned by registry operations.
///
/// Registry errors are local to the application core and never cross the
/// boundary adapter.
#[derive(Debug, Error)]
pub enum LiaisonError {
    /// A registration field failed validation.
    #[error(transparent)]
    Validation(#[from] ManagerDomainError),

    /// A backend with the same identifier is already registered.
    #[error("a backend with id '{0}' is already registered")]
    Duplicate(BackendId),

    /// No backend is registered under the identifier.
    #[error("no backend is registered with id '{0}'")]
    NotFound(String),

    /// The built-in backend cannot be erased through the regular path.
    #[error("backend '{0}' is built in and cannot be erased")]
    Protected(BackendId),
}

/// Result type for registry operations.
pub type LiaisonResult<T> = Result<T, LiaisonError>;

struct BackendRecord {
    summary: ManagerSummary,
    pipeline: Arc<HandlerPipeline>,
}

#[derive(Default)]
struct LiaisonState {
    records: HashMap<BackendId, BackendRecord>,
    order: Vec<BackendId>,
}

impl LiaisonState {
    fn remove(&mut self, id: &str) -> Option<BackendRecord> {
        let record = self.records.remove(id)?;
        self.order.retain(|registered| registered.as_str() != id);
        Some(record)
    }
}

/// Registry of credential backends.
///
/// The built-in backend is registered on construction. Every other backend
/// is added with [`register_manager`](Self::register_manager). Each record
/// owns one pipeline; every façade handed out for an identifier shares it,
/// and with it the backend's busy flag.
pub struct Liaison {
    state: RwLock<LiaisonState>,
    validator: Arc<dyn RequestValidator>,
    clock: Arc<dyn Clock + Send + Sync>,
    builtin_id: BackendId,
}

impl Liaison {
    /// Creates a registry with the default schema validator and system clock,
    /// registering `builtin` as the native built-in backend.
    ///
    /// # Errors
    ///
    /// Returns [`LiaisonError::Validation`] when the configured built-in
    /// identity is invalid.
    pub fn new(
        builtin: Arc<dyn CredentialBackend>,
        config: LiaisonConfig,
    ) -> LiaisonResult<Self> {
        let validator = Arc::new(SchemaValidator::with_config(config.validation.clone()));
        Self::with_parts(builtin, config, validator, Arc::new(DefaultClock))
    }

    /// Creates a registry with an explicit validator and clock.
    ///
    /// `config.validation` is ignored; `validator` is used for every backend.
    ///
    /// # Errors
    ///
    /// Returns [`LiaisonError::Validation`] when the configured built-in
    /// identity is invalid.
    pub fn with_parts(
        builtin: Arc<dyn CredentialBackend>,
        config: LiaisonConfig,
        validator: Arc<dyn RequestValidator>,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> LiaisonResult<Self> {
        let LiaisonConfig {
            builtin_id,
            builtin_label,
            ..
        } = config;
        let liaison = Self {
            state: RwLock::new(LiaisonState::default()),
            validator,
            clock,
            builtin_id: BackendId::new(builtin_id.clone())?,
        };
        liaison.register_manager(
            RegisterManagerRequest::native(builtin_id, builtin_label),
            builtin,
        )?;
        Ok(liaison)
    }

    /// Returns the identifier of the built-in backend.
    #[must_use]
    pub const fn builtin_id(&self) -> &BackendId {
        &self.builtin_id
    }

    /// Registers a backend under a new identifier.
    ///
    /// The backend is wrapped in a fresh, idle pipeline before the record is
    /// published, so concurrent readers never observe a partial record.
    ///
    /// # Errors
    ///
    /// Returns [`LiaisonError::Validation`] naming the first invalid field,
    /// or [`LiaisonError::Duplicate`] when the identifier is taken.
    pub fn register_manager(
        &self,
        request: RegisterManagerRequest,
        backend: Arc<dyn CredentialBackend>,
    ) -> LiaisonResult<ManagerSummary> {
        let RegisterManagerRequest { id, label, kind } = request;
        let summary = ManagerSummary {
            id: BackendId::new(id)?,
            label: BackendLabel::new(label)?,
            kind: BackendKind::try_from(kind.as_str())?,
            registered_at: self.clock.utc(),
        };
        let pipeline = Arc::new(HandlerPipeline::new(
            summary.id.clone(),
            backend,
            Arc::clone(&self.validator),
        ));

        let mut state = self.write_state();
        if state.records.contains_key(&summary.id) {
            warn!(backend_id = %summary.id, "rejecting duplicate backend registration");
            return Err(LiaisonError::Duplicate(summary.id));
        }
        state.order.push(summary.id.clone());
        state.records.insert(
            summary.id.clone(),
            BackendRecord {
                summary: summary.clone(),
                pipeline,
            },
        );
        drop(state);

        info!(
            backend_id = %summary.id,
            label = %summary.label,
            kind = %summary.kind,
            "registered credential backend"
        );
        Ok(summary)
    }

    /// Removes a registered backend.
    ///
    /// Requests already in flight are not cancelled, and façades obtained
    /// earlier keep working against the removed pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`LiaisonError::Protected`] for the built-in backend, or
    /// [`LiaisonError::NotFound`] when no backend has the identifier.
    pub fn erase_manager(&self, id: &str) -> LiaisonResult<ManagerSummary> {
        if self.builtin_id.as_str() == id {
            warn!(backend_id = id, "refusing to erase the built-in backend");
            return Err(LiaisonError::Protected(self.builtin_id.clone()));
        }
        self.force_erase_manager(id)
    }

    /// Removes a registered backend, including the built-in one.
    ///
    /// # Errors
    ///
    /// Returns [`LiaisonError::NotFound`] when no backend has the identifier.
    pub fn force_erase_manager(&self, id: &str) -> LiaisonResult<ManagerSummary> {
        let removed = self.write_state().remove(id);
        let record = removed.ok_or_else(|| LiaisonError::NotFound(id.to_owned()))?;
        info!(
            backend_id = id,
            busy = record.pipeline.is_busy(),
            "erased credential backend"
        );
        Ok(record.summary)
    }

    /// Returns whether a backend is registered under `id`.
    #[must_use]
    pub fn is_manager_registered(&self, id: &str) -> bool {
        self.read_state().records.contains_key(id)
    }

    /// Returns the metadata of every registered backend in registration
    /// order.
    #[must_use]
    pub fn managers(&self) -> Vec<ManagerSummary> {
        let state = self.read_state();
        state
            .order
            .iter()
            .filter_map(|id| state.records.get(id))
            .map(|record| record.summary.clone())
            .collect()
    }

    /// Returns a façade dispatching requests to the backend registered as
    /// `id`.
    ///
    /// # Errors
    ///
    /// Returns [`LiaisonError::NotFound`] when no backend has the identifier.
    pub fn get_request_handler(&self, id: &str) -> LiaisonResult<PublicFacade> {
        self.read_state()
            .records
            .get(id)
            .map(|record| PublicFacade::new(Arc::clone(&record.pipeline)))
            .ok_or_else(|| LiaisonError::NotFound(id.to_owned()))
    }

    /// Removes every backend, the built-in one included, returning how many
    /// were removed.
    #[must_use]
    pub fn teardown(&self) -> usize {
        let mut state = self.write_state();
        let removed = state.records.len();
        state.records.clear();
        state.order.clear();
        drop(state);
        info!(removed, "credential registry torn down");
        removed
    }

    fn read_state(&self) -> RwLockReadGuard<'_, LiaisonState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, LiaisonState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Liaison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Liaison")
            .field("builtin_id", &self.builtin_id)
            .field("managers", &self.read_state().order)
            .finish_non_exhaustive()
    }
}
