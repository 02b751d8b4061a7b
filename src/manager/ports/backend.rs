//! Backend port: the interface a credential backend implements.
//!
//! Each request group is its own trait. A backend advertises the groups it
//! implements through [`CredentialBackend`]; the set is fixed when the
//! backend is registered.
//!
//! Every method receives the [`RequestContext`] first. The backend completes
//! the request by calling `context.response().resolve(..)` or
//! `context.response().reject(..)`, either before returning or later from
//! another task holding a clone of the context. Returning `Err` while the
//! request is still open is treated as an unexpected exception.

use crate::request::domain::RequestContext;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Error raised by a backend method instead of completing its request.
pub type BackendFault = Box<dyn std::error::Error + Send + Sync>;

/// Result type for backend methods.
pub type BackendResult = Result<(), BackendFault>;

/// A field value submitted during account creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldUpdate {
    /// Field name, as listed by `getFields`.
    pub name: String,
    /// New field value.
    pub value: String,
}

/// The `manager` request group.
#[async_trait]
pub trait ManagerRequests: Send + Sync {
    /// Resolves with the signing key used for `origin`.
    async fn get_signing_key(&self, context: RequestContext, origin: String) -> BackendResult;

    /// Resolves with the number of credentials stored for `origin`.
    async fn get_credentials_metadata(
        &self,
        context: RequestContext,
        origin: String,
    ) -> BackendResult;
}

/// The `login` request group.
#[async_trait]
pub trait LoginRequests: Send + Sync {
    /// Resolves with whether the record was approved for the operation.
    async fn approve_operation(
        &self,
        context: RequestContext,
        operation_id: String,
        record_id: String,
    ) -> BackendResult;

    /// Closes a login operation; resolves with `null`.
    async fn close_operation(
        &self,
        context: RequestContext,
        operation_id: String,
        reason: Option<String>,
    ) -> BackendResult;

    /// Resolves with the metadata object of a record.
    async fn get_record_metadata(&self, context: RequestContext, record_id: String)
    -> BackendResult;

    /// Merges metadata into a record; resolves with `null`.
    async fn update_metadata(
        &self,
        context: RequestContext,
        record_id: String,
        metadata: Map<String, Value>,
    ) -> BackendResult;
}

/// The `accountCreation` request group.
#[async_trait]
pub trait AccountCreationRequests: Send + Sync {
    /// Resolves with the array of fields collected so far.
    async fn get_fields(&self, context: RequestContext, operation_id: String) -> BackendResult;

    /// Sets one field; resolves with `null`.
    async fn update_field(
        &self,
        context: RequestContext,
        operation_id: String,
        field: FieldUpdate,
    ) -> BackendResult;

    /// Closes an account creation operation; resolves with `null`.
    async fn close_operation(&self, context: RequestContext, operation_id: String)
    -> BackendResult;
}

/// The `accountAuthentication` request group.
#[async_trait]
pub trait AccountAuthenticationRequests: Send + Sync {
    /// Resolves with a challenge object for the operation.
    async fn get_challenge(&self, context: RequestContext, operation_id: String) -> BackendResult;

    /// Resolves with whether `answer` satisfies the issued challenge.
    async fn approve_challenge(
        &self,
        context: RequestContext,
        operation_id: String,
        answer: Map<String, Value>,
    ) -> BackendResult;

    /// Closes an authentication operation; resolves with `null`.
    async fn close_operation(&self, context: RequestContext, operation_id: String)
    -> BackendResult;
}

/// A pluggable credential backend.
///
/// Each accessor returns the backend's implementation of one request group,
/// or `None` when the group is not provided. The default implementations
/// provide nothing.
pub trait CredentialBackend: Send + Sync {
    /// Returns the `manager` group implementation.
    fn manager(&self) -> Option<&dyn ManagerRequests> {
        None
    }

    /// Returns the `login` group implementation.
    fn login(&self) -> Option<&dyn LoginRequests> {
        None
    }

    /// Returns the `accountCreation` group implementation.
    fn account_creation(&self) -> Option<&dyn AccountCreationRequests> {
        None
    }

    /// Returns the `accountAuthentication` group implementation.
    fn account_authentication(&self) -> Option<&dyn AccountAuthenticationRequests> {
        None
    }
}
