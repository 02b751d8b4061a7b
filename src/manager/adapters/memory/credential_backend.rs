//! In-memory backend implementing every request group.
//!
//! Suitable as the built-in backend for local use and tests. Business
//! failures, such as an unknown record, reject the request with the
//! `unknown` error code.

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::manager::ports::{
    AccountAuthenticationRequests, AccountCreationRequests, BackendFault, BackendResult,
    CredentialBackend, FieldUpdate, LoginRequests, ManagerRequests,
};
use crate::request::domain::{ErrorCode, NormalizedError, RequestContext};

/// Thread-safe in-memory credential backend.
///
/// Clones share state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialBackend {
    state: Arc<RwLock<InMemoryCredentialState>>,
}

#[derive(Debug, Default)]
struct InMemoryCredentialState {
    signing_keys: HashMap<String, String>,
    records: HashMap<String, StoredRecord>,
    approved_logins: HashMap<String, String>,
    pending_fields: HashMap<String, Vec<FieldUpdate>>,
    challenges: HashMap<String, String>,
}

#[derive(Debug, Clone)]
struct StoredRecord {
    origin: String,
    metadata: Map<String, Value>,
}

impl InMemoryCredentialBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the signing key used for `origin`.
    #[must_use]
    pub fn with_signing_key(self, origin: impl Into<String>, key: impl Into<String>) -> Self {
        self.write_seed()
            .signing_keys
            .insert(origin.into(), key.into());
        self
    }

    /// Seeds a stored credential record.
    #[must_use]
    pub fn with_record(
        self,
        record_id: impl Into<String>,
        origin: impl Into<String>,
        metadata: Map<String, Value>,
    ) -> Self {
        self.write_seed().records.insert(
            record_id.into(),
            StoredRecord {
                origin: origin.into(),
                metadata,
            },
        );
        self
    }

    /// Returns the record approved for a login operation, if any.
    #[must_use]
    pub fn approved_record(&self, operation_id: &str) -> Option<String> {
        self.read().ok()?.approved_logins.get(operation_id).cloned()
    }

    fn write_seed(&self) -> RwLockWriteGuard<'_, InMemoryCredentialState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, InMemoryCredentialState>, BackendFault> {
        self.state
            .read()
            .map_err(|err| std::io::Error::other(err.to_string()).into())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, InMemoryCredentialState>, BackendFault> {
        self.state
            .write()
            .map_err(|err| std::io::Error::other(err.to_string()).into())
    }
}

fn not_found(what: &str, id: &str) -> NormalizedError {
    NormalizedError::new(ErrorCode::Unknown, format!("{what} '{id}' was not found"))
}

impl CredentialBackend for InMemoryCredentialBackend {
    fn manager(&self) -> Option<&dyn ManagerRequests> {
        Some(self)
    }

    fn login(&self) -> Option<&dyn LoginRequests> {
        Some(self)
    }

    fn account_creation(&self) -> Option<&dyn AccountCreationRequests> {
        Some(self)
    }

    fn account_authentication(&self) -> Option<&dyn AccountAuthenticationRequests> {
        Some(self)
    }
}

#[async_trait]
impl ManagerRequests for InMemoryCredentialBackend {
    async fn get_signing_key(&self, context: RequestContext, origin: String) -> BackendResult {
        let key = self.read()?.signing_keys.get(&origin).cloned();
        match key {
            Some(found) => context.response().resolve(Value::String(found))?,
            None => context
                .response()
                .reject(not_found("signing key for origin", &origin))?,
        }
        Ok(())
    }

    async fn get_credentials_metadata(
        &self,
        context: RequestContext,
        origin: String,
    ) -> BackendResult {
        let count = self
            .read()?
            .records
            .values()
            .filter(|record| record.origin == origin)
            .count();
        context.response().resolve(json!(count))?;
        Ok(())
    }
}

#[async_trait]
impl LoginRequests for InMemoryCredentialBackend {
    async fn approve_operation(
        &self,
        context: RequestContext,
        operation_id: String,
        record_id: String,
    ) -> BackendResult {
        let approved = {
            let mut state = self.write()?;
            let known = state.records.contains_key(&record_id);
            if known {
                state.approved_logins.insert(operation_id, record_id);
            }
            known
        };
        context.response().resolve(Value::Bool(approved))?;
        Ok(())
    }

    async fn close_operation(
        &self,
        context: RequestContext,
        operation_id: String,
        _reason: Option<String>,
    ) -> BackendResult {
        self.write()?.approved_logins.remove(&operation_id);
        context.response().resolve(Value::Null)?;
        Ok(())
    }

    async fn get_record_metadata(
        &self,
        context: RequestContext,
        record_id: String,
    ) -> BackendResult {
        let metadata = self
            .read()?
            .records
            .get(&record_id)
            .map(|record| record.metadata.clone());
        match metadata {
            Some(found) => context.response().resolve(Value::Object(found))?,
            None => context.response().reject(not_found("record", &record_id))?,
        }
        Ok(())
    }

    async fn update_metadata(
        &self,
        context: RequestContext,
        record_id: String,
        metadata: Map<String, Value>,
    ) -> BackendResult {
        let updated = {
            let mut state = self.write()?;
            if let Some(record) = state.records.get_mut(&record_id) {
                record.metadata.extend(metadata);
                true
            } else {
                false
            }
        };
        if updated {
            context.response().resolve(Value::Null)?;
        } else {
            context.response().reject(not_found("record", &record_id))?;
        }
        Ok(())
    }
}

#[async_trait]
impl AccountCreationRequests for InMemoryCredentialBackend {
    async fn get_fields(&self, context: RequestContext, operation_id: String) -> BackendResult {
        let fields = self
            .read()?
            .pending_fields
            .get(&operation_id)
            .cloned()
            .unwrap_or_default();
        context.response().resolve_with(&fields)?;
        Ok(())
    }

    async fn update_field(
        &self,
        context: RequestContext,
        operation_id: String,
        field: FieldUpdate,
    ) -> BackendResult {
        {
            let mut state = self.write()?;
            let fields = state.pending_fields.entry(operation_id).or_default();
            match fields.iter_mut().find(|existing| existing.name == field.name) {
                Some(existing) => existing.value = field.value,
                None => fields.push(field),
            }
        }
        context.response().resolve(Value::Null)?;
        Ok(())
    }

    async fn close_operation(&self, context: RequestContext, operation_id: String) -> BackendResult {
        self.write()?.pending_fields.remove(&operation_id);
        context.response().resolve(Value::Null)?;
        Ok(())
    }
}

#[async_trait]
impl AccountAuthenticationRequests for InMemoryCredentialBackend {
    async fn get_challenge(&self, context: RequestContext, operation_id: String) -> BackendResult {
        let nonce = Uuid::new_v4().to_string();
        self.write()?
            .challenges
            .insert(operation_id.clone(), nonce.clone());
        context
            .response()
            .resolve(json!({ "operationId": operation_id, "nonce": nonce }))?;
        Ok(())
    }

    async fn approve_challenge(
        &self,
        context: RequestContext,
        operation_id: String,
        answer: Map<String, Value>,
    ) -> BackendResult {
        let issued = self.read()?.challenges.get(&operation_id).cloned();
        let Some(nonce) = issued else {
            context
                .response()
                .reject(not_found("challenge for operation", &operation_id))?;
            return Ok(());
        };
        let approved = answer.get("nonce").and_then(Value::as_str) == Some(nonce.as_str());
        context.response().resolve(Value::Bool(approved))?;
        Ok(())
    }

    async fn close_operation(&self, context: RequestContext, operation_id: String) -> BackendResult {
        self.write()?.challenges.remove(&operation_id);
        context.response().resolve(Value::Null)?;
        Ok(())
    }
}
